// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Read-only memory-mapped input files

use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Why an input file could not be mapped
#[derive(Debug, Error)]
pub enum MapError {
    /// open(2) failed
    #[error("Failed to open file '{path}': {source}")]
    Open {
        /// File path
        path: String,
        /// Underlying error
        source: io::Error,
    },
    /// fstat(2) failed
    #[error("Failed to stat file '{path}': {source}")]
    Stat {
        /// File path
        path: String,
        /// Underlying error
        source: io::Error,
    },
    /// Zero-length files cannot be mapped
    #[error("Cannot map empty file '{0}'")]
    Empty(String),
    /// mmap(2) failed
    #[error("Failed to map file '{path}' into memory: {source}")]
    Map {
        /// File path
        path: String,
        /// Underlying error
        source: io::Error,
    },
}

/// A whole file mapped read-only; unmapped on drop
pub struct MappedFile {
    #[cfg(unix)]
    base: *mut libc::c_void,
    #[cfg(unix)]
    len: usize,
    #[cfg(not(unix))]
    data: Vec<u8>,
}

impl MappedFile {
    /// Map `path` into memory. Empty files are refused.
    pub fn open(path: &Path) -> Result<Self, MapError> {
        let display = || path.display().to_string();
        let file = File::open(path).map_err(|source| MapError::Open {
            path: display(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| MapError::Stat {
                path: display(),
                source,
            })?
            .len() as usize;
        if len == 0 {
            return Err(MapError::Empty(display()));
        }
        Self::map(&file, len).map_err(|source| MapError::Map {
            path: display(),
            source,
        })
    }

    #[cfg(unix)]
    fn map(file: &File, len: usize) -> io::Result<Self> {
        use std::os::unix::io::AsRawFd;

        // SAFETY: a fresh private read-only mapping of an open descriptor;
        // the result is checked before use.
        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_PRIVATE,
                file.as_raw_fd(),
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { base, len })
    }

    #[cfg(not(unix))]
    fn map(file: &File, len: usize) -> io::Result<Self> {
        use std::io::Read;

        let mut data = Vec::with_capacity(len);
        (&*file).read_to_end(&mut data)?;
        Ok(Self { data })
    }

    /// The mapped bytes
    pub fn as_bytes(&self) -> &[u8] {
        #[cfg(unix)]
        {
            // SAFETY: base..base+len is mapped readable until drop
            unsafe { std::slice::from_raw_parts(self.base as *const u8, self.len) }
        }
        #[cfg(not(unix))]
        {
            &self.data
        }
    }
}

#[cfg(unix)]
impl Drop for MappedFile {
    fn drop(&mut self) {
        // SAFETY: unmaps exactly the region created in `map`
        unsafe {
            libc::munmap(self.base, self.len);
        }
    }
}
