// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Content loading and classification

use crate::error::{FetchFailure, ModuleError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::source::{wrap_json, SourceBytes, SourceKind};
use std::fmt;
use tracing::debug;

/// Source produced for a resolved location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    /// Text to compile. Empty for native addons.
    pub bytes: SourceBytes,
    /// What the location contained
    pub kind: SourceKind,
}

/// Turns resolved locations into compiler input
pub struct ContentLoader {
    fetcher: Box<dyn Fetcher>,
}

impl ContentLoader {
    /// Create a loader using the given transport for URLs
    pub fn new(fetcher: Box<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Load the content behind a resolved location
    pub fn load(&self, location: &str) -> Result<LoadedSource> {
        let kind = SourceKind::classify(location);
        debug!(location, ?kind, "loading module content");

        let text = match kind {
            SourceKind::RemoteScript => self.fetch(location)?,
            SourceKind::NativeAddon => {
                // Only existence is checked; the engine cannot compile addons
                std::fs::metadata(location).map_err(|e| ModuleError::io(location, e))?;
                String::new()
            }
            SourceKind::Json => wrap_json(&read_text(location)?),
            SourceKind::Script => read_text(location)?,
            SourceKind::BuiltinBundle => {
                return Err(ModuleError::Unsupported {
                    module: location.to_string(),
                    reason: "built-in bundles are only registered at startup".to_string(),
                });
            }
        };

        let bytes = SourceBytes::new(text).ok_or_else(|| ModuleError::InvalidSource {
            path: location.to_string(),
            reason: "contains a NUL byte".to_string(),
        })?;
        Ok(LoadedSource { bytes, kind })
    }

    fn fetch(&self, url: &str) -> Result<String> {
        let fetch_error = |reason| ModuleError::Fetch {
            url: url.to_string(),
            reason,
        };

        let (status, body) = self.fetcher.fetch(url).map_err(fetch_error)?;
        if status != 200 {
            debug!(url, status, "rejecting non-200 response");
            return Err(fetch_error(FetchFailure::Status(status)));
        }
        String::from_utf8(body).map_err(|_| ModuleError::InvalidSource {
            path: url.to_string(),
            reason: "response body is not valid UTF-8".to_string(),
        })
    }
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new(Box::new(HttpFetcher::new()))
    }
}

impl fmt::Debug for ContentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentLoader").finish_non_exhaustive()
    }
}

fn read_text(path: &str) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| ModuleError::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| ModuleError::InvalidSource {
        path: path.to_string(),
        reason: "file is not valid UTF-8".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    struct StubFetcher {
        status: u16,
        body: &'static str,
        requests: RefCell<Vec<String>>,
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self, url: &str) -> std::result::Result<(u16, Vec<u8>), FetchFailure> {
            self.requests.borrow_mut().push(url.to_string());
            Ok((self.status, self.body.as_bytes().to_vec()))
        }
    }

    fn stub(status: u16, body: &'static str) -> ContentLoader {
        ContentLoader::new(Box::new(StubFetcher {
            status,
            body,
            requests: RefCell::new(Vec::new()),
        }))
    }

    #[test]
    fn test_script_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.js");
        fs::write(&path, "export const a = 1;").unwrap();

        let loaded = stub(200, "").load(&path.to_string_lossy()).unwrap();
        assert_eq!(loaded.kind, SourceKind::Script);
        assert_eq!(loaded.bytes.text(), "export const a = 1;");
    }

    #[test]
    fn test_json_file_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{\"k\": 1}").unwrap();

        let loaded = stub(200, "").load(&path.to_string_lossy()).unwrap();
        assert_eq!(loaded.kind, SourceKind::Json);
        assert_eq!(
            loaded.bytes.text(),
            "export default JSON.parse(`{\"k\": 1}`);"
        );
    }

    #[test]
    fn test_native_addon_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("addon.so");
        fs::write(&path, [0x7f, b'E', b'L', b'F', 0]).unwrap();

        let loaded = stub(200, "").load(&path.to_string_lossy()).unwrap();
        assert_eq!(loaded.kind, SourceKind::NativeAddon);
        assert!(loaded.bytes.is_empty());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = stub(200, "").load("/no/such/file.js").unwrap_err();
        assert!(matches!(err, ModuleError::NotFound(ref p) if p == "/no/such/file.js"));
    }

    #[test]
    fn test_interior_nul_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nul.js");
        fs::write(&path, "let a;\0").unwrap();

        let err = stub(200, "").load(&path.to_string_lossy()).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidSource { .. }));
    }

    #[test]
    fn test_remote_ok() {
        let loaded = stub(200, "export default 2;")
            .load("https://example.test/x.js")
            .unwrap();
        assert_eq!(loaded.kind, SourceKind::RemoteScript);
        assert_eq!(loaded.bytes.text(), "export default 2;");
    }

    #[test]
    fn test_remote_non_200_fails() {
        for status in [201, 301, 404, 500] {
            let err = stub(status, "body").load("http://example.test/x.js").unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("could not load 'http://example.test/x.js' code: {}", status)
            );
        }
    }
}
