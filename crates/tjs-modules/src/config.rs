// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module search configuration.

use std::path::PathBuf;
use tracing::warn;

/// Environment variable holding the colon-separated library search path.
pub const LIBRARY_PATH_ENV: &str = "TJS_LIBRARY_PATH";

/// Compiled-in library search path, used when the environment sets none.
pub const LIBRARY_PATH_DEFAULT: &str = match option_env!("TJS_LIBRARY_PATH_DEFAULT") {
    Some(path) => path,
    None => "/usr/local/lib/tjs:/usr/lib/tjs",
};

/// Configuration for bare-name module lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Root directories searched for bare names, in order
    pub library_paths: Vec<PathBuf>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            library_paths: parse_search_paths(LIBRARY_PATH_DEFAULT),
        }
    }
}

impl ModuleConfig {
    /// Load configuration from the environment, falling back to the
    /// compiled-in default.
    pub fn from_env() -> Self {
        match std::env::var(LIBRARY_PATH_ENV) {
            Ok(value) => {
                let config = Self::with_search_path(&value);
                if config.library_paths.is_empty() {
                    warn!(value = %value, "{} has no usable entries", LIBRARY_PATH_ENV);
                }
                config
            }
            Err(_) => Self::default(),
        }
    }

    /// Configuration with an explicit colon-separated search path.
    pub fn with_search_path(search_path: &str) -> Self {
        Self {
            library_paths: parse_search_paths(search_path),
        }
    }
}

/// Split a colon-separated search path, skipping empty entries.
pub fn parse_search_paths(search_path: &str) -> Vec<PathBuf> {
    search_path
        .split(':')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}
