// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `import.meta` stamping

use crate::error::{ModuleError, Result};
use std::path::MAIN_SEPARATOR;
use tjs_engine::{Engine, MetaValue, ModuleId};
use tracing::trace;

/// Scheme prefixed to canonical file paths
pub const FILE_SCHEME: &str = "file://";

/// Attach `url`, `main` and, for real files, `dirname` and `basename`.
///
/// With `use_real_path` the location is canonicalized first and failure to
/// do so is an error. Without it, `url` is the location as given and no
/// path properties are defined.
pub fn stamp(
    engine: &mut Engine,
    module: ModuleId,
    location: &str,
    use_real_path: bool,
    is_main: bool,
) -> Result<()> {
    let mut paths = None;
    let url = if use_real_path {
        let canonical = std::fs::canonicalize(location).map_err(|source| ModuleError::RealPath {
            path: location.to_string(),
            source,
        })?;
        let canonical = canonical.to_string_lossy().into_owned();
        paths = Some(split_path(&canonical));
        format!("{FILE_SCHEME}{canonical}")
    } else {
        location.to_string()
    };

    trace!(location, url = %url, main = is_main, "stamping import.meta");

    let meta = engine.import_meta_mut(module)?;
    meta.define("url", MetaValue::String(url));
    meta.define("main", MetaValue::Bool(is_main));
    if let Some((dirname, basename)) = paths {
        meta.define("dirname", MetaValue::String(dirname));
        meta.define("basename", MetaValue::String(basename));
    }
    Ok(())
}

/// Split on the last separator. A path without one has an empty dirname.
fn split_path(path: &str) -> (String, String) {
    match path.rfind(MAIN_SEPARATOR) {
        Some(0) => (MAIN_SEPARATOR.to_string(), path[1..].to_string()),
        Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
        None => (String::new(), path.to_string()),
    }
}
