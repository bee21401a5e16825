// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Extension probing
//!
//! A path stem is looked up as, in this order: the stem itself, `<stem>.js`,
//! `<stem>/index.js`, `<stem>.so`. The first regular file wins.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Suffixes appended to a stem, in probing order
pub const PROBE_SUFFIXES: [&str; 4] = ["", ".js", "/index.js", ".so"];

/// Candidate paths for a stem, in probing order
pub fn candidates(stem: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    PROBE_SUFFIXES.iter().map(move |suffix| {
        let mut candidate = OsString::from(stem.as_os_str());
        candidate.push(suffix);
        PathBuf::from(candidate)
    })
}

/// Find the first existing regular file for a stem
pub fn probe(stem: &Path) -> Option<PathBuf> {
    let found = candidates(stem).find(|candidate| is_regular_file(candidate));
    trace!(stem = %stem.display(), found = ?found, "probed module stem");
    found
}

fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| meta.is_file())
}
