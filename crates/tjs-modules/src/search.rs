// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Library path search for bare module names

use crate::probe::probe;
use std::path::PathBuf;
use tracing::trace;

/// Probe `<root>/<name>` under each root in order; the first hit wins
pub fn search(name: &str, roots: &[PathBuf]) -> Option<PathBuf> {
    roots.iter().find_map(|root| {
        let stem = root.join(name);
        trace!(root = %root.display(), name, "searching library path");
        probe(&stem)
    })
}
