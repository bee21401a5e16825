// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compile-only module compilation

use crate::error::{ModuleError, Result};
use crate::source::SourceBytes;
use tjs_engine::{Engine, ModuleId};

/// Compile source into a registered, unevaluated module named `name`
pub fn compile(engine: &mut Engine, source: &SourceBytes, name: &str) -> Result<ModuleId> {
    engine
        .compile_module(source.text(), name)
        .map_err(|source| ModuleError::Compile {
            module: name.to_string(),
            source,
        })
}
