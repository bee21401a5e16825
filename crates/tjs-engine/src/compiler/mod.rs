// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module compiler.
//!
//! Compilation is compile-only: the source is scanned, its module structure
//! validated, and the token stream lowered to [`Bytecode`]. Nothing runs.

mod bytecode;
mod syntax;

pub use bytecode::{Bytecode, Instruction};
pub use syntax::{analyze, ModuleSyntax};

use crate::lexer::Scanner;
use crate::module::{ImportMeta, ModuleRecord, ModuleStatus};
use crate::Result;

/// Compiles module source into an unlinked record named `name`.
pub fn compile_module(source: &str, name: &str) -> Result<ModuleRecord> {
    let scanner = Scanner::new(source);
    let tokens = Scanner::new(source).tokenize()?;
    let syntax = analyze(&scanner, source, &tokens)?;
    let bytecode = Bytecode::from_tokens(&scanner, &tokens);

    Ok(ModuleRecord {
        name: name.to_string(),
        requests: syntax.requests,
        exports: syntax.exports,
        star_exports: syntax.star_exports,
        bytecode,
        status: ModuleStatus::Compiled,
        dependencies: Vec::new(),
        meta: ImportMeta::new(),
    })
}
