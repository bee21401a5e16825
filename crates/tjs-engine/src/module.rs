// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module records owned by the engine's registry.

use crate::compiler::Bytecode;
use std::collections::BTreeMap;

/// Opaque handle to a module record held by an [`Engine`](crate::Engine).
///
/// Handles are only meaningful for the engine that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle of a module record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Compiled or deserialized; imports not resolved yet
    Compiled,
    /// Import resolution in progress (cycle marker)
    Linking,
    /// All imports resolved to registered modules
    Linked,
    /// Top-level code has been run
    Evaluated,
}

/// A value stored on a module's `import.meta` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// String property
    String(String),
    /// Boolean property
    Bool(bool),
}

/// The `import.meta` object of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMeta {
    properties: BTreeMap<String, MetaValue>,
}

impl ImportMeta {
    /// Creates an empty meta object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or redefines) a property.
    pub fn define(&mut self, key: impl Into<String>, value: MetaValue) {
        self.properties.insert(key.into(), value);
    }

    /// Returns a string property.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.properties.get(key) {
            Some(MetaValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a boolean property.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.properties.get(key) {
            Some(MetaValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns true if the property is defined.
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Number of defined properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if no property is defined.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A compiled module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    /// Module name (registry key)
    pub name: String,
    /// Import specifiers, in source order, deduplicated
    pub requests: Vec<String>,
    /// Exported binding names
    pub exports: Vec<String>,
    /// Specifiers re-exported with `export * from`
    pub star_exports: Vec<String>,
    /// Lowered token stream
    pub bytecode: Bytecode,
    /// Lifecycle state
    pub status: ModuleStatus,
    /// Modules the requests resolved to, parallel to `requests` once linked
    pub dependencies: Vec<ModuleId>,
    /// The module's `import.meta`
    pub meta: ImportMeta,
}

impl ModuleRecord {
    /// Returns true if the module exports the given name.
    pub fn has_export(&self, name: &str) -> bool {
        self.exports.iter().any(|e| e == name)
    }
}
