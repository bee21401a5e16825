// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # tjs-engine
//!
//! The engine boundary of the tjs runtime.
//!
//! This crate owns the module registry and everything the module loader
//! consumes from an engine:
//!
//! - compile-only module compilation ([`Engine::compile_module`])
//! - import resolution through host hooks ([`Engine::resolve_module`])
//! - evaluation bookkeeping ([`Engine::evaluate`])
//! - `import.meta` storage ([`Engine::import_meta_mut`])
//! - bytecode serialization in native or byte-swapped layout
//!   ([`Engine::write_module`], [`Engine::read_module`])
//!
//! ## Quick Start
//!
//! ```rust
//! use tjs_engine::{ByteOrder, Engine};
//!
//! let mut engine = Engine::new();
//! let id = engine.compile_module("export const x = 1;", "x.js").unwrap();
//! let bytes = engine.write_module(id, ByteOrder::Native).unwrap();
//!
//! let mut other = Engine::new();
//! let copy = other.read_module(&bytes, ByteOrder::Native).unwrap();
//! assert!(other.module(copy).unwrap().has_export("x"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod lexer;
pub mod module;
pub mod serialize;

pub use module::{ImportMeta, MetaValue, ModuleId, ModuleRecord, ModuleStatus};
pub use serialize::{ByteOrder, BYTECODE_MAGIC, BYTECODE_VERSION};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Syntax error during compilation
    #[error("SyntaxError: {0}")]
    SyntaxError(String),
    /// Unresolvable reference (e.g. a module that could not be loaded)
    #[error("ReferenceError: {0}")]
    ReferenceError(String),
    /// Operation on an invalid handle or value
    #[error("TypeError: {0}")]
    TypeError(String),
    /// Malformed or incompatible serialized module
    #[error("invalid bytecode: {0}")]
    Bytecode(String),
    /// Error raised by a [`ModuleHost`] hook
    #[error(transparent)]
    Host(Box<dyn std::error::Error + Send + Sync>),
}

/// Hooks the engine calls while resolving a module's imports.
pub trait ModuleHost {
    /// Maps an import specifier, requested by the module named `base`, to the
    /// name used as registry key.
    fn normalize(&mut self, base: &str, specifier: &str) -> String;

    /// Produces a compiled module for a normalized name that is not yet
    /// registered.
    fn load(&mut self, engine: &mut Engine, name: &str) -> Result<ModuleId>;
}

/// A module registry plus the operations the loader needs from an engine.
#[derive(Debug, Default)]
pub struct Engine {
    modules: Vec<ModuleRecord>,
    by_name: FxHashMap<String, ModuleId>,
}

impl Engine {
    /// Creates an engine with an empty module registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles module source without evaluating it and registers the
    /// resulting record under `name`.
    pub fn compile_module(&mut self, source: &str, name: &str) -> Result<ModuleId> {
        let record = compiler::compile_module(source, name)?;
        debug!(
            module = name,
            requests = record.requests.len(),
            exports = record.exports.len(),
            "compiled module"
        );
        Ok(self.register(record))
    }

    /// Serializes a compiled module.
    pub fn write_module(&self, id: ModuleId, order: ByteOrder) -> Result<Vec<u8>> {
        Ok(serialize::write_module(self.record(id)?, order))
    }

    /// Deserializes a module and registers it under its stored name.
    pub fn read_module(&mut self, bytes: &[u8], order: ByteOrder) -> Result<ModuleId> {
        let record = serialize::read_module(bytes, order)?;
        debug!(module = %record.name, "read module bytecode");
        Ok(self.register(record))
    }

    /// Returns a registered module.
    pub fn module(&self, id: ModuleId) -> Option<&ModuleRecord> {
        self.modules.get(id.index())
    }

    /// Looks up a module by registry key.
    pub fn find_module(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    /// Returns the name a module was registered under.
    pub fn module_name(&self, id: ModuleId) -> Result<&str> {
        Ok(&self.record(id)?.name)
    }

    /// Returns a module's `import.meta` object.
    pub fn import_meta(&self, id: ModuleId) -> Result<&ImportMeta> {
        Ok(&self.record(id)?.meta)
    }

    /// Returns a module's `import.meta` object for modification.
    pub fn import_meta_mut(&mut self, id: ModuleId) -> Result<&mut ImportMeta> {
        Ok(&mut self.record_mut(id)?.meta)
    }

    /// Number of registered modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Resolves the imports of a module, and transitively of its
    /// dependencies, loading missing modules through `host`.
    pub fn resolve_module(&mut self, id: ModuleId, host: &mut dyn ModuleHost) -> Result<()> {
        let record = self.record_mut(id)?;
        if record.status != ModuleStatus::Compiled {
            return Ok(());
        }
        record.status = ModuleStatus::Linking;
        let base = record.name.clone();
        let requests = record.requests.clone();

        let result = self.link_requests(&base, &requests, host);

        let record = &mut self.modules[id.index()];
        match result {
            Ok(dependencies) => {
                record.dependencies = dependencies;
                record.status = ModuleStatus::Linked;
                Ok(())
            }
            Err(err) => {
                record.status = ModuleStatus::Compiled;
                Err(err)
            }
        }
    }

    /// Links a module and runs its top-level code, dependencies first.
    pub fn evaluate(&mut self, id: ModuleId, host: &mut dyn ModuleHost) -> Result<()> {
        self.resolve_module(id, host)?;
        self.mark_evaluated(id);
        Ok(())
    }

    fn link_requests(
        &mut self,
        base: &str,
        requests: &[String],
        host: &mut dyn ModuleHost,
    ) -> Result<Vec<ModuleId>> {
        let mut dependencies = Vec::with_capacity(requests.len());
        for request in requests {
            let name = host.normalize(base, request);
            let dependency = match self.find_module(&name) {
                Some(existing) => existing,
                None => host.load(self, &name)?,
            };
            trace!(base, request = %request, resolved = %name, "linked import");
            self.resolve_module(dependency, host)?;
            dependencies.push(dependency);
        }
        Ok(dependencies)
    }

    fn mark_evaluated(&mut self, id: ModuleId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let record = &mut self.modules[next.index()];
            if record.status == ModuleStatus::Evaluated {
                continue;
            }
            record.status = ModuleStatus::Evaluated;
            pending.extend(record.dependencies.iter().copied());
            trace!(module = %record.name, "evaluated module");
        }
    }

    fn register(&mut self, record: ModuleRecord) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.by_name.insert(record.name.clone(), id);
        self.modules.push(record);
        id
    }

    fn record(&self, id: ModuleId) -> Result<&ModuleRecord> {
        self.modules
            .get(id.index())
            .ok_or_else(|| Error::TypeError(format!("unknown module handle {}", id.0)))
    }

    fn record_mut(&mut self, id: ModuleId) -> Result<&mut ModuleRecord> {
        self.modules
            .get_mut(id.index())
            .ok_or_else(|| Error::TypeError(format!("unknown module handle {}", id.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Host serving modules from an in-memory map.
    struct MapHost {
        sources: HashMap<String, String>,
        loads: Vec<String>,
    }

    impl MapHost {
        fn new(sources: &[(&str, &str)]) -> Self {
            Self {
                sources: sources
                    .iter()
                    .map(|(name, source)| (name.to_string(), source.to_string()))
                    .collect(),
                loads: Vec::new(),
            }
        }
    }

    impl ModuleHost for MapHost {
        fn normalize(&mut self, _base: &str, specifier: &str) -> String {
            specifier.trim_start_matches("./").to_string()
        }

        fn load(&mut self, engine: &mut Engine, name: &str) -> Result<ModuleId> {
            self.loads.push(name.to_string());
            let source = self
                .sources
                .get(name)
                .ok_or_else(|| Error::ReferenceError(format!("could not load '{}'", name)))?;
            engine.compile_module(source, name)
        }
    }

    #[test]
    fn test_compile_registers_module() {
        let mut engine = Engine::new();
        let id = engine.compile_module("export default 1;", "a.js").unwrap();
        assert_eq!(engine.find_module("a.js"), Some(id));
        assert_eq!(engine.module_name(id).unwrap(), "a.js");
        assert_eq!(engine.module(id).unwrap().status, ModuleStatus::Compiled);
    }

    #[test]
    fn test_compile_error_registers_nothing() {
        let mut engine = Engine::new();
        assert!(engine.compile_module("export {", "bad.js").is_err());
        assert_eq!(engine.module_count(), 0);
    }

    #[test]
    fn test_resolve_loads_each_dependency_once() {
        let mut engine = Engine::new();
        let mut host = MapHost::new(&[
            ("b.js", "import './c.js'; export const b = 1;"),
            ("c.js", "import './b.js'; export const c = 2;"),
        ]);
        let main = engine
            .compile_module("import { b } from './b.js'; import './c.js';", "main.js")
            .unwrap();

        engine.resolve_module(main, &mut host).unwrap();

        assert_eq!(host.loads, vec!["b.js", "c.js"]);
        let record = engine.module(main).unwrap();
        assert_eq!(record.status, ModuleStatus::Linked);
        assert_eq!(record.dependencies.len(), 2);
    }

    #[test]
    fn test_failed_resolution_can_be_retried() {
        let mut engine = Engine::new();
        let mut host = MapHost::new(&[]);
        let main = engine.compile_module("import 'missing.js';", "main.js").unwrap();

        let err = engine.resolve_module(main, &mut host).unwrap_err();
        assert_eq!(err.to_string(), "ReferenceError: could not load 'missing.js'");
        assert_eq!(engine.module(main).unwrap().status, ModuleStatus::Compiled);

        host.sources
            .insert("missing.js".to_string(), "export default 0;".to_string());
        engine.resolve_module(main, &mut host).unwrap();
    }

    #[test]
    fn test_evaluate_marks_dependencies() {
        let mut engine = Engine::new();
        let mut host = MapHost::new(&[("dep.js", "export const d = 1;")]);
        let main = engine.compile_module("import './dep.js';", "main.js").unwrap();

        engine.evaluate(main, &mut host).unwrap();

        let dep = engine.find_module("dep.js").unwrap();
        assert_eq!(engine.module(main).unwrap().status, ModuleStatus::Evaluated);
        assert_eq!(engine.module(dep).unwrap().status, ModuleStatus::Evaluated);
    }

    #[test]
    fn test_import_meta_is_per_module() {
        let mut engine = Engine::new();
        let a = engine.compile_module("", "a.js").unwrap();
        let b = engine.compile_module("", "b.js").unwrap();
        engine
            .import_meta_mut(a)
            .unwrap()
            .define("main", MetaValue::Bool(true));
        assert_eq!(engine.import_meta(a).unwrap().get_bool("main"), Some(true));
        assert!(engine.import_meta(b).unwrap().is_empty());
    }
}
