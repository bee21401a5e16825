// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Built-in library bootstrap
//!
//! Two blobs are embedded at build time: the root bundle, evaluated at
//! startup to populate globals, and the standard library, registered as
//! the importable module [`STD_MODULE_NAME`]. Whether the blobs hold
//! bytecode or source text is fixed by the `bootstrap-bytecode` feature.

use crate::compiler::compile;
use crate::config::ModuleConfig;
use crate::error::{ModuleError, Result};
use crate::host::ModuleLoader;
use crate::import_meta::stamp;
use crate::probe::probe;
use crate::resolver::Resolution;
use crate::loader::LoadedSource;
use crate::source::{SourceBytes, SourceKind};
use std::path::Path;
use tjs_engine::{ByteOrder, Engine, ModuleId};
use tracing::{debug, info};

/// Registry key of the standard library
pub const STD_MODULE_NAME: &str = "@tjs/std";

/// Registry key of the root bundle
pub const BUNDLE_MODULE_NAME: &str = "@tjs/bundle";

/// How embedded blobs are materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapMode {
    /// Blobs are serialized modules, read without parsing
    Bytecode,
    /// Blobs are source text, compiled at startup
    Source,
}

/// Mode of the embedded blobs
pub const BOOTSTRAP_MODE: BootstrapMode = if cfg!(feature = "bootstrap-bytecode") {
    BootstrapMode::Bytecode
} else {
    BootstrapMode::Source
};

static EMBEDDED_BUNDLE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/bundle.bin"));
static EMBEDDED_STD: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/std.bin"));

/// A pair of bootstrap blobs and the mode they are stored in
#[derive(Debug, Clone, Copy)]
pub struct Bootstrap<'a> {
    /// Storage mode
    pub mode: BootstrapMode,
    /// Root bundle
    pub bundle: &'a [u8],
    /// Standard library
    pub std: &'a [u8],
}

impl Bootstrap<'static> {
    /// The blobs compiled into this binary
    pub fn embedded() -> Self {
        Self {
            mode: BOOTSTRAP_MODE,
            bundle: EMBEDDED_BUNDLE,
            std: EMBEDDED_STD,
        }
    }
}

impl Bootstrap<'_> {
    /// Evaluate the root bundle
    pub fn bootstrap_globals(&self, engine: &mut Engine, loader: &mut ModuleLoader) -> Result<ModuleId> {
        let id = match self.mode {
            BootstrapMode::Bytecode => read_blob(engine, self.bundle, BUNDLE_MODULE_NAME)?,
            BootstrapMode::Source => {
                let source = source_blob(self.bundle, BUNDLE_MODULE_NAME)?;
                compile(engine, &source.bytes, BUNDLE_MODULE_NAME)?
            }
        };
        engine.evaluate(id, loader)?;
        debug!(mode = ?self.mode, "evaluated root bundle");
        Ok(id)
    }

    /// Register the standard library as an importable module.
    ///
    /// From source the module is also evaluated. From bytecode it is only
    /// linked.
    pub fn add_stdlib(&self, engine: &mut Engine, loader: &mut ModuleLoader) -> Result<ModuleId> {
        let id = match self.mode {
            BootstrapMode::Bytecode => {
                let id = read_blob(engine, self.std, STD_MODULE_NAME)?;
                engine.resolve_module(id, loader)?;
                stamp(engine, id, STD_MODULE_NAME, false, false)?;
                id
            }
            BootstrapMode::Source => {
                let source = source_blob(self.std, STD_MODULE_NAME)?;
                let id = compile(engine, &source.bytes, STD_MODULE_NAME)?;
                stamp(engine, id, STD_MODULE_NAME, false, false)?;
                engine.evaluate(id, loader)?;
                id
            }
        };
        debug!(mode = ?self.mode, module = STD_MODULE_NAME, "registered standard library");
        Ok(id)
    }
}

/// Deserialize a blob stored in this host's byte order and check its name
fn read_blob(engine: &mut Engine, blob: &[u8], expected: &str) -> Result<ModuleId> {
    let bytecode_error = |source| ModuleError::Bytecode {
        name: expected.to_string(),
        source,
    };
    let id = engine
        .read_module(blob, ByteOrder::Native)
        .map_err(bytecode_error)?;
    let name = engine.module_name(id)?;
    if name != expected {
        return Err(bytecode_error(tjs_engine::Error::Bytecode(format!(
            "blob holds module '{}'",
            name
        ))));
    }
    Ok(id)
}

fn source_blob(blob: &[u8], name: &str) -> Result<LoadedSource> {
    let invalid = |reason: &str| ModuleError::InvalidSource {
        path: name.to_string(),
        reason: reason.to_string(),
    };
    let text = std::str::from_utf8(blob).map_err(|_| invalid("not valid UTF-8"))?;
    let bytes = SourceBytes::new(text).ok_or_else(|| invalid("contains a NUL byte"))?;
    Ok(LoadedSource {
        bytes,
        kind: SourceKind::BuiltinBundle,
    })
}

/// Process-wide runtime state, created once at startup
#[derive(Debug)]
pub struct RuntimeEnv {
    engine: Engine,
    loader: ModuleLoader,
}

impl RuntimeEnv {
    /// Bootstrap a runtime from the embedded blobs.
    ///
    /// Any error here means the runtime has no usable built-ins; callers
    /// should treat it as fatal.
    pub fn init(config: ModuleConfig) -> Result<Self> {
        Self::with_bootstrap(ModuleLoader::with_config(config), Bootstrap::embedded())
    }

    /// Bootstrap a runtime from explicit blobs and module loader
    pub fn with_bootstrap(mut loader: ModuleLoader, bootstrap: Bootstrap<'_>) -> Result<Self> {
        let mut engine = Engine::new();
        bootstrap.bootstrap_globals(&mut engine, &mut loader)?;
        bootstrap.add_stdlib(&mut engine, &mut loader)?;
        info!(mode = ?bootstrap.mode, modules = engine.module_count(), "runtime bootstrapped");
        Ok(Self { engine, loader })
    }

    /// The engine and its module registry
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The module loader
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Resolve a specifier without loading it
    pub fn resolve(&self, specifier: &str, referrer: &str) -> Resolution {
        self.loader.resolve(specifier, referrer)
    }

    /// Load the process entry module, link its imports and evaluate it
    pub fn run_main(&mut self, path: &str) -> Result<ModuleId> {
        let location = match probe(Path::new(path)) {
            Some(found) => found.to_string_lossy().into_owned(),
            None => path.to_string(),
        };
        let id = self.loader.load_module(&mut self.engine, &location, true)?;
        self.engine.evaluate(id, &mut self.loader)?;
        Ok(id)
    }
}
