// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The engine's module hooks
//!
//! [`ModuleLoader`] is what the engine calls back into while linking:
//! `normalize` maps an import to its registry key through the resolver,
//! `load` runs the content loader, compiles the result and stamps its
//! `import.meta`.

use crate::compiler::compile;
use crate::config::ModuleConfig;
use crate::error::{ModuleError, Result};
use crate::fetch::Fetcher;
use crate::import_meta::stamp;
use crate::loader::ContentLoader;
use crate::resolver::{ModuleResolver, Resolution};
use crate::source::SourceKind;
use tjs_engine::{Engine, ModuleHost, ModuleId};
use tracing::debug;

/// Resolver and content loader bound together as the engine's host
#[derive(Debug, Default)]
pub struct ModuleLoader {
    resolver: ModuleResolver,
    content: ContentLoader,
}

impl ModuleLoader {
    /// Create a loader with the given search configuration and HTTP transport
    pub fn new(config: ModuleConfig, fetcher: Box<dyn Fetcher>) -> Self {
        Self {
            resolver: ModuleResolver::new(config),
            content: ContentLoader::new(fetcher),
        }
    }

    /// Create a loader with the given search configuration and the default transport
    pub fn with_config(config: ModuleConfig) -> Self {
        Self {
            resolver: ModuleResolver::new(config),
            content: ContentLoader::default(),
        }
    }

    /// The specifier resolver
    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Resolve `specifier` as imported by the module at `referrer`
    pub fn resolve(&self, specifier: &str, referrer: &str) -> Resolution {
        self.resolver.resolve(specifier, referrer)
    }

    /// Load, compile and stamp the module at a resolved location.
    ///
    /// The module is registered under `location` and is not evaluated.
    pub fn load_module(&self, engine: &mut Engine, location: &str, is_main: bool) -> Result<ModuleId> {
        let loaded = self.content.load(location)?;
        if loaded.kind == SourceKind::NativeAddon {
            return Err(ModuleError::Unsupported {
                module: location.to_string(),
                reason: "native addons cannot be compiled".to_string(),
            });
        }

        let id = compile(engine, &loaded.bytes, location)?;
        stamp(engine, id, location, loaded.kind.is_file(), is_main)?;
        debug!(module = location, kind = ?loaded.kind, main = is_main, "loaded module");
        Ok(id)
    }
}

impl ModuleHost for ModuleLoader {
    fn normalize(&mut self, base: &str, specifier: &str) -> String {
        self.resolver.resolve(specifier, base).into_location()
    }

    fn load(&mut self, engine: &mut Engine, name: &str) -> tjs_engine::Result<ModuleId> {
        Ok(self.load_module(engine, name, false)?)
    }
}
