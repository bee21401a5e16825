// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # tjs-modules
//!
//! Module resolution, loading and built-in bootstrap for the tjs runtime.
//!
//! A specifier requested by a module flows through:
//!
//! 1. [`ModuleResolver`] - classify the specifier and find the file behind it
//!    (probing `<stem>`, `<stem>.js`, `<stem>/index.js`, `<stem>.so`, and
//!    walking `TJS_LIBRARY_PATH` for bare names)
//! 2. [`ContentLoader`] - read or fetch the content, wrapping JSON as a module
//! 3. [`compile`] - compile-only, through the engine
//! 4. [`stamp`] - attach `import.meta.url`, `main`, `dirname` and `basename`
//!
//! [`ModuleLoader`] wires these into the engine's [`ModuleHost`] hooks, and
//! [`RuntimeEnv`] owns the engine after the embedded library is bootstrapped.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tjs_modules::{ModuleConfig, RuntimeEnv};
//!
//! let mut env = RuntimeEnv::init(ModuleConfig::from_env()).expect("bootstrap failed");
//! env.run_main("./main.js").unwrap();
//! ```
//!
//! [`ModuleHost`]: tjs_engine::ModuleHost

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod compiler;
pub mod config;
pub mod error;
pub mod fetch;
pub mod host;
pub mod import_meta;
pub mod loader;
pub mod probe;
pub mod resolver;
pub mod search;
pub mod source;
pub mod specifier;

pub use bootstrap::{
    Bootstrap, BootstrapMode, RuntimeEnv, BOOTSTRAP_MODE, BUNDLE_MODULE_NAME, STD_MODULE_NAME,
};
pub use compiler::compile;
pub use config::{ModuleConfig, LIBRARY_PATH_ENV};
pub use error::{FetchFailure, ModuleError, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use host::ModuleLoader;
pub use import_meta::stamp;
pub use loader::{ContentLoader, LoadedSource};
pub use resolver::{ModuleResolver, Resolution};
pub use source::{SourceBytes, SourceKind};
pub use specifier::SpecifierKind;
