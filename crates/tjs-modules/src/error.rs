// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module resolution and loading

use thiserror::Error;

/// Result type for module operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Why a remote module could not be fetched
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The server answered with something other than 200
    #[error("code: {0}")]
    Status(u16),
    /// The request never produced a response
    #[error("{0}")]
    Transport(String),
}

/// Errors that can occur while resolving, loading, compiling or stamping a module
#[derive(Debug, Error)]
pub enum ModuleError {
    /// No file backs the resolved location
    #[error("could not load '{0}'")]
    NotFound(String),

    /// A URL specifier could not be fetched
    #[error("could not load '{url}' {reason}")]
    Fetch {
        /// The URL that was requested
        url: String,
        /// Status or transport failure
        reason: FetchFailure,
    },

    /// The engine rejected the module source
    #[error("{module}: {source}")]
    Compile {
        /// Module name
        module: String,
        /// Engine diagnostic
        source: tjs_engine::Error,
    },

    /// A bytecode blob could not be deserialized or linked
    #[error("{name}: {source}")]
    Bytecode {
        /// Name of the blob
        name: String,
        /// Engine diagnostic
        source: tjs_engine::Error,
    },

    /// Canonicalizing a module path failed
    #[error("realpath failure for '{path}': {source}")]
    RealPath {
        /// The path being canonicalized
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// File system error
    #[error("{path}: {source}")]
    Io {
        /// The file being accessed
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Module content cannot be handed to the compiler
    #[error("invalid module source '{path}': {reason}")]
    InvalidSource {
        /// The file that was read
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// A module of a kind the engine cannot compile
    #[error("cannot import '{module}': {reason}")]
    Unsupported {
        /// Module name
        module: String,
        /// Why it is unsupported
        reason: String,
    },

    /// Engine operation failed outside compilation
    #[error(transparent)]
    Engine(tjs_engine::Error),
}

impl ModuleError {
    /// Create an I/O error, reporting missing files as `NotFound`
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

impl From<tjs_engine::Error> for ModuleError {
    fn from(err: tjs_engine::Error) -> Self {
        // Unwrap errors raised by our own host hooks
        match err {
            tjs_engine::Error::Host(inner) => match inner.downcast::<ModuleError>() {
                Ok(module_err) => *module_err,
                Err(other) => Self::Engine(tjs_engine::Error::Host(other)),
            },
            other => Self::Engine(other),
        }
    }
}

impl From<ModuleError> for tjs_engine::Error {
    fn from(err: ModuleError) -> Self {
        tjs_engine::Error::Host(Box::new(err))
    }
}
