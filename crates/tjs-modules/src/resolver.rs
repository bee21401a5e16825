// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module specifier resolution
//!
//! Resolution never fails. A specifier that matches no file is passed
//! through in a usable form so the engine's registry can still key on it:
//! built-in names like `@tjs/std` depend on this.

use crate::config::ModuleConfig;
use crate::probe::probe;
use crate::search::search;
use crate::specifier::{is_url, SpecifierKind};
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Outcome of resolving a specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A filesystem path, either probed or joined against the referrer
    Resolved(PathBuf),
    /// The specifier itself: a URL, a built-in name, or a path with no file
    Unchanged(String),
}

impl Resolution {
    /// The location used as registry key and reported URL
    pub fn location(&self) -> Cow<'_, str> {
        match self {
            Resolution::Resolved(path) => path.to_string_lossy(),
            Resolution::Unchanged(name) => Cow::Borrowed(name),
        }
    }

    /// Consume into the location string
    pub fn into_location(self) -> String {
        match self {
            Resolution::Resolved(path) => path.to_string_lossy().into_owned(),
            Resolution::Unchanged(name) => name,
        }
    }
}

/// Resolver mapping `(specifier, referrer)` to a module location
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    config: ModuleConfig,
}

impl ModuleResolver {
    /// Create a resolver using the given search configuration
    pub fn new(config: ModuleConfig) -> Self {
        Self { config }
    }

    /// The search configuration
    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Resolve a specifier requested by the module at `referrer`
    pub fn resolve(&self, specifier: &str, referrer: &str) -> Resolution {
        let kind = SpecifierKind::classify(specifier);
        let resolution = match kind {
            SpecifierKind::Relative | SpecifierKind::ParentRelative if is_url(referrer) => {
                Resolution::Unchanged(join_url(referrer, specifier))
            }
            SpecifierKind::Relative | SpecifierKind::ParentRelative => {
                let joined = join_normalized(&referrer_dir(referrer), specifier);
                Resolution::Resolved(probe(&joined).unwrap_or(joined))
            }
            SpecifierKind::Absolute => match probe(Path::new(specifier)) {
                Some(path) => Resolution::Resolved(path),
                None => Resolution::Unchanged(specifier.to_string()),
            },
            SpecifierKind::Bare => match search(specifier, &self.config.library_paths) {
                Some(path) => Resolution::Resolved(path),
                None => Resolution::Unchanged(specifier.to_string()),
            },
            SpecifierKind::Url => Resolution::Unchanged(specifier.to_string()),
        };
        debug!(specifier, referrer, ?kind, resolved = %resolution.location(), "resolved module");
        resolution
    }
}

/// Directory of the referrer; `.` when it has none
fn referrer_dir(referrer: &str) -> PathBuf {
    match Path::new(referrer).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None if referrer.starts_with('/') => PathBuf::from("/"),
        None => PathBuf::from("."),
    }
}

/// Resolve a relative specifier against a remote referrer
fn join_url(referrer: &str, specifier: &str) -> String {
    match url::Url::parse(referrer).and_then(|base| base.join(specifier)) {
        Ok(joined) => joined.into(),
        Err(err) => {
            debug!(referrer, specifier, %err, "joining against referrer text");
            let dir = referrer.rfind('/').map_or(referrer, |idx| &referrer[..idx]);
            format!("{}/{}", dir, specifier)
        }
    }
}

/// Join and collapse `.` and `..` components lexically
fn join_normalized(dir: &Path, specifier: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in dir.join(specifier).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }

    if out.is_relative() && !out.starts_with("..") {
        Path::new(".").join(out)
    } else {
        out
    }
}
