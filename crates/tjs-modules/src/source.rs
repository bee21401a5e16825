// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Source kinds and compiler input buffers

use crate::specifier::is_url;
use std::path::Path;

/// Text placed before JSON content
pub const JSON_PREFIX: &str = "export default JSON.parse(`";
/// Text placed after JSON content
pub const JSON_SUFFIX: &str = "`);";

/// What a module location contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JavaScript module on disk
    Script,
    /// Shared object; recognized but not compilable
    NativeAddon,
    /// JSON document exposed as the default export
    Json,
    /// JavaScript fetched over HTTP(S)
    RemoteScript,
    /// Embedded runtime library
    BuiltinBundle,
}

impl SourceKind {
    /// Classify a resolved location by URL scheme or file extension
    pub fn classify(location: &str) -> Self {
        if is_url(location) {
            return SourceKind::RemoteScript;
        }
        match Path::new(location).extension().and_then(|ext| ext.to_str()) {
            Some("so") => SourceKind::NativeAddon,
            Some("json") => SourceKind::Json,
            _ => SourceKind::Script,
        }
    }

    /// True for kinds backed by a file on disk
    pub fn is_file(self) -> bool {
        matches!(
            self,
            SourceKind::Script | SourceKind::NativeAddon | SourceKind::Json
        )
    }
}

/// Compiler input: UTF-8 text followed by a single NUL sentinel.
///
/// The logical length excludes the sentinel, and the text itself never
/// contains a NUL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBytes {
    buf: Vec<u8>,
}

impl SourceBytes {
    /// Build from text. Returns `None` if the text contains a NUL byte.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let mut buf = text.into().into_bytes();
        if buf.contains(&0) {
            return None;
        }
        buf.push(0);
        Some(Self { buf })
    }

    /// The logical source text
    pub fn text(&self) -> &str {
        // Constructed from a String with one ASCII byte appended
        std::str::from_utf8(&self.buf[..self.len()]).unwrap_or_default()
    }

    /// Logical length in bytes, excluding the sentinel
    pub fn len(&self) -> usize {
        self.buf.len() - 1
    }

    /// True if there is no logical content
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole buffer, sentinel included
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf
    }
}

/// Wrap JSON text as a module whose default export is the parsed value.
///
/// Backslashes, backticks and `${` are escaped so the template literal's
/// cooked value equals `content` exactly.
pub fn wrap_json(content: &str) -> String {
    let mut out = String::with_capacity(JSON_PREFIX.len() + content.len() + JSON_SUFFIX.len());
    out.push_str(JSON_PREFIX);
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out.push_str(JSON_SUFFIX);
    out
}
