// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module specifier classification

/// The syntactic class of an import specifier, decided by prefix alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `./name`
    Relative,
    /// `../name`
    ParentRelative,
    /// `/path/name`
    Absolute,
    /// `http://...` or `https://...`
    Url,
    /// Anything else: a library or built-in module name
    Bare,
}

impl SpecifierKind {
    /// Classify a raw specifier
    pub fn classify(specifier: &str) -> Self {
        if specifier.starts_with("./") {
            SpecifierKind::Relative
        } else if specifier.starts_with("../") {
            SpecifierKind::ParentRelative
        } else if specifier.starts_with('/') {
            SpecifierKind::Absolute
        } else if is_url(specifier) {
            SpecifierKind::Url
        } else {
            SpecifierKind::Bare
        }
    }
}

/// Returns true if the specifier names an HTTP(S) resource
pub fn is_url(specifier: &str) -> bool {
    specifier.starts_with("http://") || specifier.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(SpecifierKind::classify("./a"), SpecifierKind::Relative);
        assert_eq!(SpecifierKind::classify("../a"), SpecifierKind::ParentRelative);
        assert_eq!(SpecifierKind::classify("/a/b.js"), SpecifierKind::Absolute);
        assert_eq!(SpecifierKind::classify("http://x.test/a.js"), SpecifierKind::Url);
        assert_eq!(SpecifierKind::classify("https://x.test/a.js"), SpecifierKind::Url);
        assert_eq!(SpecifierKind::classify("@tjs/std"), SpecifierKind::Bare);
        assert_eq!(SpecifierKind::classify("lodash"), SpecifierKind::Bare);
        // Prefix test only: these are bare
        assert_eq!(SpecifierKind::classify(".hidden"), SpecifierKind::Bare);
        assert_eq!(SpecifierKind::classify("httpx"), SpecifierKind::Bare);
        assert_eq!(SpecifierKind::classify("ftp://x.test/a.js"), SpecifierKind::Bare);
    }
}
