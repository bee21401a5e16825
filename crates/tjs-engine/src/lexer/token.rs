// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Token definitions.

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A token produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source text
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Token classes recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// Identifier or keyword (including `#private` names)
    Identifier = 0,
    /// Single- or double-quoted string literal, quotes included
    String = 1,
    /// Template literal, backticks included
    Template = 2,
    /// Numeric or BigInt literal
    Number = 3,
    /// Regular expression literal, slashes and flags included
    RegExp = 4,
    /// A single punctuation character
    Punctuator = 5,
    /// End of input
    Eof = 6,
}

impl TokenKind {
    /// Decodes a kind from its serialized tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::Identifier,
            1 => Self::String,
            2 => Self::Template,
            3 => Self::Number,
            4 => Self::RegExp,
            5 => Self::Punctuator,
            6 => Self::Eof,
            _ => return None,
        })
    }
}
