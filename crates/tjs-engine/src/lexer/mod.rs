// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Lexical analysis for module source text.
//!
//! The scanner only distinguishes the token classes the module front end
//! needs: identifiers, literals, and single-character punctuators. Operators
//! are not combined; `=>` is two punctuators.
//!
//! ```rust
//! use tjs_engine::lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("export const x = 42;");
//! let token = scanner.next_token().unwrap();
//! assert_eq!(token.kind, TokenKind::Identifier);
//! assert_eq!(scanner.text(&token), "export");
//! ```

mod scanner;
mod token;

pub use scanner::{Scanner, line_column};
pub use token::{Span, Token, TokenKind};
