// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The scanner that produces tokens from module source text.

use super::{Span, Token, TokenKind};
use crate::{Error, Result};
use unicode_xid::UnicodeXID;

/// Keywords after which a `/` starts a regular expression literal.
const KEYWORDS_BEFORE_EXPRESSION: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

/// A scanner that tokenizes JavaScript source code.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    /// Last token produced; decides between regex literal and division.
    previous: Option<Token>,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            previous: None,
        };
        if source.starts_with("#!") {
            scanner.skip_line();
        }
        scanner
    }

    /// Returns the source text covered by a token.
    pub fn text(&self, token: &Token) -> &'a str {
        &self.source[token.span.start..token.span.end]
    }

    /// Scans the whole input, excluding the trailing `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.kind == TokenKind::Eof {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;

        let start = self.current_pos;

        let Some((_pos, ch)) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, Span::new(start, start)));
        };

        let kind = match ch {
            '"' | '\'' => self.scan_string(ch, start)?,
            '`' => self.scan_template(start)?,
            '0'..='9' => self.scan_number(start),
            '.' if matches!(self.peek(), Some('0'..='9')) => self.scan_number(start),
            '/' if self.regex_allowed() => self.scan_regexp(start)?,
            '#' if self.peek().is_some_and(is_id_start) => self.scan_identifier(),
            _ if is_id_start(ch) => self.scan_identifier(),
            _ if ch.is_ascii_punctuation() => TokenKind::Punctuator,
            _ => return Err(self.error(start, format!("unexpected character {:?}", ch))),
        };

        let token = Token::new(kind, Span::new(start, self.current_pos));
        self.previous = Some(token);
        Ok(token)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            self.advance();
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => self.skip_line(),
                    Some('*') => {
                        let start = self.current_pos;
                        self.advance(); // consume '/'
                        self.advance(); // consume '*'
                        let mut prev = ' ';
                        loop {
                            let Some((_, ch)) = self.advance() else {
                                return Err(self.error(start, "unterminated comment"));
                            };
                            if prev == '*' && ch == '/' {
                                break;
                            }
                            prev = ch;
                        }
                    }
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn regex_allowed(&self) -> bool {
        let Some(previous) = self.previous else {
            return true;
        };
        let text = &self.source[previous.span.start..previous.span.end];
        match previous.kind {
            TokenKind::Punctuator => !matches!(text, ")" | "]" | "}"),
            TokenKind::Identifier => KEYWORDS_BEFORE_EXPRESSION.contains(&text),
            _ => false,
        }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        while self.peek().is_some_and(is_id_continue) {
            self.advance();
        }
        TokenKind::Identifier
    }

    fn scan_number(&mut self, start: usize) -> TokenKind {
        let hex = self.source[start..].starts_with("0x") || self.source[start..].starts_with("0X");
        let mut last = ' ';
        while let Some(ch) = self.peek() {
            let exponent_sign = (ch == '+' || ch == '-') && (last == 'e' || last == 'E') && !hex;
            if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign) {
                break;
            }
            self.advance();
            last = ch;
        }
        TokenKind::Number
    }

    fn scan_string(&mut self, quote: char, start: usize) -> Result<TokenKind> {
        loop {
            match self.advance() {
                None | Some((_, '\n' | '\r')) => {
                    return Err(self.error(start, "unterminated string literal"));
                }
                Some((_, '\\')) => {
                    if self.advance().is_none() {
                        return Err(self.error(start, "unterminated string literal"));
                    }
                }
                Some((_, ch)) if ch == quote => return Ok(TokenKind::String),
                Some(_) => {}
            }
        }
    }

    fn scan_template(&mut self, start: usize) -> Result<TokenKind> {
        loop {
            match self.advance() {
                None => return Err(self.error(start, "unterminated template literal")),
                Some((_, '`')) => return Ok(TokenKind::Template),
                Some((_, '\\')) => {
                    if self.advance().is_none() {
                        return Err(self.error(start, "unterminated template literal"));
                    }
                }
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    self.scan_substitution(start)?;
                }
                Some(_) => {}
            }
        }
    }

    /// Consumes a `${ ... }` substitution, including nested templates.
    fn scan_substitution(&mut self, template_start: usize) -> Result<()> {
        let mut depth = 0usize;
        loop {
            let token = self.next_token()?;
            match (token.kind, self.text(&token)) {
                (TokenKind::Eof, _) => {
                    return Err(self.error(template_start, "unterminated template literal"));
                }
                (TokenKind::Punctuator, "{") => depth += 1,
                (TokenKind::Punctuator, "}") if depth == 0 => return Ok(()),
                (TokenKind::Punctuator, "}") => depth -= 1,
                _ => {}
            }
        }
    }

    fn scan_regexp(&mut self, start: usize) -> Result<TokenKind> {
        let mut in_class = false;
        loop {
            match self.advance() {
                None | Some((_, '\n' | '\r')) => {
                    return Err(self.error(start, "unterminated regular expression literal"));
                }
                Some((_, '\\')) => match self.advance() {
                    None | Some((_, '\n' | '\r')) => {
                        return Err(self.error(start, "unterminated regular expression literal"));
                    }
                    Some(_) => {}
                },
                Some((_, '[')) => in_class = true,
                Some((_, ']')) => in_class = false,
                Some((_, '/')) if !in_class => break,
                Some(_) => {}
            }
        }
        // Flags
        while self.peek().is_some_and(is_id_continue) {
            self.advance();
        }
        Ok(TokenKind::RegExp)
    }

    fn error(&self, offset: usize, message: impl std::fmt::Display) -> Error {
        let (line, column) = line_column(self.source, offset);
        Error::SyntaxError(format!("{} at {}:{}", message, line, column))
    }
}

/// Converts a byte offset to a 1-based (line, column) pair.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(newline) => before[newline + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

fn is_id_start(ch: char) -> bool {
    ch == '$' || ch == '_' || UnicodeXID::is_xid_start(ch)
}

fn is_id_continue(ch: char) -> bool {
    ch == '$' || ch == '\u{200c}' || ch == '\u{200d}' || UnicodeXID::is_xid_continue(ch)
}
