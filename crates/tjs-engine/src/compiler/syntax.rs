// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module-level syntax analysis.
//!
//! Checks delimiter structure and extracts the static `import` and `export`
//! declarations of a module. Only top-level declarations are considered;
//! `import(...)` and `import.meta` are ordinary expressions.

use crate::lexer::{line_column, Scanner, Token, TokenKind};
use crate::{Error, Result};

/// Static module structure extracted from a token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSyntax {
    /// Import specifiers, in source order, deduplicated
    pub requests: Vec<String>,
    /// Exported binding names
    pub exports: Vec<String>,
    /// Specifiers re-exported with `export * from`
    pub star_exports: Vec<String>,
}

impl ModuleSyntax {
    fn add_request(&mut self, specifier: String) {
        if !self.requests.contains(&specifier) {
            self.requests.push(specifier);
        }
    }
}

/// Analyzes a tokenized module.
pub fn analyze(scanner: &Scanner<'_>, source: &str, tokens: &[Token]) -> Result<ModuleSyntax> {
    let mut parser = Parser {
        scanner,
        source,
        tokens,
        pos: 0,
        syntax: ModuleSyntax::default(),
    };
    parser.parse()?;
    Ok(parser.syntax)
}

struct Parser<'s, 'a> {
    scanner: &'s Scanner<'a>,
    source: &'s str,
    tokens: &'s [Token],
    pos: usize,
    syntax: ModuleSyntax,
}

impl<'s, 'a> Parser<'s, 'a> {
    fn parse(&mut self) -> Result<()> {
        let mut open: Vec<Token> = Vec::new();

        while let Some(token) = self.current() {
            let text = self.text(&token);
            match token.kind {
                TokenKind::Punctuator => match text {
                    "(" | "[" | "{" => open.push(token),
                    ")" | "]" | "}" => {
                        let matches = open.pop().is_some_and(|opener| {
                            matches!(
                                (self.text(&opener), text),
                                ("(", ")") | ("[", "]") | ("{", "}")
                            )
                        });
                        if !matches {
                            return Err(self.error(&token, format!("unexpected token '{}'", text)));
                        }
                    }
                    _ => {}
                },
                TokenKind::Identifier if open.is_empty() && !self.after_dot() => match text {
                    "import" => {
                        self.parse_import()?;
                        continue;
                    }
                    "export" => {
                        self.parse_export()?;
                        continue;
                    }
                    _ => {}
                },
                _ => {}
            }
            self.pos += 1;
        }

        match open.last() {
            Some(opener) => Err(self.error(
                opener,
                format!("unexpected end of input, '{}' is never closed", self.text(opener)),
            )),
            None => Ok(()),
        }
    }

    /// `import` at `self.pos`.
    fn parse_import(&mut self) -> Result<()> {
        let keyword = self.bump()?;
        let Some(next) = self.current() else {
            return Err(self.error(&keyword, "unexpected end of input after 'import'"));
        };

        match (next.kind, self.text(&next)) {
            // import(...) and import.meta
            (TokenKind::Punctuator, "(" | ".") => return Ok(()),
            (TokenKind::String, _) => {
                let specifier = self.string_value(&next);
                self.pos += 1;
                self.syntax.add_request(specifier);
                return Ok(());
            }
            _ => {}
        }

        // Default binding
        if self.at_kind(TokenKind::Identifier) {
            let binding = self.bump()?;
            if self.text(&binding) == "from" && self.at_kind(TokenKind::String) {
                // `import from 'x'` is not a binding form
                return Err(self.error(&binding, "unexpected token 'from'"));
            }
            if self.at_punct(",") {
                self.pos += 1;
            } else {
                return self.parse_from_clause(&keyword, false);
            }
        }

        if self.at_punct("*") {
            self.pos += 1;
            self.expect_identifier("as")?;
            self.expect_kind(TokenKind::Identifier)?;
        } else if self.at_punct("{") {
            self.skip_braces()?;
        } else {
            let token = self.current().unwrap_or(keyword);
            return Err(self.error(&token, "unexpected token in import declaration"));
        }

        self.parse_from_clause(&keyword, false)
    }

    /// `export` at `self.pos`.
    fn parse_export(&mut self) -> Result<()> {
        let keyword = self.bump()?;
        let next = self.bump().map_err(|_| {
            self.error(&keyword, "unexpected end of input after 'export'")
        })?;

        match (next.kind, self.text(&next)) {
            (TokenKind::Identifier, "default") => self.add_export(&next, "default".to_string()),
            (TokenKind::Punctuator, "*") => {
                if self.at_identifier("as") {
                    self.pos += 1;
                    let name = self.bump()?;
                    let exported = self.binding_name(&name)?;
                    self.add_export(&name, exported)?;
                    self.parse_from_clause(&keyword, false)
                } else {
                    self.parse_from_clause(&keyword, true)
                }
            }
            (TokenKind::Punctuator, "{") => {
                self.parse_export_list()?;
                if self.at_identifier("from") {
                    self.parse_from_clause(&keyword, false)?;
                }
                Ok(())
            }
            (TokenKind::Identifier, "const" | "let" | "var") => self.parse_exported_binding(),
            (TokenKind::Identifier, "async") => {
                self.expect_identifier("function")?;
                self.parse_exported_function()
            }
            (TokenKind::Identifier, "function") => self.parse_exported_function(),
            (TokenKind::Identifier, "class") => {
                let name = self.expect_kind(TokenKind::Identifier)?;
                let exported = self.text(&name).to_string();
                self.add_export(&name, exported)
            }
            (_, text) => Err(self.error(&next, format!("unexpected token '{}' after export", text))),
        }
    }

    /// `from '<specifier>'`
    fn parse_from_clause(&mut self, keyword: &Token, star: bool) -> Result<()> {
        if !self.at_identifier("from") {
            let token = self.current().unwrap_or(*keyword);
            return Err(self.error(&token, "expected 'from' clause"));
        }
        self.pos += 1;
        let specifier = self.expect_kind(TokenKind::String)?;
        let specifier = self.string_value(&specifier);
        if star {
            self.syntax.star_exports.push(specifier.clone());
        }
        self.syntax.add_request(specifier);
        Ok(())
    }

    /// `{ a, b as c, 'd' as e }` after the opening brace.
    fn parse_export_list(&mut self) -> Result<()> {
        loop {
            let token = self.bump()?;
            if self.text(&token) == "}" {
                return Ok(());
            }
            let mut exported = self.binding_name(&token)?;
            let mut exported_token = token;
            if self.at_identifier("as") {
                self.pos += 1;
                exported_token = self.bump()?;
                exported = self.binding_name(&exported_token)?;
            }
            self.add_export(&exported_token, exported)?;

            let separator = self.bump()?;
            match self.text(&separator) {
                "," => {}
                "}" => return Ok(()),
                text => {
                    return Err(self.error(&separator, format!("unexpected token '{}' in export list", text)));
                }
            }
        }
    }

    fn parse_exported_function(&mut self) -> Result<()> {
        if self.at_punct("*") {
            self.pos += 1;
        }
        let name = self.expect_kind(TokenKind::Identifier)?;
        let exported = self.text(&name).to_string();
        self.add_export(&name, exported)
    }

    /// First declarator of `export const|let|var`.
    fn parse_exported_binding(&mut self) -> Result<()> {
        let Some(token) = self.current() else {
            return Err(self.error(&self.tokens[self.pos - 1], "unexpected end of input"));
        };
        match (token.kind, self.text(&token)) {
            (TokenKind::Identifier, name) => {
                self.pos += 1;
                self.add_export(&token, name.to_string())
            }
            (TokenKind::Punctuator, "{" | "[") => self.parse_binding_pattern(),
            (_, text) => Err(self.error(&token, format!("unexpected token '{}' in declaration", text))),
        }
    }

    /// Collects names bound by a destructuring pattern starting at the opener.
    fn parse_binding_pattern(&mut self) -> Result<()> {
        let mut depth = 0usize;
        let mut in_default = false;
        loop {
            let token = self.bump()?;
            let text = self.text(&token);
            match (token.kind, text) {
                (TokenKind::Punctuator, "{" | "[" | "(") => depth += 1,
                (TokenKind::Punctuator, "}" | "]" | ")") => {
                    depth -= 1;
                    in_default = false;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                (TokenKind::Punctuator, ",") if in_default => in_default = false,
                (TokenKind::Punctuator, "=") => in_default = true,
                (TokenKind::Identifier, name) if !in_default => {
                    let follows = self.current().map(|next| self.text(&next));
                    if matches!(follows, Some("," | "}" | "]" | "=")) {
                        self.add_export(&token, name.to_string())?;
                    }
                }
                _ => {}
            }
        }
    }

    fn skip_braces(&mut self) -> Result<()> {
        let opener = self.bump()?;
        loop {
            let token = self.bump().map_err(|_| {
                self.error(&opener, "unexpected end of input, '{' is never closed")
            })?;
            if self.text(&token) == "}" {
                return Ok(());
            }
        }
    }

    fn add_export(&mut self, token: &Token, name: String) -> Result<()> {
        if self.syntax.exports.contains(&name) {
            return Err(self.error(token, format!("duplicate exported name '{}'", name)));
        }
        self.syntax.exports.push(name);
        Ok(())
    }

    fn binding_name(&self, token: &Token) -> Result<String> {
        match token.kind {
            TokenKind::Identifier => Ok(self.text(token).to_string()),
            TokenKind::String => Ok(self.string_value(token)),
            _ => Err(self.error(token, format!("unexpected token '{}'", self.text(token)))),
        }
    }

    fn string_value(&self, token: &Token) -> String {
        let text = self.text(token);
        unescape(&text[1..text.len() - 1])
    }

    fn current(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(*token)
            }
            None => {
                let end = self.source.len();
                let (line, column) = line_column(self.source, end);
                Err(Error::SyntaxError(format!(
                    "unexpected end of input at {}:{}",
                    line, column
                )))
            }
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        self.scanner.text(token)
    }

    fn after_dot(&self) -> bool {
        self.pos > 0 && self.text(&self.tokens[self.pos - 1]) == "."
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|token| token.kind == kind)
    }

    fn at_punct(&self, text: &str) -> bool {
        self.current()
            .is_some_and(|token| token.kind == TokenKind::Punctuator && self.text(&token) == text)
    }

    fn at_identifier(&self, text: &str) -> bool {
        self.current()
            .is_some_and(|token| token.kind == TokenKind::Identifier && self.text(&token) == text)
    }

    fn expect_identifier(&mut self, text: &str) -> Result<Token> {
        let token = self.bump()?;
        if token.kind == TokenKind::Identifier && self.text(&token) == text {
            Ok(token)
        } else {
            Err(self.error(&token, format!("expected '{}'", text)))
        }
    }

    fn expect_kind(&mut self, kind: TokenKind) -> Result<Token> {
        let token = self.bump()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.error(&token, format!("unexpected token '{}'", self.text(&token))))
        }
    }

    fn error(&self, token: &Token, message: impl std::fmt::Display) -> Error {
        let (line, column) = line_column(self.source, token.span.start);
        Error::SyntaxError(format!("{} at {}:{}", message, line, column))
    }
}

/// Resolves the simple escapes that can appear in a module specifier.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
