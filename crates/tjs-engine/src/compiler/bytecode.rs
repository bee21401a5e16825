// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Lowered module code: an atom table plus a token-level instruction stream.

use crate::lexer::{Scanner, Token, TokenKind};
use rustc_hash::FxHashMap;

/// A single instruction: a token class and the atom holding its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Token class
    pub kind: TokenKind,
    /// Index into the atom table
    pub atom: u32,
}

/// A compiled code chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytecode {
    /// Interned token texts
    pub atoms: Vec<String>,
    /// The instructions
    pub instructions: Vec<Instruction>,
}

impl Bytecode {
    /// Creates an empty chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowers a token stream, interning every token text once.
    pub fn from_tokens(scanner: &Scanner<'_>, tokens: &[Token]) -> Self {
        let mut bytecode = Self::new();
        let mut interned: FxHashMap<&str, u32> = FxHashMap::default();
        for token in tokens {
            let text = scanner.text(token);
            let atom = *interned.entry(text).or_insert_with(|| {
                bytecode.atoms.push(text.to_string());
                (bytecode.atoms.len() - 1) as u32
            });
            bytecode.instructions.push(Instruction {
                kind: token.kind,
                atom,
            });
        }
        bytecode
    }

    /// Returns the text of an instruction's atom.
    pub fn text(&self, instruction: &Instruction) -> Option<&str> {
        self.atoms.get(instruction.atom as usize).map(String::as_str)
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the chunk has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms_are_interned_once() {
        let source = "a + a + b";
        let scanner = Scanner::new(source);
        let tokens = Scanner::new(source).tokenize().unwrap();
        let bytecode = Bytecode::from_tokens(&scanner, &tokens);

        assert_eq!(bytecode.len(), 5);
        assert_eq!(bytecode.atoms, vec!["a", "+", "b"]);
        assert_eq!(bytecode.instructions[2].atom, 0);
        assert_eq!(bytecode.text(&bytecode.instructions[4]), Some("b"));
    }
}
