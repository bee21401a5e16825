// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bytecode serialization.
//!
//! Layout (all integers `u32` in the selected byte order):
//!
//! ```text
//! magic "tjsc" | version u8 | name | requests | exports | star_exports
//!             | atoms | instruction count | (kind u8, atom u32)*
//! ```
//!
//! Strings are a length followed by UTF-8 bytes; lists are a count followed
//! by their elements. The stream carries no endianness marker: a reader
//! must be told which order the writer used.

use crate::compiler::{Bytecode, Instruction};
use crate::lexer::TokenKind;
use crate::module::{ImportMeta, ModuleRecord, ModuleStatus};
use crate::{Error, Result};

/// Magic bytes at the start of every serialized module.
pub const BYTECODE_MAGIC: [u8; 4] = *b"tjsc";

/// Current bytecode format version.
pub const BYTECODE_VERSION: u8 = 1;

/// Byte order of multi-byte integers in a serialized module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// The byte order of the machine doing the (de)serialization
    Native,
    /// The opposite of the native byte order
    Swapped,
}

impl ByteOrder {
    /// Byte order to use when producing bytecode for a target of the given
    /// endianness on this machine.
    pub fn for_target(target_little_endian: bool) -> Self {
        if target_little_endian == cfg!(target_endian = "little") {
            ByteOrder::Native
        } else {
            ByteOrder::Swapped
        }
    }

    fn swaps(self) -> bool {
        self == ByteOrder::Swapped
    }
}

/// Serializes a module record.
pub fn write_module(record: &ModuleRecord, order: ByteOrder) -> Vec<u8> {
    let mut writer = Writer {
        buf: Vec::with_capacity(64 + record.bytecode.len() * 5),
        swap: order.swaps(),
    };

    writer.buf.extend_from_slice(&BYTECODE_MAGIC);
    writer.buf.push(BYTECODE_VERSION);
    writer.put_str(&record.name);
    writer.put_strs(&record.requests);
    writer.put_strs(&record.exports);
    writer.put_strs(&record.star_exports);
    writer.put_strs(&record.bytecode.atoms);
    writer.put_u32(record.bytecode.instructions.len() as u32);
    for instruction in &record.bytecode.instructions {
        writer.buf.push(instruction.kind as u8);
        writer.put_u32(instruction.atom);
    }
    writer.buf
}

/// Deserializes a module record written with the given byte order.
pub fn read_module(bytes: &[u8], order: ByteOrder) -> Result<ModuleRecord> {
    let mut reader = Reader {
        bytes,
        pos: 0,
        swap: order.swaps(),
    };

    if reader.take(BYTECODE_MAGIC.len())? != BYTECODE_MAGIC {
        return Err(Error::Bytecode("bad magic".to_string()));
    }
    let version = reader.u8()?;
    if version != BYTECODE_VERSION {
        return Err(Error::Bytecode(format!(
            "version mismatch: expected {}, found {}",
            BYTECODE_VERSION, version
        )));
    }

    let name = reader.str()?;
    let requests = reader.strs()?;
    let exports = reader.strs()?;
    let star_exports = reader.strs()?;
    let atoms = reader.strs()?;

    let count = reader.count(5)?;
    let mut instructions = Vec::with_capacity(count);
    for _ in 0..count {
        let tag = reader.u8()?;
        let kind = TokenKind::from_tag(tag)
            .ok_or_else(|| Error::Bytecode(format!("invalid instruction kind {}", tag)))?;
        let atom = reader.u32()?;
        if atom as usize >= atoms.len() {
            return Err(Error::Bytecode(format!("atom index {} out of range", atom)));
        }
        instructions.push(Instruction { kind, atom });
    }

    if reader.pos != bytes.len() {
        return Err(Error::Bytecode(format!(
            "{} trailing bytes",
            bytes.len() - reader.pos
        )));
    }

    Ok(ModuleRecord {
        name,
        requests,
        exports,
        star_exports,
        bytecode: Bytecode {
            atoms,
            instructions,
        },
        status: ModuleStatus::Compiled,
        dependencies: Vec::new(),
        meta: ImportMeta::new(),
    })
}

struct Writer {
    buf: Vec<u8>,
    swap: bool,
}

impl Writer {
    fn put_u32(&mut self, value: u32) {
        let value = if self.swap { value.swap_bytes() } else { value };
        self.buf.extend_from_slice(&value.to_ne_bytes());
    }

    fn put_str(&mut self, value: &str) {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    fn put_strs(&mut self, values: &[String]) {
        self.put_u32(values.len() as u32);
        for value in values {
            self.put_str(value);
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    swap: bool,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| Error::Bytecode(format!("truncated at offset {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        let value = u32::from_ne_bytes(raw);
        Ok(if self.swap { value.swap_bytes() } else { value })
    }

    /// Reads an element count, rejecting counts the remaining input cannot hold.
    fn count(&mut self, min_element_size: usize) -> Result<usize> {
        let count = self.u32()? as usize;
        let remaining = self.bytes.len() - self.pos;
        if count.saturating_mul(min_element_size) > remaining {
            return Err(Error::Bytecode(format!("truncated at offset {}", self.pos)));
        }
        Ok(count)
    }

    fn str(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| Error::Bytecode(format!("invalid UTF-8 before offset {}", self.pos)))
    }

    fn strs(&mut self) -> Result<Vec<String>> {
        let count = self.count(4)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.str()?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_module;

    const SOURCE: &str = "import { a } from './a.js';\nexport const b = a + 1;\nexport * from './c.js';";

    #[test]
    fn test_native_round_trip() {
        let record = compile_module(SOURCE, "m.js").unwrap();
        let bytes = write_module(&record, ByteOrder::Native);
        assert_eq!(&bytes[..4], b"tjsc");
        assert_eq!(read_module(&bytes, ByteOrder::Native).unwrap(), record);
    }

    #[test]
    fn test_swapped_round_trip() {
        let record = compile_module(SOURCE, "m.js").unwrap();
        let native = write_module(&record, ByteOrder::Native);
        let swapped = write_module(&record, ByteOrder::Swapped);
        assert_ne!(native, swapped);
        assert_eq!(native.len(), swapped.len());
        assert_eq!(read_module(&swapped, ByteOrder::Swapped).unwrap(), record);
    }

    #[test]
    fn test_wrong_byte_order_is_rejected() {
        let record = compile_module(SOURCE, "m.js").unwrap();
        let swapped = write_module(&record, ByteOrder::Swapped);
        let err = read_module(&swapped, ByteOrder::Native).unwrap_err();
        assert!(matches!(err, Error::Bytecode(_)));
    }

    #[test]
    fn test_version_mismatch() {
        let record = compile_module("export default 1;", "v.js").unwrap();
        let mut bytes = write_module(&record, ByteOrder::Native);
        bytes[4] = BYTECODE_VERSION + 1;
        let err = read_module(&bytes, ByteOrder::Native).unwrap_err();
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_truncated_and_garbage_input() {
        let record = compile_module("export default 1;", "v.js").unwrap();
        let bytes = write_module(&record, ByteOrder::Native);
        assert!(read_module(&bytes[..bytes.len() - 1], ByteOrder::Native).is_err());
        assert!(read_module(b"not bytecode", ByteOrder::Native).is_err());
        assert!(read_module(&[], ByteOrder::Native).is_err());
    }

    #[test]
    fn test_for_target() {
        assert_eq!(
            ByteOrder::for_target(cfg!(target_endian = "little")),
            ByteOrder::Native
        );
        assert_eq!(
            ByteOrder::for_target(!cfg!(target_endian = "little")),
            ByteOrder::Swapped
        );
    }
}
