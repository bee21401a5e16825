// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Linking modules read back from bytecode

use std::collections::HashMap;

use tjs_engine::{ByteOrder, Engine, Error, ModuleHost, ModuleId, ModuleStatus, Result};

/// Host that only serves precompiled modules
struct BytecodeHost {
    blobs: HashMap<String, Vec<u8>>,
}

impl ModuleHost for BytecodeHost {
    fn normalize(&mut self, _base: &str, specifier: &str) -> String {
        specifier.to_string()
    }

    fn load(&mut self, engine: &mut Engine, name: &str) -> Result<ModuleId> {
        let blob = self
            .blobs
            .get(name)
            .ok_or_else(|| Error::ReferenceError(format!("could not load '{}'", name)))?;
        engine.read_module(blob, ByteOrder::Native)
    }
}

fn blob(source: &str, name: &str) -> Vec<u8> {
    let mut engine = Engine::new();
    let id = engine.compile_module(source, name).unwrap();
    engine.write_module(id, ByteOrder::Native).unwrap()
}

#[test]
fn bytecode_modules_link_like_source_modules() {
    let mut host = BytecodeHost {
        blobs: HashMap::from([
            ("math".to_string(), blob("export const pi = 3.14;", "math")),
            (
                "geometry".to_string(),
                blob(
                    "import { pi } from 'math';\nexport const area = (r) => pi * r * r;",
                    "geometry",
                ),
            ),
        ]),
    };

    let mut engine = Engine::new();
    let main = engine
        .compile_module("import { area } from 'geometry';\nexport default area(2);", "main")
        .unwrap();
    engine.evaluate(main, &mut host).unwrap();

    let geometry = engine.find_module("geometry").unwrap();
    let math = engine.find_module("math").unwrap();
    assert_eq!(engine.module(geometry).unwrap().dependencies, vec![math]);
    for id in [main, geometry, math] {
        assert_eq!(engine.module(id).unwrap().status, ModuleStatus::Evaluated);
    }
}

#[test]
fn swapped_bytecode_is_rejected_natively() {
    let mut engine = Engine::new();
    let id = engine
        .compile_module("export const answer = 42;", "answer")
        .unwrap();
    let swapped = engine.write_module(id, ByteOrder::Swapped).unwrap();

    let mut reader = Engine::new();
    assert!(reader.read_module(&swapped, ByteOrder::Native).is_err());
    let copy = reader.read_module(&swapped, ByteOrder::Swapped).unwrap();
    assert!(reader.module(copy).unwrap().has_export("answer"));
}
