// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Command-line contract of the offline compiler

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tjs_engine::{ByteOrder, Engine};

fn compile(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tjs-bootstrap-compile"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn compiler")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn too_few_arguments_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.js");

    for args in [vec![], vec![input.as_path()]] {
        let output = compile(&args);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("usage: tjs-bootstrap-compile INPUT OUTPUT"));
    }
}

#[test]
fn missing_input_creates_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.js");
    let out = dir.path().join("out.bin");

    let output = compile(&[&input, &out]);
    assert_eq!(output.status.code(), Some(255));
    assert!(stderr(&output).contains("Failed to open input file"));
    assert!(!out.exists());
}

#[test]
fn empty_input_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.js");
    let out = dir.path().join("out.bin");
    fs::write(&input, "").unwrap();

    let output = compile(&[&input, &out]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Cannot map empty file"));
    assert!(!out.exists());
}

#[test]
fn parse_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.js");
    let out = dir.path().join("out.bin");
    fs::write(&input, "export function (").unwrap();

    let output = compile(&[&input, &out]);
    assert_eq!(output.status.code(), Some(255));
    assert!(stderr(&output).contains("Exception occurred parsing script."));
    assert!(!out.exists());
}

#[test]
fn unwritable_output_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.js");
    fs::write(&input, "export default 1;").unwrap();
    let out = dir.path().join("no-such-dir").join("out.bin");

    let output = compile(&[&input, &out]);
    assert_eq!(output.status.code(), Some(255));
    assert!(stderr(&output).contains("Failed to open output file"));
}

#[test]
fn native_and_swapped_outputs_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("std.js");
    let native = dir.path().join("std.bin");
    let swapped = dir.path().join("std.swapped.bin");
    fs::write(
        &input,
        "export const sep = '/';\nexport function join(a, b) { return a + sep + b; }\nexport default join;\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tjs-bootstrap-compile"))
        .arg(&input)
        .arg(&native)
        .arg(&swapped)
        .arg("@tjs/std")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let native = fs::read(&native).unwrap();
    let swapped = fs::read(&swapped).unwrap();
    assert_ne!(native, swapped);

    let mut engine = Engine::new();
    let a = engine.read_module(&native, ByteOrder::Native).unwrap();
    let mut other = Engine::new();
    let b = other.read_module(&swapped, ByteOrder::Swapped).unwrap();

    let (a, b) = (engine.module(a).unwrap(), other.module(b).unwrap());
    assert_eq!(a.name, "@tjs/std");
    assert_eq!(a.name, b.name);
    assert_eq!(a.exports, b.exports);
    for name in ["sep", "join", "default"] {
        assert!(a.has_export(name));
    }
}

#[test]
fn module_name_defaults_to_input_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bundle.js");
    let out = dir.path().join("bundle.bin");
    fs::write(&input, "globalThis.x = 1;").unwrap();

    let output = compile(&[&input, &out]);
    assert!(output.status.success(), "{}", stderr(&output));

    let mut engine = Engine::new();
    let id = engine
        .read_module(&fs::read(&out).unwrap(), ByteOrder::Native)
        .unwrap();
    assert_eq!(engine.module_name(id).unwrap(), input.to_string_lossy());
}
