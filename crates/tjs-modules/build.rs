//! Build script embedding the runtime's built-in library
//!
//! With the `bootstrap-bytecode` feature, `lib/bundle.js` and `lib/std.js`
//! are compiled to bytecode in the target's byte order. Otherwise the
//! source text is embedded as is. `TJS_BOOTSTRAP_BUNDLE` and
//! `TJS_BOOTSTRAP_STD` name prebuilt files to embed instead.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tjs_engine::{ByteOrder, Engine};

/// (source file, registry name, output file, override variable)
const BLOBS: &[(&str, &str, &str, &str)] = &[
    ("bundle.js", "@tjs/bundle", "bundle.bin", "TJS_BOOTSTRAP_BUNDLE"),
    ("std.js", "@tjs/std", "std.bin", "TJS_BOOTSTRAP_STD"),
];

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let lib_dir = Path::new(&manifest_dir).join("lib");
    let bytecode = env::var_os("CARGO_FEATURE_BOOTSTRAP_BYTECODE").is_some();
    let target_little = env::var("CARGO_CFG_TARGET_ENDIAN").map_or(true, |e| e == "little");
    let order = ByteOrder::for_target(target_little);

    println!("cargo:rerun-if-env-changed=TJS_LIBRARY_PATH_DEFAULT");

    for (file, name, output, override_var) in BLOBS {
        println!("cargo:rerun-if-env-changed={}", override_var);
        let output_path = out_dir.join(output);

        if let Some(prebuilt) = env::var_os(override_var) {
            let prebuilt = PathBuf::from(prebuilt);
            println!("cargo:rerun-if-changed={}", prebuilt.display());
            fs::copy(&prebuilt, &output_path).unwrap_or_else(|e| {
                panic!("Failed to copy {}: {}", prebuilt.display(), e)
            });
            continue;
        }

        let source_path = lib_dir.join(file);
        println!("cargo:rerun-if-changed={}", source_path.display());
        let source = fs::read_to_string(&source_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", source_path.display(), e));

        let blob = if bytecode {
            compile_blob(&source, name, order)
                .unwrap_or_else(|e| panic!("Failed to compile {}: {}", source_path.display(), e))
        } else {
            source.into_bytes()
        };
        fs::write(&output_path, blob)
            .unwrap_or_else(|e| panic!("Failed to write {}: {}", output_path.display(), e));
    }
}

fn compile_blob(source: &str, name: &str, order: ByteOrder) -> Result<Vec<u8>, tjs_engine::Error> {
    let mut engine = Engine::new();
    let id = engine.compile_module(source, name)?;
    engine.write_module(id, order)
}
