// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! End-to-end loading through a bootstrapped runtime

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tjs_engine::ModuleStatus;
use tjs_modules::{
    Bootstrap, BootstrapMode, FetchFailure, Fetcher, ModuleConfig, ModuleError, ModuleLoader,
    Resolution, RuntimeEnv, STD_MODULE_NAME,
};

const BUNDLE: &str = "globalThis.ready = true;";
const STD: &str = "export function getenv(name) { return undefined; }";

/// Serves fixed responses and records every request
#[derive(Clone, Default)]
struct RecordingFetcher {
    responses: Vec<(&'static str, u16, &'static str)>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl Fetcher for RecordingFetcher {
    fn fetch(&self, url: &str) -> Result<(u16, Vec<u8>), FetchFailure> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .iter()
            .find(|(candidate, _, _)| *candidate == url)
            .map(|(_, status, body)| (*status, body.as_bytes().to_vec()))
            .ok_or_else(|| FetchFailure::Transport("connection refused".to_string()))
    }
}

fn runtime(library: &Path, fetcher: RecordingFetcher) -> RuntimeEnv {
    let config = ModuleConfig::with_search_path(&library.to_string_lossy());
    let loader = ModuleLoader::new(config, Box::new(fetcher));
    let bootstrap = Bootstrap {
        mode: BootstrapMode::Source,
        bundle: BUNDLE.as_bytes(),
        std: STD.as_bytes(),
    };
    RuntimeEnv::with_bootstrap(loader, bootstrap).unwrap()
}

#[test]
fn runs_entry_module_with_all_source_kinds() {
    let app = tempfile::tempdir().unwrap();
    let library = tempfile::tempdir().unwrap();

    fs::create_dir(library.path().join("colors")).unwrap();
    fs::write(
        library.path().join("colors").join("index.js"),
        "export const red = '#f00';",
    )
    .unwrap();
    fs::write(app.path().join("config.json"), r#"{"name": "demo", "tags": ["a", "`b`"]}"#).unwrap();
    fs::write(
        app.path().join("main.js"),
        "import { red } from 'colors';\n\
         import config from './config.json';\n\
         import { getenv } from '@tjs/std';\n\
         import { greet } from 'https://example.test/greet.js';\n\
         export default [red, config, getenv, greet];\n",
    )
    .unwrap();

    let fetcher = RecordingFetcher {
        responses: vec![(
            "https://example.test/greet.js",
            200,
            "export function greet() { return 'hi'; }",
        )],
        ..Default::default()
    };
    let requests = Rc::clone(&fetcher.requests);
    let mut env = runtime(library.path(), fetcher);

    let main = app.path().join("main.js");
    let id = env.run_main(&main.to_string_lossy()).unwrap();
    let engine = env.engine();

    assert_eq!(engine.module(id).unwrap().status, ModuleStatus::Evaluated);
    assert_eq!(engine.import_meta(id).unwrap().get_bool("main"), Some(true));

    let colors = library.path().join("colors").join("index.js");
    let colors = engine.find_module(&colors.to_string_lossy()).unwrap();
    assert!(engine.module(colors).unwrap().has_export("red"));
    assert_eq!(
        engine.import_meta(colors).unwrap().get_str("basename"),
        Some("index.js")
    );

    let remote = engine.find_module("https://example.test/greet.js").unwrap();
    let meta = engine.import_meta(remote).unwrap();
    assert_eq!(meta.get_str("url"), Some("https://example.test/greet.js"));
    assert!(!meta.contains("dirname"));
    assert_eq!(*requests.borrow(), vec!["https://example.test/greet.js"]);

    let std = engine.find_module(STD_MODULE_NAME).unwrap();
    assert_eq!(engine.module(id).unwrap().dependencies[2], std);
}

#[test]
fn entry_path_is_probed() {
    let app = tempfile::tempdir().unwrap();
    fs::create_dir(app.path().join("tool")).unwrap();
    fs::write(app.path().join("tool").join("index.js"), "export default 1;").unwrap();

    let mut env = runtime(app.path(), RecordingFetcher::default());
    let id = env
        .run_main(&app.path().join("tool").to_string_lossy())
        .unwrap();
    assert_eq!(
        env.engine().import_meta(id).unwrap().get_str("basename"),
        Some("index.js")
    );
}

#[test]
fn remote_modules_import_relative_to_their_url() {
    let app = tempfile::tempdir().unwrap();
    let main = app.path().join("main.js");
    fs::write(&main, "import { a } from 'https://example.test/dir/a.js';").unwrap();

    let fetcher = RecordingFetcher {
        responses: vec![
            (
                "https://example.test/dir/a.js",
                200,
                "import { b } from './b.js';\nexport const a = b;",
            ),
            ("https://example.test/dir/b.js", 200, "export const b = 1;"),
        ],
        ..Default::default()
    };
    let requests = Rc::clone(&fetcher.requests);
    let mut env = runtime(app.path(), fetcher);
    env.run_main(&main.to_string_lossy()).unwrap();

    assert_eq!(
        *requests.borrow(),
        vec!["https://example.test/dir/a.js", "https://example.test/dir/b.js"]
    );
    let b = env.engine().find_module("https://example.test/dir/b.js").unwrap();
    assert_eq!(env.engine().module(b).unwrap().status, ModuleStatus::Evaluated);
}

#[test]
fn remote_404_fails_the_import() {
    let app = tempfile::tempdir().unwrap();
    let main = app.path().join("main.js");
    fs::write(&main, "import 'http://example.test/x.js';").unwrap();

    let fetcher = RecordingFetcher {
        responses: vec![("http://example.test/x.js", 404, "not found")],
        ..Default::default()
    };
    let mut env = runtime(app.path(), fetcher);
    let err = env.run_main(&main.to_string_lossy()).unwrap_err();

    assert_eq!(
        err.to_string(),
        "could not load 'http://example.test/x.js' code: 404"
    );
    assert!(env.engine().find_module("http://example.test/x.js").is_none());
}

#[test]
fn compile_errors_propagate() {
    let app = tempfile::tempdir().unwrap();
    fs::write(app.path().join("broken.js"), "export { broken").unwrap();
    let main = app.path().join("main.js");
    fs::write(&main, "import './broken.js';").unwrap();

    let mut env = runtime(app.path(), RecordingFetcher::default());
    let err = env.run_main(&main.to_string_lossy()).unwrap_err();
    assert!(matches!(err, ModuleError::Compile { ref module, .. } if module.ends_with("broken.js")));
}

#[test]
fn earlier_library_roots_win() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(first.path().join("dup.js"), "").unwrap();
    fs::write(second.path().join("dup.js"), "").unwrap();
    fs::write(second.path().join("only.js"), "").unwrap();

    let search = format!(
        "{}:{}",
        first.path().display(),
        second.path().display()
    );
    let loader = ModuleLoader::new(
        ModuleConfig::with_search_path(&search),
        Box::new(RecordingFetcher::default()),
    );

    assert_eq!(
        loader.resolve("dup", "/anywhere/main.js"),
        Resolution::Resolved(first.path().join("dup.js"))
    );
    assert_eq!(
        loader.resolve("only", "/anywhere/main.js"),
        Resolution::Resolved(second.path().join("only.js"))
    );
}
