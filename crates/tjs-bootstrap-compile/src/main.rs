// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! tjs-bootstrap-compile - offline bytecode compiler
//!
//! Compiles a module without running it and writes the serialized module
//! in this machine's byte order, plus optionally the byte-swapped layout
//! for targets of the other endianness.

mod mapped;

use clap::Parser;
use clap::error::ErrorKind;
use mapped::{MapError, MappedFile};
use owo_colors::OwoColorize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tjs_engine::{ByteOrder, Engine, ModuleId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: tjs-bootstrap-compile INPUT OUTPUT [OUTPUT_SWAPPED] [MODULE_NAME]";

#[derive(Parser)]
#[command(
    name = "tjs-bootstrap-compile",
    about = "Compile a module to tjs bytecode",
    version
)]
struct Cli {
    /// Module source to compile
    input: PathBuf,

    /// Bytecode output in this machine's byte order
    output: PathBuf,

    /// Optional bytecode output in the opposite byte order
    output_swapped: Option<PathBuf>,

    /// Module name stored in the bytecode (defaults to INPUT)
    module_name: Option<String>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

/// Every way a compilation can fail, each with its own message
#[derive(Debug, Error)]
enum CompileFailure {
    #[error("Failed to open input file: {path}\n  {source}")]
    Input { path: String, source: MapError },

    #[error("Exception occurred parsing script.\n  {0}")]
    Parse(String),

    #[error("Failed to build bytecode.\n  {0}")]
    Build(tjs_engine::Error),

    #[error("Failed to build bswap bytecode.\n  {0}")]
    BuildSwapped(tjs_engine::Error),

    #[error("Failed to open output file: {0}")]
    OpenOutput(io::Error),

    #[error("Failed to write bytecode to file: {0}")]
    WriteOutput(io::Error),

    #[error("Failed to open bswap output file: {0}")]
    OpenSwappedOutput(io::Error),

    #[error("Failed to write bswap bytecode to file: {0}")]
    WriteSwappedOutput(io::Error),
}

/// Exit status for any failure after argument parsing
const FAILURE: u8 = 255;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("{}", USAGE);
            eprintln!("{}", err);
            return ExitCode::from(1);
        }
    };

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::from(FAILURE)
        }
    }
}

fn run(cli: &Cli) -> Result<(), CompileFailure> {
    let module_name = cli
        .module_name
        .clone()
        .unwrap_or_else(|| cli.input.to_string_lossy().into_owned());

    let input = MappedFile::open(&cli.input).map_err(|source| CompileFailure::Input {
        path: cli.input.display().to_string(),
        source,
    })?;
    let source = std::str::from_utf8(input.as_bytes())
        .map_err(|e| CompileFailure::Parse(format!("input is not valid UTF-8: {}", e)))?;

    let mut engine = Engine::new();
    let id = engine
        .compile_module(source, &module_name)
        .map_err(|e| CompileFailure::Parse(e.to_string()))?;
    debug!(module = %module_name, "compiled module");

    let native = engine
        .write_module(id, ByteOrder::Native)
        .map_err(CompileFailure::Build)?;
    write_output(&cli.output, &native)
        .map_err(|e| e.into_failure(CompileFailure::OpenOutput, CompileFailure::WriteOutput))?;
    debug!(output = %cli.output.display(), bytes = native.len(), "wrote bytecode");

    if let Some(path) = &cli.output_swapped {
        write_swapped(&engine, id, path)?;
    }
    Ok(())
}

fn write_swapped(engine: &Engine, id: ModuleId, path: &Path) -> Result<(), CompileFailure> {
    let swapped = engine
        .write_module(id, ByteOrder::Swapped)
        .map_err(CompileFailure::BuildSwapped)?;
    write_output(path, &swapped).map_err(|e| {
        e.into_failure(
            CompileFailure::OpenSwappedOutput,
            CompileFailure::WriteSwappedOutput,
        )
    })?;
    debug!(output = %path.display(), bytes = swapped.len(), "wrote swapped bytecode");
    Ok(())
}

/// Which step of writing an output file failed
enum OutputError {
    Open(io::Error),
    Write(io::Error),
}

impl OutputError {
    fn into_failure(
        self,
        open: fn(io::Error) -> CompileFailure,
        write: fn(io::Error) -> CompileFailure,
    ) -> CompileFailure {
        match self {
            OutputError::Open(e) => open(e),
            OutputError::Write(e) => write(e),
        }
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let mut file = File::create(path).map_err(OutputError::Open)?;
    file.write_all(bytes).map_err(OutputError::Write)?;
    file.flush().map_err(OutputError::Write)
}
