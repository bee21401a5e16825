// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! tjs - run JavaScript modules
//!
//! Bootstraps the built-in library, then loads the entry module as
//! `import.meta.main` and links and evaluates its import graph.

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tjs_modules::{
    BOOTSTRAP_MODE, LIBRARY_PATH_ENV, ModuleConfig, ModuleResolver, Resolution, RuntimeEnv,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tjs",
    about = "Run JavaScript modules with the tjs runtime",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Library search path, overriding TJS_LIBRARY_PATH
    #[arg(long = "library-path", global = true, value_name = "PATHS")]
    library_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load, link and evaluate a module
    Run {
        /// Entry module
        script: String,
    },
    /// Print where a specifier resolves to
    Resolve {
        /// Import specifier
        specifier: String,

        /// Importing module
        #[arg(long, default_value = "./main.js")]
        from: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.library_path {
        Some(paths) => ModuleConfig::with_search_path(paths),
        None => ModuleConfig::from_env(),
    };

    let result = match &cli.command {
        Command::Run { script } => run(config, script),
        Command::Resolve { specifier, from } => {
            resolve(config, specifier, from);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: ModuleConfig, script: &str) -> anyhow::Result<()> {
    let mut env = RuntimeEnv::init(config)
        .with_context(|| format!("failed to bootstrap runtime ({:?} mode)", BOOTSTRAP_MODE))?;
    env.run_main(script)
        .with_context(|| format!("failed to run '{}'", script))?;
    Ok(())
}

fn resolve(config: ModuleConfig, specifier: &str, from: &str) {
    tracing::debug!(paths = ?config.library_paths, env = LIBRARY_PATH_ENV, "library search path");

    let resolver = ModuleResolver::new(config);
    match resolver.resolve(specifier, from) {
        Resolution::Resolved(path) => println!("{}", path.display()),
        Resolution::Unchanged(name) => {
            println!("{} {}", name, "(unresolved)".dimmed())
        }
    }
}
