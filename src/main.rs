//! diagram-export - Export Excalidraw diagrams to SVG or PNG.

mod cli;
mod config;
mod export;
mod logger;
mod utils;

use anyhow::{Result, bail};
use clap::{ColorChoice, CommandFactory, Parser};
use cli::{
    Cli,
    export::{Exported, run_export},
};
use config::Config;
use std::{path::Path, process::ExitCode};
use utils::exec::{Runner, System};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let Some(input) = cli.input.as_deref() else {
        Cli::command().print_help().ok();
        return ExitCode::FAILURE;
    };

    match run(&cli, input, &System) {
        Ok(exported) => {
            println!("Exported: {}", exported.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            logger::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Load config and export `input`. Errors map to exit status 1.
fn run(cli: &Cli, input: &Path, runner: &dyn Runner) -> Result<Exported> {
    let config = Config::load(cli)?;
    let exported = run_export(input, cli.output.as_deref(), &config, runner)?;

    if cli.strict && exported.fallback {
        bail!(
            "Could not convert to PNG. SVG available at: {}",
            exported.path.display()
        );
    }
    Ok(exported)
}
