//! Command-line interface definitions.

use crate::config::DEFAULT_CONFIG;
use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Export Excalidraw diagrams to SVG or PNG.
///
/// Requires npm (uses `npx excalidraw_export`). PNG output additionally
/// needs one of rsvg-convert, ImageMagick or Inkscape; without them the
/// SVG is kept instead.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about)]
pub struct Cli {
    /// Excalidraw file to export
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Output file. A `.png` extension selects PNG export, anything else
    /// SVG (default: input with `.svg`)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// PNG scale factor (default: 2.0)
    #[arg(short, long)]
    pub scale: Option<f64>,

    /// Seconds the SVG exporter may run (default: 60)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Fail when a PNG was requested but only the SVG could be produced
    #[arg(long)]
    pub strict: bool,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = DEFAULT_CONFIG, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
