//! Export command: availability gate and dispatch by target format.

use crate::{
    config::Config,
    export::{ExportError, PngExport, Target, export_png, export_svg},
    utils::exec::Runner,
};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// What the CLI reports after a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub path: PathBuf,
    /// A PNG was requested but only the SVG could be produced.
    pub fallback: bool,
}

impl From<PngExport> for Exported {
    fn from(png: PngExport) -> Self {
        Self {
            fallback: png.is_fallback(),
            path: png.path().to_path_buf(),
        }
    }
}

/// Check that the exporter's runtime launcher is on `PATH`.
pub fn runtime_available(config: &Config, runner: &dyn Runner) -> bool {
    runner.is_available(OsStr::new(config.export.launcher()))
}

/// Export `input`, choosing SVG or PNG from the extension of `output`.
///
/// An empty `output` counts as omitted. Nothing is launched if the runtime
/// launcher is missing.
pub fn run_export(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
    runner: &dyn Runner,
) -> Result<Exported, ExportError> {
    if !runtime_available(config, runner) {
        return Err(ExportError::MissingRuntime {
            program: config.export.launcher().to_string(),
        });
    }

    let output = output.filter(|path| !path.as_os_str().is_empty());
    match Target::from_output(output) {
        Target::Svg => export_svg(input, output, &config.export, runner).map(|path| Exported {
            path,
            fallback: false,
        }),
        Target::Png => export_png(input, output, config.png.scale, config, runner).map(Into::into),
    }
}
