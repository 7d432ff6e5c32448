//! PNG export: SVG export followed by the rasterizer fallback chain.

use super::{ExportError, Target, export_svg, rasterize::try_rasterize};
use crate::{
    config::{Config, Rasterizer},
    debug, logger,
    utils::exec::Runner,
};
use std::path::{Path, PathBuf};

/// Outcome of a PNG request.
///
/// Both variants are successes; `SvgFallback` means no rasterizer could
/// produce the PNG and the intermediate SVG is all there is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PngExport {
    Rasterized { path: PathBuf, tool: Rasterizer },
    SvgFallback { svg: PathBuf },
}

impl PngExport {
    /// The file the caller should use.
    pub fn path(&self) -> &Path {
        match self {
            Self::Rasterized { path, .. } => path,
            Self::SvgFallback { svg } => svg,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::SvgFallback { .. })
    }
}

/// Export `input` to PNG.
///
/// `output` defaults to the input with a `.png` extension. The SVG is
/// always exported first to `<input>.svg`, overwriting any existing one.
/// Rasterizers are then tried in configured order; the first that exits
/// successfully and leaves `output` on disk wins.
///
/// If none does, a warning is printed and the SVG path is returned. SVG
/// export errors propagate.
pub fn export_png(
    input: &Path,
    output: Option<&Path>,
    scale: f64,
    config: &Config,
    runner: &dyn Runner,
) -> Result<PngExport, ExportError> {
    let output = output.map_or_else(|| Target::Png.default_output(input), Path::to_path_buf);
    let svg_target = Target::Svg.default_output(input);
    let svg = export_svg(input, Some(&svg_target), &config.export, runner)?;

    for &tool in &config.png.rasterizers {
        let program = config.png.program(tool);
        if try_rasterize(tool, program, &svg, &output, scale, runner) && output.exists() {
            debug!("png"; "converted with {}", tool);
            return Ok(PngExport::Rasterized { path: output, tool });
        }
    }

    logger::warning(&format!(
        "Could not convert to PNG. SVG available at: {}",
        svg.display()
    ));
    Ok(PngExport::SvgFallback { svg })
}
