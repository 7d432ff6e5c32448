//! Rasterizer command lines.
//!
//! Each tool takes the scale factor in its own unit:
//!
//! | Rasterizer    | Argument                            |
//! |---------------|-------------------------------------|
//! | `rsvg`        | `-z <scale>` (zoom, e.g. `2.0`)     |
//! | `imagemagick` | `-density <72 * scale>` (DPI)       |
//! | `inkscape`    | `--export-dpi=<96 * scale>` (DPI)   |

use crate::{
    config::Rasterizer,
    debug,
    utils::exec::{Cmd, Runner, check_status},
};
use std::path::Path;

/// Base resolution ImageMagick assumes for SVG input.
const IMAGEMAGICK_BASE_DPI: f64 = 72.0;

/// Base resolution Inkscape assumes for SVG input.
const INKSCAPE_BASE_DPI: f64 = 96.0;

/// DPI for `scale` from a tool's base resolution, truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dpi(base: f64, scale: f64) -> u32 {
    (base * scale) as u32
}

/// Build the command converting `svg` to `png` with `rasterizer`.
pub fn command(rasterizer: Rasterizer, program: &str, svg: &Path, png: &Path, scale: f64) -> Cmd {
    match rasterizer {
        Rasterizer::Rsvg => Cmd::new(program)
            .arg("-z")
            .arg(format!("{scale:?}"))
            .arg("-o")
            .arg(png)
            .arg(svg),
        Rasterizer::ImageMagick => Cmd::new(program)
            .arg("-density")
            .arg(dpi(IMAGEMAGICK_BASE_DPI, scale).to_string())
            .arg(svg)
            .arg(png),
        Rasterizer::Inkscape => Cmd::new(program)
            .arg(svg)
            .arg(format!("--export-filename={}", png.display()))
            .arg(format!("--export-dpi={}", dpi(INKSCAPE_BASE_DPI, scale))),
    }
}

/// Run one rasterizer. Returns `false` if it could not be run or failed.
///
/// Failures are only visible with `--verbose`; the caller moves on to the
/// next tool either way.
pub fn try_rasterize(
    rasterizer: Rasterizer,
    program: &str,
    svg: &Path,
    png: &Path,
    scale: f64,
    runner: &dyn Runner,
) -> bool {
    let cmd = command(rasterizer, program, svg, png, scale);
    match runner.run(&cmd).and_then(|output| check_status(&cmd, output)) {
        Ok(_) => true,
        Err(err) => {
            debug!("png"; "{} skipped: {}", rasterizer, err);
            false
        }
    }
}
