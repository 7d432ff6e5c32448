//! Diagram export pipeline.
//!
//! Converts an `.excalidraw` file to SVG through an external exporter, and
//! optionally to PNG through the first external rasterizer that works.
//!
//! # Modules
//!
//! - [`svg`]: Run the exporter, fix up its output name
//! - [`png`]: SVG export followed by the rasterizer fallback chain
//! - [`rasterize`]: Per-tool command lines
//!
//! # Architecture
//!
//! ```text
//! diagram.excalidraw
//!         │
//!         ▼
//!    ┌──────────┐
//!    │   svg    │ ──► npx excalidraw_export (60s timeout) + rename
//!    └────┬─────┘
//!         │ (PNG requested)
//!         ▼
//!    ┌──────────┐
//!    │   png    │ ──► rsvg-convert → convert → inkscape, first success wins
//!    └────┬─────┘
//!         │ (all failed)
//!         ▼
//!    diagram.svg + warning
//! ```

mod png;
mod rasterize;
mod svg;

pub use png::{PngExport, export_png};
pub use svg::export_svg;

use crate::utils::exec::ExecError;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failures that abort an export.
///
/// Rasterizer failures never appear here: they are skipped, and a PNG
/// request that no rasterizer could satisfy still succeeds with the SVG.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("`{program}` not found. Install Node.js to use export feature.")]
    MissingRuntime { program: String },

    #[error("Export timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The exporter finished but the output file is absent. Carries the
    /// exporter's stderr.
    #[error("Export failed: {0}")]
    Failed(String),

    #[error("failed to move `{}` to `{}`", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Exec(ExecError),
}

// ============================================================================
// Target
// ============================================================================

/// Output format, chosen from the requested output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Svg,
    Png,
}

impl Target {
    /// `.png` (any case) selects PNG; anything else, or no output, SVG.
    pub fn from_output(output: Option<&Path>) -> Self {
        match output.and_then(Path::extension) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Svg,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// Input path with its extension swapped for this format's.
    pub fn default_output(self, input: &Path) -> PathBuf {
        input.with_extension(self.extension())
    }
}

// ============================================================================
// Test support
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_output() {
        assert_eq!(Target::from_output(None), Target::Svg);
        assert_eq!(Target::from_output(Some(Path::new("out.svg"))), Target::Svg);
        assert_eq!(Target::from_output(Some(Path::new("out.png"))), Target::Png);
        assert_eq!(Target::from_output(Some(Path::new("OUT.PNG"))), Target::Png);
        assert_eq!(Target::from_output(Some(Path::new("out"))), Target::Svg);
        assert_eq!(Target::from_output(Some(Path::new("png"))), Target::Svg);
    }

    #[test]
    fn test_default_output_swaps_extension() {
        let input = Path::new("docs/diagram.excalidraw");
        assert_eq!(
            Target::Svg.default_output(input),
            PathBuf::from("docs/diagram.svg")
        );
        assert_eq!(
            Target::Png.default_output(input),
            PathBuf::from("docs/diagram.png")
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ExportError::InputNotFound(PathBuf::from("missing.excalidraw"));
        assert_eq!(err.to_string(), "Input file not found: missing.excalidraw");

        let err = ExportError::MissingRuntime {
            program: "npx".into(),
        };
        assert!(err.to_string().starts_with("`npx` not found"));

        let err = ExportError::Timeout { secs: 60 };
        assert_eq!(err.to_string(), "Export timed out after 60s");
    }
}
