//! `[png]` section configuration.
//!
//! Rasterization settings for PNG requests.
//!
//! # Example
//!
//! ```toml
//! [png]
//! scale = 2.0                                      # 2x for high-density displays
//! rasterizers = ["rsvg", "imagemagick", "inkscape"] # tried in order
//!
//! [png.programs]
//! imagemagick = "magick"                           # ImageMagick 7
//! ```
//!
//! # Behavior
//!
//! - Rasterizers are tried in list order; the first that produces the PNG wins
//! - A missing or failing rasterizer is skipped
//! - If none succeed, the intermediate SVG is the result

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::Deserialize;
use std::fmt;

/// External SVG-to-PNG converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rasterizer {
    /// librsvg's `rsvg-convert`, scale passed as a zoom factor.
    Rsvg,
    /// ImageMagick `convert`, scale passed as a density from 72 DPI.
    ImageMagick,
    /// Inkscape, scale passed as a DPI from 96.
    Inkscape,
}

impl Rasterizer {
    /// Default program name for this rasterizer.
    pub fn default_program(self) -> &'static str {
        match self {
            Self::Rsvg => "rsvg-convert",
            Self::ImageMagick => "convert",
            Self::Inkscape => "inkscape",
        }
    }
}

impl fmt::Display for Rasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rsvg => "rsvg",
            Self::ImageMagick => "imagemagick",
            Self::Inkscape => "inkscape",
        };
        f.write_str(name)
    }
}

/// Program names, overridable per rasterizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProgramsConfig {
    pub rsvg: String,
    pub imagemagick: String,
    pub inkscape: String,
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            rsvg: Rasterizer::Rsvg.default_program().into(),
            imagemagick: Rasterizer::ImageMagick.default_program().into(),
            inkscape: Rasterizer::Inkscape.default_program().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PngConfig {
    /// Resolution multiplier relative to the SVG's natural size.
    pub scale: f64,

    /// Rasterizers to try, in order.
    pub rasterizers: Vec<Rasterizer>,

    /// Program name for each rasterizer.
    pub programs: ProgramsConfig,
}

pub struct PngConfigFields {
    pub scale: FieldPath,
    pub rasterizers: FieldPath,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            rasterizers: vec![
                Rasterizer::Rsvg,
                Rasterizer::ImageMagick,
                Rasterizer::Inkscape,
            ],
            programs: ProgramsConfig::default(),
        }
    }
}

impl PngConfig {
    pub const FIELDS: PngConfigFields = PngConfigFields {
        scale: FieldPath::new("png.scale"),
        rasterizers: FieldPath::new("png.rasterizers"),
    };

    /// Program to run for `rasterizer`.
    pub fn program(&self, rasterizer: Rasterizer) -> &str {
        match rasterizer {
            Rasterizer::Rsvg => &self.programs.rsvg,
            Rasterizer::ImageMagick => &self.programs.imagemagick,
            Rasterizer::Inkscape => &self.programs.inkscape,
        }
    }

    /// Expand `~` in program paths.
    pub fn expand_tilde(&mut self) {
        for program in [
            &mut self.programs.rsvg,
            &mut self.programs.imagemagick,
            &mut self.programs.inkscape,
        ] {
            *program = shellexpand::tilde(program.as_str()).into_owned();
        }
    }

    /// Validate PNG configuration.
    ///
    /// # Checks
    /// - `scale` must be a finite number greater than 0
    /// - an empty or repeating rasterizer list is allowed but warned about
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            diag.error_with_hint(
                Self::FIELDS.scale,
                format!("must be greater than 0, got {}", self.scale),
                format!("set {} = 2.0", Self::FIELDS.scale),
            );
        }

        if self.rasterizers.is_empty() {
            diag.warn(
                Self::FIELDS.rasterizers,
                "no rasterizers configured, PNG requests will produce SVG only",
            );
        }

        for (i, rasterizer) in self.rasterizers.iter().enumerate() {
            if self.rasterizers[..i].contains(rasterizer) {
                diag.warn(
                    Self::FIELDS.rasterizers,
                    format!("`{rasterizer}` is listed more than once"),
                );
            }
        }
    }
}
