//! Configuration management for `diagram-export.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── export     # [export]
//! │   └── png        # [png]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The config file is optional. It is looked up from the current directory
//! upward; without one, built-in defaults apply. CLI options override
//! whatever the file says.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

// Re-export from section/
pub use section::{ExporterConfig, PngConfig, Rasterizer};

// Re-export from types/
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{cli::Cli, debug, log, utils::path::normalize_path};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{fs, path::Path};

/// Config file name searched for when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "diagram-export.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing diagram-export.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// SVG exporter settings
    #[serde(default)]
    pub export: ExporterConfig,

    /// PNG rasterization settings
    #[serde(default)]
    pub png: PngConfig,
}

impl Config {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. A missing file is fine
    /// unless the user named one explicitly with `--config`.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                debug!("config"; "loading {}", normalize_path(&path).display());
                Self::from_path(&path)?
            }
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                bail!(ConfigError::NotFound(cli.config.clone()))
            }
            None => Self::default(),
        };

        config.finalize(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        self.export.expand_tilde();
        self.png.expand_tilde();
        self.apply_cli_options(cli);
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply CLI overrides.
    fn apply_cli_options(&mut self, cli: &Cli) {
        Self::update_option(&mut self.png.scale, cli.scale.as_ref());
        Self::update_option(&mut self.export.timeout, cli.timeout.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Collect diagnostics for every section.
    fn diagnose(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();
        self.export.validate(&mut diag);
        self.png.validate(&mut diag);
        diag
    }

    /// Validate configuration.
    ///
    /// Prints warnings and returns all collected errors at once.
    pub fn validate(&self) -> Result<()> {
        let diag = self.diagnose();
        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
