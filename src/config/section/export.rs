//! `[export]` section configuration.
//!
//! Describes the SVG exporter: the launcher plus tool to run, how long it
//! may take, and the file name it actually writes.
//!
//! # Example
//!
//! ```toml
//! [export]
//! command = ["npx", "excalidraw_export"]  # input and output are appended
//! timeout = 60                            # seconds
//! suffix = "excalidraw.svg"               # extension the exporter writes
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Launcher and exporter. The first word is checked on `PATH` before
    /// any export is attempted.
    pub command: Vec<String>,

    /// Seconds the exporter may run before it is killed.
    pub timeout: u64,

    /// Extension the exporter gives its output, replacing the input's.
    /// `diagram.excalidraw` becomes `diagram.excalidraw.svg`.
    pub suffix: String,
}

pub struct ExporterConfigFields {
    pub command: FieldPath,
    pub timeout: FieldPath,
    pub suffix: FieldPath,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            command: vec!["npx".into(), "excalidraw_export".into()],
            timeout: 60,
            suffix: "excalidraw.svg".into(),
        }
    }
}

impl ExporterConfig {
    pub const FIELDS: ExporterConfigFields = ExporterConfigFields {
        command: FieldPath::new("export.command"),
        timeout: FieldPath::new("export.timeout"),
        suffix: FieldPath::new("export.suffix"),
    };

    /// The runtime launcher (first word of `command`).
    pub fn launcher(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Expand `~` in the launcher path.
    pub fn expand_tilde(&mut self) {
        if let Some(launcher) = self.command.first_mut() {
            *launcher = shellexpand::tilde(launcher.as_str()).into_owned();
        }
    }

    /// Validate exporter configuration.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.launcher().trim().is_empty() {
            diag.error_with_hint(
                Self::FIELDS.command,
                "exporter command is empty",
                format!("set {} = [\"npx\", \"excalidraw_export\"]", Self::FIELDS.command),
            );
        }

        if self.timeout == 0 {
            diag.error(Self::FIELDS.timeout, "must be at least 1 second");
        }

        if self.suffix.trim_matches('.').is_empty() {
            diag.error_with_hint(
                Self::FIELDS.suffix,
                "suffix is empty",
                format!("set {} = \"excalidraw.svg\"", Self::FIELDS.suffix),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.export.command, vec!["npx", "excalidraw_export"]);
        assert_eq!(config.export.launcher(), "npx");
        assert_eq!(config.export.timeout(), Duration::from_secs(60));
        assert_eq!(config.export.suffix, "excalidraw.svg");
    }

    #[test]
    fn test_custom_command() {
        let config = test_parse_config(
            "[export]\ncommand = [\"bunx\", \"excalidraw_export\"]\ntimeout = 120",
        );
        assert_eq!(config.export.launcher(), "bunx");
        assert_eq!(config.export.timeout, 120);
    }

    #[test]
    fn test_expand_tilde() {
        let mut export = ExporterConfig {
            command: vec!["~/bin/npx".into(), "excalidraw_export".into()],
            ..Default::default()
        };
        export.expand_tilde();
        assert_eq!(export.launcher(), shellexpand::tilde("~/bin/npx"));
        assert_eq!(export.command[1], "excalidraw_export");
    }

    #[test]
    fn test_validate_rejects_empty_command_and_zero_timeout() {
        let export = ExporterConfig {
            command: Vec::new(),
            timeout: 0,
            suffix: String::new(),
        };
        let mut diag = ConfigDiagnostics::new();
        export.validate(&mut diag);

        let fields: Vec<_> = diag.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["export.command", "export.timeout", "export.suffix"]);
    }

    #[test]
    fn test_validate_defaults_ok() {
        let mut diag = ConfigDiagnostics::new();
        ExporterConfig::default().validate(&mut diag);
        assert!(diag.into_result().is_ok());
    }
}
