//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output that only appears with `--verbose`
//! - `warning` for the user-facing fallback warning
//!
//! Everything here writes to stderr. Stdout is reserved for the
//! `Exported: <path>` result line so callers can capture it.
//!
//! # Example
//!
//! ```ignore
//! log!("export"; "running `{}`", cmd.display());
//! debug!("png"; "`{}` unavailable, trying next", tool);
//! ```

use owo_colors::{OwoColorize, Stream};
use std::{
    io::{Write, stderr},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stderr = stderr().lock();
    writeln!(stderr, "{prefix} {message}").ok();
    stderr.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "export" => prefix
            .if_supports_color(Stream::Stderr, |p| p.bright_blue().bold().to_string())
            .to_string(),
        "png" => prefix
            .if_supports_color(Stream::Stderr, |p| p.bright_green().bold().to_string())
            .to_string(),
        "error" => prefix
            .if_supports_color(Stream::Stderr, |p| p.bright_red().bold().to_string())
            .to_string(),
        _ => prefix
            .if_supports_color(Stream::Stderr, |p| p.bright_yellow().bold().to_string())
            .to_string(),
    }
}

/// Print a `Warning: ...` line to stderr.
///
/// Unlike `log!`, this is part of the user-facing contract and is printed
/// regardless of verbosity.
pub fn warning(message: &str) {
    let label = "Warning:";
    let mut stderr = stderr().lock();
    writeln!(
        stderr,
        "{} {message}",
        label.if_supports_color(Stream::Stderr, |l| l.yellow().bold().to_string())
    )
    .ok();
    stderr.flush().ok();
}

/// Print an `Error: ...` line to stderr.
pub fn error(message: &str) {
    let label = "Error:";
    let mut stderr = stderr().lock();
    writeln!(
        stderr,
        "{} {message}",
        label.if_supports_color(Stream::Stderr, |l| l.red().bold().to_string())
    )
    .ok();
    stderr.flush().ok();
}

// ============================================================================
// Tests
// ============================================================================
