//! Type-safe config field path.

use owo_colors::{OwoColorize, Stream};
use std::fmt;

/// A type-safe wrapper for config field paths.
///
/// Each section exposes its field paths as a `FIELDS` constant so
/// diagnostics never spell a key by hand.
///
/// # Example
///
/// ```ignore
/// diag.error(PngConfig::FIELDS.scale, "must be greater than 0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted = format!("`{}`", self.0);
        write!(
            f,
            "{}",
            quoted.if_supports_color(Stream::Stderr, |q| q.bright_blue().to_string())
        )
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}
