//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization and file moves

pub mod fs;

pub use fs::{move_file, normalize_path};
