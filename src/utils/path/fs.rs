//! Filesystem path utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `move_file` - rename with a copy fallback for cross-device moves

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// # Example
/// ```ignore
/// let abs = normalize_path(Path::new("./diagram-export.toml"));
/// ```
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Move `from` onto `to`, replacing any existing file.
///
/// `fs::rename` cannot cross filesystems, so on failure the file is copied
/// and the source removed.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}
