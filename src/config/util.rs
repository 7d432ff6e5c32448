//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// An absolute `config_name` is returned as-is when it exists.
///
/// # Example
/// ```text
/// /home/user/docs/diagrams/    ← start
/// /home/user/docs/diagram-export.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_in_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("diagram-export.toml"), "").unwrap();

        let found = find_config_file(Path::new("diagram-export.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("diagram-export.toml"));
    }

    #[test]
    fn test_nearest_wins() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("diagram-export.toml"), "").unwrap();
        fs::write(nested.join("diagram-export.toml"), "").unwrap();

        let found = find_config_file(Path::new("diagram-export.toml"), &nested).unwrap();
        assert_eq!(found, nested.join("diagram-export.toml"));
    }

    #[test]
    fn test_not_found() {
        let dir = TempDir::new().unwrap();
        let name = Path::new("diagram-export-missing-config-xyz.toml");
        assert_eq!(find_config_file(name, dir.path()), None);
    }

    #[test]
    fn test_absolute_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        assert_eq!(find_config_file(&path, dir.path()), None);

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
