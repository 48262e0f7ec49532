//! Centralized path functions for every ProSlide storage location.

use std::path::PathBuf;

/// File name of the JSON data file written next to the server by default.
pub const DEFAULT_DATA_FILE: &str = "erp_data.json";

/// App cache root: `~/Library/Caches/proslide/` (macOS) or `~/.cache/proslide/` (Linux).
pub fn app_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("proslide"))
}

/// SQLite document store: `<app_cache_dir>/proslide.db`.
pub fn db_path() -> Option<PathBuf> {
    app_cache_dir().map(|d| d.join("proslide.db"))
}

/// JSON data file, relative to the working directory.
pub fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

/// Sibling used to keep the previous contents of `data_file` across a write.
pub fn backup_path(data_file: &std::path::Path) -> PathBuf {
    let mut name = data_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".bak");
    data_file.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_app_cache_dir() {
        let dir = app_cache_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().to_string_lossy().contains("proslide"));
    }

    #[test]
    fn test_db_path() {
        let path = db_path().unwrap();
        assert!(path.to_string_lossy().ends_with("proslide.db"));
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/srv/data/erp_data.json")),
            Path::new("/srv/data/erp_data.json.bak")
        );
        assert_eq!(default_data_file(), Path::new("erp_data.json"));
    }
}
