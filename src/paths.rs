//! Path utilities for determining data storage locations.
//!
//! All persistent state lives under `~/.taskforest/`: the `SQLite` database
//! with every partition's document, the optional YAML configuration, and
//! the debug operation log.

use std::path::PathBuf;

/// The base directory name for taskforest data.
const DATA_DIR_NAME: &str = ".taskforest";

/// The database filename.
pub const DATABASE_FILENAME: &str = "tasks.sqlite3";

/// Get the base data directory.
///
/// Returns `~/.taskforest/`, or `None` if the home directory cannot be
/// determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Get the default database path.
///
/// Returns `~/.taskforest/tasks.sqlite3`, or `None` if the home directory
/// cannot be determined.
#[must_use]
pub fn database_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DATABASE_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_under_home() {
        if let Some(dir) = data_dir() {
            assert!(dir.ends_with(DATA_DIR_NAME));
        }
    }

    #[test]
    fn test_database_path_filename() {
        if let Some(path) = database_path() {
            assert_eq!(
                path.file_name().and_then(|n| n.to_str()),
                Some(DATABASE_FILENAME)
            );
        }
    }
}
