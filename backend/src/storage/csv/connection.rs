//! File-backed storage connection.
//!
//! All repositories share one base data directory:
//!
//! ```text
//! data/
//! ├── habits.csv
//! ├── patterns.csv
//! ├── completions.csv
//! ├── lists.csv
//! ├── categories.csv
//! ├── reminders.csv
//! └── preferences.yaml
//! ```
//!
//! Repositories read whole files and rewrite them through a temp file +
//! rename, so a crash mid-write never leaves a truncated data file.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{Connection, StorageResult};

use super::completion_repository::CompletionRepository;
use super::habit_repository::HabitRepository;

/// Handle to the data directory. Cheap to clone; repositories keep one.
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Open (and if needed create) a data directory.
    pub fn new(base_directory: impl AsRef<Path>) -> StorageResult<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        if !base_directory.exists() {
            fs::create_dir_all(&base_directory)?;
            info!("Created data directory {:?}", base_directory);
        }
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub(crate) fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }

    /// Replace `file_name` atomically with `contents`.
    pub(crate) fn write_atomic(&self, file_name: &str, contents: &[u8]) -> StorageResult<()> {
        let path = self.file_path(file_name);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }
}

impl Connection for CsvConnection {
    type HabitRepository = HabitRepository;
    type CompletionRepository = CompletionRepository;

    fn create_habit_repository(&self) -> HabitRepository {
        HabitRepository::new(self.clone())
    }

    fn create_completion_repository(&self) -> CompletionRepository {
        CompletionRepository::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("data").join("habital");
        let connection = CsvConnection::new(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(connection.base_directory(), nested.as_path());
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        connection.write_atomic("sample.csv", b"first").unwrap();
        connection.write_atomic("sample.csv", b"second").unwrap();
        let contents = fs::read_to_string(connection.file_path("sample.csv")).unwrap();
        assert_eq!(contents, "second");
        assert!(!connection.file_path("sample.tmp").exists());
    }
}
