//! # CSV storage module
//!
//! File-based storage implementation: one CSV file per aggregate plus a
//! YAML preferences file, all under a shared base directory. Rows are
//! (de)serialized with serde; nested schedule payloads are JSON-encoded
//! into a single column. Reads skip malformed rows with a warning so one
//! corrupt line never takes the whole store down; writes go through a
//! temp file + rename.

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::StorageResult;

pub mod category_repository;
pub mod completion_repository;
pub mod connection;
pub mod habit_repository;
pub mod list_repository;
pub mod preference_repository;
pub mod reminder_repository;

pub use category_repository::CategoryRepository;
pub use completion_repository::CompletionRepository;
pub use connection::CsvConnection;
pub use habit_repository::HabitRepository;
pub use list_repository::ListRepository;
pub use preference_repository::PreferenceRepository;
pub use reminder_repository::ReminderRepository;

/// Read every well-formed row of a repository file. A missing file is an
/// empty repository, not an error.
pub(crate) fn read_rows<T: DeserializeOwned>(
    connection: &CsvConnection,
    file_name: &str,
) -> StorageResult<Vec<T>> {
    let path = connection.file_path(file_name);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(&path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => warn!("Skipping malformed row in {}: {}", file_name, err),
        }
    }
    Ok(rows)
}

/// Rewrite a repository file with the given rows, atomically.
pub(crate) fn write_rows<T: Serialize>(
    connection: &CsvConnection,
    file_name: &str,
    rows: &[T],
) -> StorageResult<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;
    connection.write_atomic(file_name, &bytes)
}
