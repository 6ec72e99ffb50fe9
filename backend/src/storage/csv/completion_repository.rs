//! CSV-backed completion repository.
//!
//! All completions share one `completions.csv`; the (habit, day) pair is
//! the logical primary key, and `upsert_completion` enforces it by
//! replacing any existing row for the pair.

use chrono::NaiveDate;

use crate::domain::models::completion::Completion;
use crate::storage::{CompletionStorage, StorageResult};

use super::connection::CsvConnection;
use super::{read_rows, write_rows};

const COMPLETIONS_FILE: &str = "completions.csv";

/// CSV-backed completion repository.
#[derive(Debug, Clone)]
pub struct CompletionRepository {
    connection: CsvConnection,
}

impl CompletionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_all(&self) -> StorageResult<Vec<Completion>> {
        read_rows(&self.connection, COMPLETIONS_FILE)
    }

    fn write_all(&self, completions: &[Completion]) -> StorageResult<()> {
        write_rows(&self.connection, COMPLETIONS_FILE, completions)
    }
}

impl CompletionStorage for CompletionRepository {
    fn upsert_completion(&self, completion: &Completion) -> StorageResult<()> {
        let mut completions = self.read_all()?;
        completions
            .retain(|c| !(c.habit_id == completion.habit_id && c.date == completion.date));
        completions.push(completion.clone());
        self.write_all(&completions)
    }

    fn get_completion(&self, habit_id: &str, date: NaiveDate) -> StorageResult<Option<Completion>> {
        Ok(self
            .read_all()?
            .into_iter()
            .find(|c| c.habit_id == habit_id && c.date == date))
    }

    fn list_completions(&self, habit_id: &str) -> StorageResult<Vec<Completion>> {
        let mut completions: Vec<Completion> = self
            .read_all()?
            .into_iter()
            .filter(|c| c.habit_id == habit_id)
            .collect();
        completions.sort_by_key(|c| c.date);
        Ok(completions)
    }

    fn list_completions_in_range(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StorageResult<Vec<Completion>> {
        let mut completions: Vec<Completion> = self
            .read_all()?
            .into_iter()
            .filter(|c| c.habit_id == habit_id && c.date >= start && c.date <= end)
            .collect();
        completions.sort_by_key(|c| c.date);
        Ok(completions)
    }

    fn delete_completions_for_habit(&self, habit_id: &str) -> StorageResult<u32> {
        let mut completions = self.read_all()?;
        let before = completions.len();
        completions.retain(|c| c.habit_id != habit_id);
        let removed = (before - completions.len()) as u32;
        if removed > 0 {
            self.write_all(&completions)?;
        }
        Ok(removed)
    }
}
