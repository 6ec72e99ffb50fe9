//! CSV-backed reminder repository.

use crate::domain::models::reminder::Reminder;
use crate::storage::{ReminderStorage, StorageResult};

use super::connection::CsvConnection;
use super::{read_rows, write_rows};

const REMINDERS_FILE: &str = "reminders.csv";

/// CSV-backed reminder repository.
#[derive(Debug, Clone)]
pub struct ReminderRepository {
    connection: CsvConnection,
}

impl ReminderRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_all(&self) -> StorageResult<Vec<Reminder>> {
        read_rows(&self.connection, REMINDERS_FILE)
    }

    fn write_all(&self, reminders: &[Reminder]) -> StorageResult<()> {
        write_rows(&self.connection, REMINDERS_FILE, reminders)
    }
}

impl ReminderStorage for ReminderRepository {
    fn store_reminder(&self, reminder: &Reminder) -> StorageResult<()> {
        let mut reminders = self.read_all()?;
        reminders.push(reminder.clone());
        self.write_all(&reminders)
    }

    fn list_reminders(&self, habit_id: &str) -> StorageResult<Vec<Reminder>> {
        let mut reminders: Vec<Reminder> = self
            .read_all()?
            .into_iter()
            .filter(|r| r.habit_id == habit_id)
            .collect();
        reminders.sort_by_key(|r| r.time_of_day);
        Ok(reminders)
    }

    fn delete_reminder(&self, reminder_id: &str) -> StorageResult<bool> {
        let mut reminders = self.read_all()?;
        let before = reminders.len();
        reminders.retain(|r| r.id != reminder_id);
        if reminders.len() == before {
            return Ok(false);
        }
        self.write_all(&reminders)?;
        Ok(true)
    }

    fn delete_reminders_for_habit(&self, habit_id: &str) -> StorageResult<u32> {
        let mut reminders = self.read_all()?;
        let before = reminders.len();
        reminders.retain(|r| r.habit_id != habit_id);
        let removed = (before - reminders.len()) as u32;
        if removed > 0 {
            self.write_all(&reminders)?;
        }
        Ok(removed)
    }
}
