//! # Storage layer
//!
//! Storage abstraction traits that let the domain layer work against
//! different backing stores. The shipped implementation is file-based
//! (`csv` module); the traits keep a SQL backend possible without
//! touching the domain services.
//!
//! Unlike the rest of the backend, which reports failures through
//! `anyhow`, the storage boundary uses a typed `StorageError` so
//! callers can tell I/O failures from malformed data from missing
//! records.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::models::category::HabitCategory;
use crate::domain::models::completion::Completion;
use crate::domain::models::habit::Habit;
use crate::domain::models::habit_list::HabitList;
use crate::domain::models::reminder::Reminder;

pub mod csv;

pub use self::csv::CsvConnection;

/// Failure taxonomy of the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Interface for habit storage. A habit is stored together with its
/// repeat-pattern history; loading a habit always yields its complete,
/// sorted pattern vector.
pub trait HabitStorage: Send + Sync {
    /// Store a new habit (with its patterns)
    fn store_habit(&self, habit: &Habit) -> StorageResult<()>;

    /// Retrieve a specific habit by ID
    fn get_habit(&self, habit_id: &str) -> StorageResult<Option<Habit>>;

    /// List all habits, archived included, ordered by (list scope, order)
    fn list_habits(&self) -> StorageResult<Vec<Habit>>;

    /// Update an existing habit; errors with `NotFound` if absent
    fn update_habit(&self, habit: &Habit) -> StorageResult<()>;

    /// Update several habits in one rewrite (bulk order renumbering)
    fn update_habits(&self, habits: &[Habit]) -> StorageResult<()>;

    /// Delete a habit and its patterns; true if it existed
    fn delete_habit(&self, habit_id: &str) -> StorageResult<bool>;
}

/// Interface for completion storage. The (habit, day) pair is the
/// primary key; storing over an existing pair replaces it.
pub trait CompletionStorage: Send + Sync {
    fn upsert_completion(&self, completion: &Completion) -> StorageResult<()>;

    fn get_completion(&self, habit_id: &str, date: NaiveDate) -> StorageResult<Option<Completion>>;

    /// All completions for a habit, ordered by date ascending
    fn list_completions(&self, habit_id: &str) -> StorageResult<Vec<Completion>>;

    /// Completions within an inclusive date range, ordered by date ascending
    fn list_completions_in_range(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StorageResult<Vec<Completion>>;

    /// Remove every completion of a habit; returns how many were removed
    fn delete_completions_for_habit(&self, habit_id: &str) -> StorageResult<u32>;
}

/// Interface for habit list storage.
pub trait HabitListStorage: Send + Sync {
    fn store_list(&self, list: &HabitList) -> StorageResult<()>;

    fn get_list(&self, list_id: &str) -> StorageResult<Option<HabitList>>;

    /// All lists ordered by their tab-bar order
    fn list_lists(&self) -> StorageResult<Vec<HabitList>>;

    fn update_list(&self, list: &HabitList) -> StorageResult<()>;

    /// Update several lists in one rewrite (order renumbering)
    fn update_lists(&self, lists: &[HabitList]) -> StorageResult<()>;

    /// Delete a list; true if it existed
    fn delete_list(&self, list_id: &str) -> StorageResult<bool>;
}

/// Interface for category storage.
pub trait CategoryStorage: Send + Sync {
    fn store_category(&self, category: &HabitCategory) -> StorageResult<()>;

    fn get_category(&self, category_id: &str) -> StorageResult<Option<HabitCategory>>;

    /// All categories ordered by name
    fn list_categories(&self) -> StorageResult<Vec<HabitCategory>>;

    fn update_category(&self, category: &HabitCategory) -> StorageResult<()>;

    /// Delete a category; true if it existed
    fn delete_category(&self, category_id: &str) -> StorageResult<bool>;
}

/// Interface for reminder storage.
pub trait ReminderStorage: Send + Sync {
    fn store_reminder(&self, reminder: &Reminder) -> StorageResult<()>;

    /// Reminders of one habit, ordered by time of day
    fn list_reminders(&self, habit_id: &str) -> StorageResult<Vec<Reminder>>;

    /// Delete a reminder; true if it existed
    fn delete_reminder(&self, reminder_id: &str) -> StorageResult<bool>;

    /// Remove every reminder of a habit; returns how many were removed
    fn delete_reminders_for_habit(&self, habit_id: &str) -> StorageResult<u32>;
}

/// Durable UI preferences as stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPreferences {
    /// Selected tab: -1 for the all-habits tab, otherwise a list index
    pub selected_list_index: i64,
    /// String form of the overview sort option
    pub sort_option: String,
}

impl Default for StoredPreferences {
    fn default() -> Self {
        Self {
            selected_list_index: -1,
            sort_option: "custom".to_string(),
        }
    }
}

/// Interface for preference storage.
pub trait PreferenceStorage: Send + Sync {
    /// Load preferences, creating defaults on first access
    fn get_preferences(&self) -> StorageResult<StoredPreferences>;

    fn update_preferences(&self, preferences: &StoredPreferences) -> StorageResult<()>;
}

/// Interface for storage connections.
///
/// Abstracts the backing store and provides factory methods for the
/// repositories derived state services need, so those services can stay
/// generic over the storage backend.
pub trait Connection: Send + Sync + Clone {
    type HabitRepository: HabitStorage;
    type CompletionRepository: CompletionStorage;

    fn create_habit_repository(&self) -> Self::HabitRepository;
    fn create_completion_repository(&self) -> Self::CompletionRepository;
}
