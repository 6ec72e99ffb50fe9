//! Domain model for a completion record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A record that a habit was (or was not) done on a given calendar day.
/// At most one record exists per (habit, day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub habit_id: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Completion {
    pub fn new(habit_id: &str, date: NaiveDate, completed: bool) -> Self {
        Self {
            habit_id: habit_id.to_string(),
            date,
            completed,
            created_at: Utc::now(),
        }
    }
}

/// Set of completed days for one habit, the shape recurrence evaluation
/// and streak calculations consume.
#[derive(Debug, Clone, Default)]
pub struct CompletionIndex {
    completed_days: BTreeSet<NaiveDate>,
}

impl CompletionIndex {
    /// Build the index from raw records, keeping only days marked completed.
    pub fn from_completions(completions: &[Completion]) -> Self {
        let completed_days = completions
            .iter()
            .filter(|c| c.completed)
            .map(|c| c.date)
            .collect();
        Self { completed_days }
    }

    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.completed_days.contains(&date)
    }

    /// Whether any day in the inclusive range is completed.
    pub fn any_completed_in(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.completed_days.range(start..=end).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.completed_days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed_days.is_empty()
    }
}
