//! Domain model for a habit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repeat_pattern::RepeatPattern;

/// How demanding a habit is, used for display weighting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intensity {
    Light,
    Moderate,
    High,
    Extreme,
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Moderate
    }
}

/// A trackable recurring activity, good or bad.
///
/// The habit owns its full history of repeat patterns, kept sorted by
/// `effective_from` ascending. `order` positions the habit within its
/// scope: habits sharing the same `list_id` (including `None` for
/// unlisted habits) form one contiguous 0..n-1 sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    /// Hex color, e.g. "#4A90D9"
    pub color: String,
    pub start_date: NaiveDate,
    pub is_bad_habit: bool,
    pub intensity: Intensity,
    pub order: i64,
    pub is_archived: bool,
    pub list_id: Option<String>,
    pub category_id: Option<String>,
    /// Sorted ascending by `effective_from`
    pub patterns: Vec<RepeatPattern>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Generate a unique habit ID.
    /// Format: habit::<uuid-v4>
    pub fn generate_id() -> String {
        format!("habit::{}", Uuid::new_v4())
    }

    /// Insert a pattern version, replacing any existing version with the
    /// same `effective_from` and keeping the history sorted.
    pub fn upsert_pattern(&mut self, pattern: RepeatPattern) {
        self.patterns
            .retain(|p| p.effective_from != pattern.effective_from);
        let position = self
            .patterns
            .partition_point(|p| p.effective_from < pattern.effective_from);
        self.patterns.insert(position, pattern);
    }
}
