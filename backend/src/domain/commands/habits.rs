//! Command and result types for habit operations.

use chrono::NaiveDate;

use crate::domain::models::habit::{Habit, Intensity};
use crate::domain::models::repeat_pattern::{RepeatPattern, Schedule, Tracking};

/// Create a new habit with its initial repeat pattern.
#[derive(Debug, Clone)]
pub struct CreateHabitCommand {
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub color: String,
    pub start_date: NaiveDate,
    pub is_bad_habit: bool,
    pub intensity: Intensity,
    pub list_id: Option<String>,
    pub category_id: Option<String>,
    pub schedule: Schedule,
    pub follow_up: bool,
    pub tracking: Tracking,
}

impl CreateHabitCommand {
    /// A minimal every-day habit, the shape most tests and callers start from.
    pub fn simple(name: &str, start_date: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            icon: "circle".to_string(),
            color: "#4A90D9".to_string(),
            start_date,
            is_bad_habit: false,
            intensity: Intensity::default(),
            list_id: None,
            category_id: None,
            schedule: Schedule::daily(),
            follow_up: false,
            tracking: Tracking::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateHabitResult {
    pub habit: Habit,
    pub success_message: String,
}

/// Partial update of habit fields. `None` fields are left unchanged;
/// list membership moves through `MoveHabitToListCommand` because it
/// renumbers two scopes.
#[derive(Debug, Clone, Default)]
pub struct UpdateHabitCommand {
    pub habit_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_bad_habit: Option<bool>,
    pub intensity: Option<Intensity>,
    pub category_id: Option<String>,
    /// Detach from the current category (wins over `category_id`)
    pub clear_category: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateHabitResult {
    pub habit: Habit,
    pub success_message: String,
}

/// Move a habit into a list (or out of every list with `None`).
#[derive(Debug, Clone)]
pub struct MoveHabitToListCommand {
    pub habit_id: String,
    pub list_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteHabitCommand {
    pub habit_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteHabitResult {
    pub success_message: String,
    /// Completion records removed along with the habit
    pub deleted_completions: u32,
}

#[derive(Debug, Clone)]
pub struct SetArchivedCommand {
    pub habit_id: String,
    pub archived: bool,
}

/// Rewrite the manual order of one scope. `list_id: None` is the
/// unlisted scope. `ordered_ids` must be a permutation of the habits
/// currently in that scope.
#[derive(Debug, Clone)]
pub struct ReorderHabitsCommand {
    pub list_id: Option<String>,
    pub ordered_ids: Vec<String>,
}

/// Append a schedule version to a habit's pattern history.
#[derive(Debug, Clone)]
pub struct AddRepeatPatternCommand {
    pub habit_id: String,
    pub pattern: RepeatPattern,
}

/// Filter for listing habits.
#[derive(Debug, Clone, Default)]
pub struct HabitListQuery {
    pub include_archived: bool,
    /// When set, only habits in this list; `None` means all habits
    pub list_id: Option<String>,
}
