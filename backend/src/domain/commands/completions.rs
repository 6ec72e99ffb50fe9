//! Command and result types for completion operations.

use chrono::NaiveDate;

use crate::domain::models::completion::Completion;

/// Flip the completion state of a (habit, day).
#[derive(Debug, Clone)]
pub struct ToggleCompletionCommand {
    pub habit_id: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct ToggleCompletionResult {
    pub completion: Completion,
    pub success_message: String,
}

/// Set the completion state of a (habit, day) absolutely.
#[derive(Debug, Clone)]
pub struct SetCompletionCommand {
    pub habit_id: String,
    pub date: NaiveDate,
    pub completed: bool,
}

/// Inclusive date-range query over one habit's completions.
#[derive(Debug, Clone)]
pub struct CompletionRangeQuery {
    pub habit_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}
