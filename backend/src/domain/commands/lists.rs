//! Command and result types for habit list operations.

use crate::domain::models::habit_list::HabitList;

#[derive(Debug, Clone)]
pub struct CreateListCommand {
    pub name: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct CreateListResult {
    pub list: HabitList,
    pub success_message: String,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateListCommand {
    pub list_id: String,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteListCommand {
    pub list_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteListResult {
    pub success_message: String,
    /// Habits moved out of the deleted list
    pub detached_habits: u32,
}

/// Rewrite the tab-bar order of all lists. `ordered_ids` must be a
/// permutation of the existing list ids.
#[derive(Debug, Clone)]
pub struct ReorderListsCommand {
    pub ordered_ids: Vec<String>,
}
