//! Command and result types for category operations.

use crate::domain::models::category::HabitCategory;

#[derive(Debug, Clone)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryResult {
    pub category: HabitCategory,
    pub success_message: String,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryCommand {
    pub category_id: String,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteCategoryCommand {
    pub category_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteCategoryResult {
    pub success_message: String,
    /// Habits detached from the deleted category
    pub detached_habits: u32,
}
