//! Category domain logic.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::categories::{
    CreateCategoryCommand, CreateCategoryResult, DeleteCategoryCommand, DeleteCategoryResult,
    UpdateCategoryCommand,
};
use crate::domain::events::{DomainEvent, EventBus};
use crate::domain::models::category::HabitCategory;
use crate::storage::csv::{CategoryRepository, CsvConnection, HabitRepository};
use crate::storage::{CategoryStorage, HabitStorage};

/// Service for managing habit categories.
#[derive(Clone)]
pub struct CategoryService {
    category_repository: CategoryRepository,
    habit_repository: HabitRepository,
    events: EventBus,
}

impl CategoryService {
    pub fn new(connection: Arc<CsvConnection>, events: EventBus) -> Self {
        Self {
            category_repository: CategoryRepository::new((*connection).clone()),
            habit_repository: HabitRepository::new((*connection).clone()),
            events,
        }
    }

    pub fn create_category(&self, command: CreateCategoryCommand) -> Result<CreateCategoryResult> {
        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Category name cannot be empty"));
        }
        let category = HabitCategory {
            id: HabitCategory::generate_id(),
            name,
            icon: command.icon,
            color: command.color,
        };
        self.category_repository.store_category(&category)?;

        Ok(CreateCategoryResult {
            category,
            success_message: "Category created successfully".to_string(),
        })
    }

    pub fn update_category(&self, command: UpdateCategoryCommand) -> Result<HabitCategory> {
        let mut category = self.require_category(&command.category_id)?;
        if let Some(name) = command.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(anyhow::anyhow!("Category name cannot be empty"));
            }
            category.name = name;
        }
        if let Some(icon) = command.icon {
            category.icon = icon;
        }
        if let Some(color) = command.color {
            category.color = color;
        }
        self.category_repository.update_category(&category)?;
        Ok(category)
    }

    /// Delete a category, detaching every habit tagged with it.
    pub fn delete_category(&self, command: DeleteCategoryCommand) -> Result<DeleteCategoryResult> {
        info!("Deleting category: {}", command.category_id);

        let category = self.require_category(&command.category_id)?;
        let mut detached: Vec<_> = self
            .habit_repository
            .list_habits()?
            .into_iter()
            .filter(|h| h.category_id.as_deref() == Some(category.id.as_str()))
            .collect();
        for habit in &mut detached {
            habit.category_id = None;
            habit.updated_at = Utc::now();
        }
        if !detached.is_empty() {
            self.habit_repository.update_habits(&detached)?;
        }
        self.category_repository.delete_category(&category.id)?;

        for habit in &detached {
            self.events.publish(&DomainEvent::HabitUpdated {
                habit_id: habit.id.clone(),
            });
        }

        Ok(DeleteCategoryResult {
            success_message: "Category deleted successfully".to_string(),
            detached_habits: detached.len() as u32,
        })
    }

    pub fn get_category(&self, category_id: &str) -> Result<Option<HabitCategory>> {
        Ok(self.category_repository.get_category(category_id)?)
    }

    pub fn list_categories(&self) -> Result<Vec<HabitCategory>> {
        Ok(self.category_repository.list_categories()?)
    }

    fn require_category(&self, category_id: &str) -> Result<HabitCategory> {
        self.category_repository
            .get_category(category_id)?
            .ok_or_else(|| anyhow::anyhow!("Category not found: {}", category_id))
    }
}
