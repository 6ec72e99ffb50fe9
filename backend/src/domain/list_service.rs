//! Habit list domain logic.
//!
//! Lists group habits and carry their own contiguous tab-bar order.
//! Deleting a list never deletes its habits; they are detached into the
//! unlisted scope.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::lists::{
    CreateListCommand, CreateListResult, DeleteListCommand, DeleteListResult, ReorderListsCommand,
    UpdateListCommand,
};
use crate::domain::events::{DomainEvent, EventBus};
use crate::domain::models::habit_list::HabitList;
use crate::storage::csv::{CsvConnection, HabitRepository, ListRepository};
use crate::storage::{HabitListStorage, HabitStorage};
use shared::HabitListSummary;

/// Service for managing habit lists.
#[derive(Clone)]
pub struct ListService {
    list_repository: ListRepository,
    habit_repository: HabitRepository,
    events: EventBus,
}

impl ListService {
    pub fn new(connection: Arc<CsvConnection>, events: EventBus) -> Self {
        Self {
            list_repository: ListRepository::new((*connection).clone()),
            habit_repository: HabitRepository::new((*connection).clone()),
            events,
        }
    }

    pub fn create_list(&self, command: CreateListCommand) -> Result<CreateListResult> {
        info!("Creating list: {:?}", command.name);

        let name = validate_list_name(&command.name)?;
        let order = self.list_repository.list_lists()?.len() as i64;
        let now = Utc::now();
        let list = HabitList {
            id: HabitList::generate_id(),
            name,
            icon: command.icon,
            color: command.color,
            order,
            created_at: now,
            updated_at: now,
        };
        self.list_repository.store_list(&list)?;

        Ok(CreateListResult {
            list,
            success_message: "List created successfully".to_string(),
        })
    }

    pub fn update_list(&self, command: UpdateListCommand) -> Result<HabitList> {
        let mut list = self.require_list(&command.list_id)?;
        if let Some(name) = command.name {
            list.name = validate_list_name(&name)?;
        }
        if let Some(icon) = command.icon {
            list.icon = icon;
        }
        if let Some(color) = command.color {
            list.color = color;
        }
        list.updated_at = Utc::now();
        self.list_repository.update_list(&list)?;
        Ok(list)
    }

    /// Delete a list, detaching its habits into the unlisted scope.
    pub fn delete_list(&self, command: DeleteListCommand) -> Result<DeleteListResult> {
        info!("Deleting list: {}", command.list_id);

        let list = self.require_list(&command.list_id)?;

        // Append the orphaned habits to the end of the unlisted scope,
        // preserving their relative order
        let habits = self.habit_repository.list_habits()?;
        let unlisted_count = habits.iter().filter(|h| h.list_id.is_none()).count() as i64;
        let mut detached: Vec<_> = habits
            .into_iter()
            .filter(|h| h.list_id.as_deref() == Some(list.id.as_str()))
            .collect();
        detached.sort_by_key(|h| h.order);
        for (index, habit) in detached.iter_mut().enumerate() {
            habit.list_id = None;
            habit.order = unlisted_count + index as i64;
            habit.updated_at = Utc::now();
        }
        if !detached.is_empty() {
            self.habit_repository.update_habits(&detached)?;
        }

        self.list_repository.delete_list(&list.id)?;
        self.renumber_lists()?;

        for habit in &detached {
            self.events.publish(&DomainEvent::HabitUpdated {
                habit_id: habit.id.clone(),
            });
        }
        info!("Successfully deleted list: {}", list.id);

        Ok(DeleteListResult {
            success_message: "List deleted successfully".to_string(),
            detached_habits: detached.len() as u32,
        })
    }

    /// Rewrite the tab-bar order from a permutation of the list ids.
    pub fn reorder_lists(&self, command: ReorderListsCommand) -> Result<()> {
        let mut lists = self.list_repository.list_lists()?;
        if lists.len() != command.ordered_ids.len() {
            return Err(anyhow::anyhow!(
                "Reorder must cover all lists: expected {} ids, got {}",
                lists.len(),
                command.ordered_ids.len()
            ));
        }
        for list in &mut lists {
            let position = command
                .ordered_ids
                .iter()
                .position(|id| *id == list.id)
                .ok_or_else(|| anyhow::anyhow!("List {} is not part of the reorder", list.id))?;
            list.order = position as i64;
            list.updated_at = Utc::now();
        }
        self.list_repository.update_lists(&lists)?;
        Ok(())
    }

    pub fn get_list(&self, list_id: &str) -> Result<Option<HabitList>> {
        Ok(self.list_repository.get_list(list_id)?)
    }

    pub fn list_lists(&self) -> Result<Vec<HabitList>> {
        Ok(self.list_repository.list_lists()?)
    }

    /// Lists with their visible-habit counts, for the tab bar.
    pub fn list_summaries(&self) -> Result<Vec<HabitListSummary>> {
        let habits = self.habit_repository.list_habits()?;
        let summaries = self
            .list_repository
            .list_lists()?
            .into_iter()
            .map(|list| {
                let habit_count = habits
                    .iter()
                    .filter(|h| !h.is_archived && h.list_id.as_deref() == Some(list.id.as_str()))
                    .count();
                HabitListSummary {
                    id: list.id,
                    name: list.name,
                    icon: list.icon,
                    color: list.color,
                    order: list.order,
                    habit_count,
                }
            })
            .collect();
        Ok(summaries)
    }

    fn renumber_lists(&self) -> Result<()> {
        let lists = self.list_repository.list_lists()?;
        let changed: Vec<HabitList> = lists
            .into_iter()
            .enumerate()
            .filter(|(index, list)| list.order != *index as i64)
            .map(|(index, mut list)| {
                list.order = index as i64;
                list
            })
            .collect();
        if !changed.is_empty() {
            self.list_repository.update_lists(&changed)?;
        }
        Ok(())
    }

    fn require_list(&self, list_id: &str) -> Result<HabitList> {
        self.list_repository
            .get_list(list_id)?
            .ok_or_else(|| anyhow::anyhow!("Habit list not found: {}", list_id))
    }
}

fn validate_list_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow::anyhow!("List name cannot be empty"));
    }
    if name.len() > 64 {
        return Err(anyhow::anyhow!("List name cannot exceed 64 characters"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::habits::{CreateHabitCommand, MoveHabitToListCommand};
    use crate::domain::habit_service::HabitService;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_services() -> (ListService, HabitService, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to init test storage"));
        let events = EventBus::new();
        let list_service = ListService::new(connection.clone(), events.clone());
        let habit_service = HabitService::new(connection, events);
        (list_service, habit_service, temp_dir)
    }

    fn create_list(service: &ListService, name: &str) -> HabitList {
        service
            .create_list(CreateListCommand {
                name: name.to_string(),
                icon: "folder".to_string(),
                color: "#50C878".to_string(),
            })
            .unwrap()
            .list
    }

    #[test]
    fn test_create_assigns_contiguous_orders() {
        let (service, _habits, _temp_dir) = create_test_services();
        assert_eq!(create_list(&service, "First").order, 0);
        assert_eq!(create_list(&service, "Second").order, 1);
    }

    #[test]
    fn test_delete_renumbers_and_detaches_habits() {
        let (service, habits, _temp_dir) = create_test_services();
        let first = create_list(&service, "First");
        let second = create_list(&service, "Second");
        let third = create_list(&service, "Third");

        // One unlisted habit plus one inside the list being deleted
        habits
            .create_habit(CreateHabitCommand::simple("Unlisted", date(2024, 1, 1)))
            .unwrap();
        let mut listed = CreateHabitCommand::simple("Listed", date(2024, 1, 1));
        listed.list_id = Some(second.id.clone());
        let listed = habits.create_habit(listed).unwrap().habit;

        let result = service
            .delete_list(DeleteListCommand { list_id: second.id.clone() })
            .unwrap();
        assert_eq!(result.detached_habits, 1);

        // Lists renumbered contiguously
        let orders: Vec<(String, i64)> = service
            .list_lists()
            .unwrap()
            .into_iter()
            .map(|l| (l.id, l.order))
            .collect();
        assert_eq!(orders, vec![(first.id, 0), (third.id, 1)]);

        // Habit landed at the end of the unlisted scope
        let moved = habits.get_habit(&listed.id).unwrap().unwrap();
        assert_eq!(moved.list_id, None);
        assert_eq!(moved.order, 1);
    }

    #[test]
    fn test_reorder_lists() {
        let (service, _habits, _temp_dir) = create_test_services();
        let a = create_list(&service, "A");
        let b = create_list(&service, "B");

        service
            .reorder_lists(ReorderListsCommand { ordered_ids: vec![b.id.clone(), a.id.clone()] })
            .unwrap();
        let names: Vec<String> =
            service.list_lists().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["B", "A"]);

        let result = service.reorder_lists(ReorderListsCommand { ordered_ids: vec![a.id] });
        assert!(result.is_err());
    }

    #[test]
    fn test_list_summaries_count_visible_habits() {
        let (service, habits, _temp_dir) = create_test_services();
        let list = create_list(&service, "Morning");

        let mut command = CreateHabitCommand::simple("Meditate", date(2024, 1, 1));
        command.list_id = Some(list.id.clone());
        habits.create_habit(command).unwrap();
        let habit = habits
            .create_habit(CreateHabitCommand::simple("Unlisted", date(2024, 1, 1)))
            .unwrap()
            .habit;
        habits
            .move_habit_to_list(MoveHabitToListCommand {
                habit_id: habit.id,
                list_id: Some(list.id.clone()),
            })
            .unwrap();

        let summaries = service.list_summaries().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].habit_count, 2);
    }
}
