//! Habit service domain logic.
//!
//! This module contains the core business logic for habit management:
//! CRUD operations, archiving, list membership, manual ordering, and the
//! repeat-pattern history.
//!
//! ## Business rules
//!
//! - Names are 1-64 characters after trimming; descriptions up to 256
//! - Colors are "#RRGGBB" hex strings
//! - Habits sharing a `list_id` (including `None` for unlisted habits)
//!   form one scope whose `order` values stay a contiguous 0..n-1
//!   sequence across create, delete, move, and reorder
//! - Schedule edits append a pattern version instead of mutating history,
//!   so past days keep evaluating under their original rules

use anyhow::Result;
use chrono::{NaiveTime, Utc};
use log::info;
use std::sync::Arc;

use crate::domain::commands::habits::{
    AddRepeatPatternCommand, CreateHabitCommand, CreateHabitResult, DeleteHabitCommand,
    DeleteHabitResult, HabitListQuery, MoveHabitToListCommand, ReorderHabitsCommand,
    SetArchivedCommand, UpdateHabitCommand, UpdateHabitResult,
};
use crate::domain::events::{DomainEvent, EventBus};
use crate::domain::models::habit::Habit;
use crate::domain::models::reminder::Reminder;
use crate::domain::models::repeat_pattern::RepeatPattern;
use crate::storage::csv::{
    CategoryRepository, CompletionRepository, CsvConnection, HabitRepository, ListRepository,
    ReminderRepository,
};
use crate::storage::{
    CategoryStorage, CompletionStorage, HabitListStorage, HabitStorage, ReminderStorage,
};

/// Service for managing habits and their repeat patterns.
#[derive(Clone)]
pub struct HabitService {
    habit_repository: HabitRepository,
    list_repository: ListRepository,
    category_repository: CategoryRepository,
    completion_repository: CompletionRepository,
    reminder_repository: ReminderRepository,
    events: EventBus,
}

impl HabitService {
    pub fn new(connection: Arc<CsvConnection>, events: EventBus) -> Self {
        Self {
            habit_repository: HabitRepository::new((*connection).clone()),
            list_repository: ListRepository::new((*connection).clone()),
            category_repository: CategoryRepository::new((*connection).clone()),
            completion_repository: CompletionRepository::new((*connection).clone()),
            reminder_repository: ReminderRepository::new((*connection).clone()),
            events,
        }
    }

    /// Create a new habit with its initial repeat pattern.
    pub fn create_habit(&self, command: CreateHabitCommand) -> Result<CreateHabitResult> {
        info!("Creating habit: {:?}", command.name);

        let name = validate_name(&command.name)?;
        validate_description(command.description.as_deref())?;
        validate_color(&command.color)?;
        if let Some(list_id) = &command.list_id {
            self.require_list(list_id)?;
        }
        if let Some(category_id) = &command.category_id {
            self.require_category(category_id)?;
        }

        let order = self.scope_habits(&command.list_id)?.len() as i64;
        let now = Utc::now();
        let pattern = RepeatPattern {
            effective_from: command.start_date,
            created_at: now,
            follow_up: command.follow_up,
            tracking: command.tracking,
            schedule: command.schedule,
        };
        let habit = Habit {
            id: Habit::generate_id(),
            name,
            description: command.description.map(|d| d.trim().to_string()),
            icon: command.icon,
            color: command.color,
            start_date: command.start_date,
            is_bad_habit: command.is_bad_habit,
            intensity: command.intensity,
            order,
            is_archived: false,
            list_id: command.list_id,
            category_id: command.category_id,
            patterns: vec![pattern],
            created_at: now,
            updated_at: now,
        };

        self.habit_repository.store_habit(&habit)?;
        self.events.publish(&DomainEvent::HabitCreated {
            habit_id: habit.id.clone(),
        });
        info!("Successfully created habit: {}", habit.id);

        Ok(CreateHabitResult {
            habit,
            success_message: "Habit created successfully".to_string(),
        })
    }

    /// Partially update habit fields (list membership moves separately).
    pub fn update_habit(&self, command: UpdateHabitCommand) -> Result<UpdateHabitResult> {
        info!("Updating habit: {}", command.habit_id);

        let mut habit = self.require_habit(&command.habit_id)?;

        if let Some(name) = command.name {
            habit.name = validate_name(&name)?;
        }
        if let Some(description) = command.description {
            validate_description(Some(&description))?;
            habit.description = Some(description.trim().to_string());
        }
        if let Some(icon) = command.icon {
            habit.icon = icon;
        }
        if let Some(color) = command.color {
            validate_color(&color)?;
            habit.color = color;
        }
        if let Some(is_bad_habit) = command.is_bad_habit {
            habit.is_bad_habit = is_bad_habit;
        }
        if let Some(intensity) = command.intensity {
            habit.intensity = intensity;
        }
        if command.clear_category {
            habit.category_id = None;
        } else if let Some(category_id) = command.category_id {
            self.require_category(&category_id)?;
            habit.category_id = Some(category_id);
        }

        habit.updated_at = Utc::now();
        self.habit_repository.update_habit(&habit)?;
        self.events.publish(&DomainEvent::HabitUpdated {
            habit_id: habit.id.clone(),
        });

        Ok(UpdateHabitResult {
            habit,
            success_message: "Habit updated successfully".to_string(),
        })
    }

    /// Move a habit between list scopes, renumbering both.
    pub fn move_habit_to_list(&self, command: MoveHabitToListCommand) -> Result<UpdateHabitResult> {
        info!("Moving habit {} to list {:?}", command.habit_id, command.list_id);

        let mut habit = self.require_habit(&command.habit_id)?;
        if let Some(list_id) = &command.list_id {
            self.require_list(list_id)?;
        }

        if habit.list_id == command.list_id {
            return Ok(UpdateHabitResult {
                habit,
                success_message: "Habit already in that list".to_string(),
            });
        }

        let source_scope = habit.list_id.clone();
        habit.list_id = command.list_id;
        habit.order = self.scope_habits(&habit.list_id)?.len() as i64;
        habit.updated_at = Utc::now();
        self.habit_repository.update_habit(&habit)?;

        // Close the gap the habit left behind
        self.renumber_scope(&source_scope)?;

        self.events.publish(&DomainEvent::HabitUpdated {
            habit_id: habit.id.clone(),
        });

        Ok(UpdateHabitResult {
            habit,
            success_message: "Habit moved successfully".to_string(),
        })
    }

    /// Delete a habit along with its completions and reminders.
    pub fn delete_habit(&self, command: DeleteHabitCommand) -> Result<DeleteHabitResult> {
        info!("Deleting habit: {}", command.habit_id);

        let habit = self.require_habit(&command.habit_id)?;
        self.habit_repository.delete_habit(&habit.id)?;
        let deleted_completions = self
            .completion_repository
            .delete_completions_for_habit(&habit.id)?;
        self.reminder_repository.delete_reminders_for_habit(&habit.id)?;
        self.renumber_scope(&habit.list_id)?;

        self.events.publish(&DomainEvent::HabitDeleted {
            habit_id: habit.id.clone(),
        });
        info!("Successfully deleted habit: {}", habit.id);

        Ok(DeleteHabitResult {
            success_message: "Habit deleted successfully".to_string(),
            deleted_completions,
        })
    }

    /// Archive or unarchive. Order positions are retained so the scope
    /// sequence stays contiguous with archived habits in place.
    pub fn set_archived(&self, command: SetArchivedCommand) -> Result<UpdateHabitResult> {
        let mut habit = self.require_habit(&command.habit_id)?;
        habit.is_archived = command.archived;
        habit.updated_at = Utc::now();
        self.habit_repository.update_habit(&habit)?;
        self.events.publish(&DomainEvent::HabitUpdated {
            habit_id: habit.id.clone(),
        });

        let action = if command.archived { "archived" } else { "unarchived" };
        Ok(UpdateHabitResult {
            habit,
            success_message: format!("Habit {} successfully", action),
        })
    }

    /// Rewrite the manual order of one scope from a permutation of its ids.
    pub fn reorder_habits(&self, command: ReorderHabitsCommand) -> Result<()> {
        info!("Reordering {} habits in scope {:?}", command.ordered_ids.len(), command.list_id);

        let mut scope = self.scope_habits(&command.list_id)?;
        if scope.len() != command.ordered_ids.len() {
            return Err(anyhow::anyhow!(
                "Reorder must cover the whole scope: expected {} ids, got {}",
                scope.len(),
                command.ordered_ids.len()
            ));
        }

        for habit in &mut scope {
            let position = command
                .ordered_ids
                .iter()
                .position(|id| *id == habit.id)
                .ok_or_else(|| anyhow::anyhow!("Habit {} is not part of the reorder", habit.id))?;
            habit.order = position as i64;
            habit.updated_at = Utc::now();
        }
        self.habit_repository.update_habits(&scope)?;

        self.events.publish(&DomainEvent::HabitsReordered {
            list_id: command.list_id,
        });
        Ok(())
    }

    /// Append a schedule version to a habit's pattern history.
    pub fn add_repeat_pattern(&self, command: AddRepeatPatternCommand) -> Result<UpdateHabitResult> {
        info!(
            "Adding pattern effective {} to habit {}",
            command.pattern.effective_from, command.habit_id
        );

        let mut habit = self.require_habit(&command.habit_id)?;
        habit.upsert_pattern(command.pattern);
        habit.updated_at = Utc::now();
        self.habit_repository.update_habit(&habit)?;
        self.events.publish(&DomainEvent::HabitUpdated {
            habit_id: habit.id.clone(),
        });

        Ok(UpdateHabitResult {
            habit,
            success_message: "Schedule updated successfully".to_string(),
        })
    }

    pub fn get_habit(&self, habit_id: &str) -> Result<Option<Habit>> {
        Ok(self.habit_repository.get_habit(habit_id)?)
    }

    /// List habits with archive and list filtering, in scope order.
    pub fn list_habits(&self, query: HabitListQuery) -> Result<Vec<Habit>> {
        let habits = self
            .habit_repository
            .list_habits()?
            .into_iter()
            .filter(|h| query.include_archived || !h.is_archived)
            .filter(|h| match &query.list_id {
                Some(list_id) => h.list_id.as_deref() == Some(list_id.as_str()),
                None => true,
            })
            .collect();
        Ok(habits)
    }

    /// Attach a reminder to a habit.
    pub fn add_reminder(
        &self,
        habit_id: &str,
        time_of_day: NaiveTime,
        notes: Option<String>,
    ) -> Result<Reminder> {
        let habit = self.require_habit(habit_id)?;
        let reminder = Reminder {
            id: Reminder::generate_id(),
            habit_id: habit.id,
            time_of_day,
            notes,
            created_at: Utc::now(),
        };
        self.reminder_repository.store_reminder(&reminder)?;
        Ok(reminder)
    }

    pub fn list_reminders(&self, habit_id: &str) -> Result<Vec<Reminder>> {
        Ok(self.reminder_repository.list_reminders(habit_id)?)
    }

    pub fn delete_reminder(&self, reminder_id: &str) -> Result<bool> {
        Ok(self.reminder_repository.delete_reminder(reminder_id)?)
    }

    /// All habits of one scope (same `list_id`, archived included),
    /// sorted by their manual order.
    fn scope_habits(&self, list_id: &Option<String>) -> Result<Vec<Habit>> {
        let mut scope: Vec<Habit> = self
            .habit_repository
            .list_habits()?
            .into_iter()
            .filter(|h| h.list_id == *list_id)
            .collect();
        scope.sort_by_key(|h| h.order);
        Ok(scope)
    }

    /// Reassign 0..n-1 orders within a scope, preserving relative order.
    fn renumber_scope(&self, list_id: &Option<String>) -> Result<()> {
        let scope = self.scope_habits(list_id)?;
        let changed: Vec<Habit> = scope
            .into_iter()
            .enumerate()
            .filter(|(index, habit)| habit.order != *index as i64)
            .map(|(index, mut habit)| {
                habit.order = index as i64;
                habit
            })
            .collect();
        if !changed.is_empty() {
            self.habit_repository.update_habits(&changed)?;
        }
        Ok(())
    }

    fn require_habit(&self, habit_id: &str) -> Result<Habit> {
        self.habit_repository
            .get_habit(habit_id)?
            .ok_or_else(|| anyhow::anyhow!("Habit not found: {}", habit_id))
    }

    fn require_list(&self, list_id: &str) -> Result<()> {
        if self.list_repository.get_list(list_id)?.is_none() {
            return Err(anyhow::anyhow!("Habit list not found: {}", list_id));
        }
        Ok(())
    }

    fn require_category(&self, category_id: &str) -> Result<()> {
        if self.category_repository.get_category(category_id)?.is_none() {
            return Err(anyhow::anyhow!("Category not found: {}", category_id));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow::anyhow!("Habit name cannot be empty"));
    }
    if name.len() > 64 {
        return Err(anyhow::anyhow!("Habit name cannot exceed 64 characters"));
    }
    Ok(name.to_string())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    if let Some(description) = description {
        if description.len() > 256 {
            return Err(anyhow::anyhow!("Habit description cannot exceed 256 characters"));
        }
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(anyhow::anyhow!("Color must be a #RRGGBB hex string, got '{}'", color));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::lists::CreateListCommand;
    use crate::domain::list_service::ListService;
    use crate::domain::models::repeat_pattern::Schedule;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_services() -> (HabitService, ListService, EventBus, TempDir) {
        let _ = env_logger::builder().is_test(true).try_init();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to init test storage"));
        let events = EventBus::new();
        let habit_service = HabitService::new(connection.clone(), events.clone());
        let list_service = ListService::new(connection, events.clone());
        (habit_service, list_service, events, temp_dir)
    }

    fn orders(service: &HabitService, list_id: &Option<String>) -> Vec<i64> {
        service
            .scope_habits(list_id)
            .unwrap()
            .into_iter()
            .map(|h| h.order)
            .collect()
    }

    #[test]
    fn test_create_habit_assigns_scope_order() {
        let (service, _lists, _events, _temp_dir) = create_test_services();
        let first = service
            .create_habit(CreateHabitCommand::simple("Read", date(2024, 1, 1)))
            .unwrap();
        let second = service
            .create_habit(CreateHabitCommand::simple("Run", date(2024, 1, 1)))
            .unwrap();

        assert_eq!(first.habit.order, 0);
        assert_eq!(second.habit.order, 1);
        assert_eq!(first.habit.patterns.len(), 1);
    }

    #[test]
    fn test_create_habit_validation() {
        let (service, _lists, _events, _temp_dir) = create_test_services();

        let result = service.create_habit(CreateHabitCommand::simple("  ", date(2024, 1, 1)));
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));

        let mut command = CreateHabitCommand::simple("Read", date(2024, 1, 1));
        command.color = "blue".to_string();
        let result = service.create_habit(command);
        assert!(result.unwrap_err().to_string().contains("hex string"));

        let mut command = CreateHabitCommand::simple("Read", date(2024, 1, 1));
        command.list_id = Some("list::missing".to_string());
        let result = service.create_habit(command);
        assert!(result.unwrap_err().to_string().contains("list not found"));
    }

    #[test]
    fn test_delete_renumbers_scope_contiguously() {
        let (service, _lists, _events, _temp_dir) = create_test_services();
        let ids: Vec<String> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| {
                service
                    .create_habit(CreateHabitCommand::simple(name, date(2024, 1, 1)))
                    .unwrap()
                    .habit
                    .id
            })
            .collect();

        service
            .delete_habit(DeleteHabitCommand { habit_id: ids[1].clone() })
            .unwrap();

        assert_eq!(orders(&service, &None), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_rewrites_orders() {
        let (service, _lists, _events, _temp_dir) = create_test_services();
        let ids: Vec<String> = ["A", "B", "C"]
            .iter()
            .map(|name| {
                service
                    .create_habit(CreateHabitCommand::simple(name, date(2024, 1, 1)))
                    .unwrap()
                    .habit
                    .id
            })
            .collect();

        service
            .reorder_habits(ReorderHabitsCommand {
                list_id: None,
                ordered_ids: vec![ids[2].clone(), ids[0].clone(), ids[1].clone()],
            })
            .unwrap();

        let names: Vec<String> = service
            .scope_habits(&None)
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(orders(&service, &None), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_rejects_incomplete_permutation() {
        let (service, _lists, _events, _temp_dir) = create_test_services();
        let id = service
            .create_habit(CreateHabitCommand::simple("A", date(2024, 1, 1)))
            .unwrap()
            .habit
            .id;
        service
            .create_habit(CreateHabitCommand::simple("B", date(2024, 1, 1)))
            .unwrap();

        let result = service.reorder_habits(ReorderHabitsCommand {
            list_id: None,
            ordered_ids: vec![id],
        });
        assert!(result.unwrap_err().to_string().contains("whole scope"));
    }

    #[test]
    fn test_move_between_lists_renumbers_both_scopes() {
        let (service, lists, _events, _temp_dir) = create_test_services();
        let list = lists
            .create_list(CreateListCommand {
                name: "Morning".to_string(),
                icon: "sun".to_string(),
                color: "#FFD700".to_string(),
            })
            .unwrap()
            .list;

        let ids: Vec<String> = ["A", "B", "C"]
            .iter()
            .map(|name| {
                service
                    .create_habit(CreateHabitCommand::simple(name, date(2024, 1, 1)))
                    .unwrap()
                    .habit
                    .id
            })
            .collect();

        let moved = service
            .move_habit_to_list(MoveHabitToListCommand {
                habit_id: ids[0].clone(),
                list_id: Some(list.id.clone()),
            })
            .unwrap();

        assert_eq!(moved.habit.order, 0);
        assert_eq!(orders(&service, &None), vec![0, 1]);
        assert_eq!(orders(&service, &Some(list.id)), vec![0]);
    }

    #[test]
    fn test_archive_keeps_position_and_filters_listing() {
        let (service, _lists, _events, _temp_dir) = create_test_services();
        let id = service
            .create_habit(CreateHabitCommand::simple("A", date(2024, 1, 1)))
            .unwrap()
            .habit
            .id;
        service
            .create_habit(CreateHabitCommand::simple("B", date(2024, 1, 1)))
            .unwrap();

        service
            .set_archived(SetArchivedCommand { habit_id: id.clone(), archived: true })
            .unwrap();

        let visible = service.list_habits(HabitListQuery::default()).unwrap();
        assert_eq!(visible.len(), 1);
        let all = service
            .list_habits(HabitListQuery { include_archived: true, list_id: None })
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(orders(&service, &None), vec![0, 1]);
    }

    #[test]
    fn test_add_repeat_pattern_versions_schedule() {
        let (service, _lists, _events, _temp_dir) = create_test_services();
        let habit = service
            .create_habit(CreateHabitCommand::simple("Read", date(2024, 1, 1)))
            .unwrap()
            .habit;

        service
            .add_repeat_pattern(AddRepeatPatternCommand {
                habit_id: habit.id.clone(),
                pattern: RepeatPattern::new(date(2024, 3, 1), Schedule::every_n_days(3)),
            })
            .unwrap();

        let loaded = service.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(loaded.patterns.len(), 2);
        assert_eq!(loaded.patterns[1].effective_from, date(2024, 3, 1));
    }

    #[test]
    fn test_mutations_publish_events() {
        let (service, _lists, events, _temp_dir) = create_test_services();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        events.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let habit = service
            .create_habit(CreateHabitCommand::simple("Read", date(2024, 1, 1)))
            .unwrap()
            .habit;
        service
            .delete_habit(DeleteHabitCommand { habit_id: habit.id.clone() })
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], DomainEvent::HabitCreated { habit_id: habit.id.clone() });
        assert_eq!(seen[1], DomainEvent::HabitDeleted { habit_id: habit.id });
    }

    #[test]
    fn test_reminders_round_trip() {
        let (service, _lists, _events, _temp_dir) = create_test_services();
        let habit = service
            .create_habit(CreateHabitCommand::simple("Hydrate", date(2024, 1, 1)))
            .unwrap()
            .habit;

        let reminder = service
            .add_reminder(&habit.id, NaiveTime::from_hms_opt(9, 0, 0).unwrap(), None)
            .unwrap();
        assert_eq!(service.list_reminders(&habit.id).unwrap().len(), 1);
        assert!(service.delete_reminder(&reminder.id).unwrap());
        assert!(service.list_reminders(&habit.id).unwrap().is_empty());
    }
}
