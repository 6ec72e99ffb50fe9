//! Completion service domain logic.
//!
//! Completions are per-(habit, day) records; toggling is the primary
//! user action and must be idempotent in pairs: toggling twice lands
//! back on the original state. Every mutation publishes on the event
//! bus so derived views refresh.

use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

use crate::domain::commands::completions::{
    CompletionRangeQuery, SetCompletionCommand, ToggleCompletionCommand, ToggleCompletionResult,
};
use crate::domain::events::{DomainEvent, EventBus};
use crate::domain::models::completion::{Completion, CompletionIndex};
use crate::storage::csv::{CompletionRepository, CsvConnection, HabitRepository};
use crate::storage::{CompletionStorage, HabitStorage};

/// Service for recording and querying habit completions.
#[derive(Clone)]
pub struct CompletionService {
    completion_repository: CompletionRepository,
    habit_repository: HabitRepository,
    events: EventBus,
}

impl CompletionService {
    pub fn new(connection: Arc<CsvConnection>, events: EventBus) -> Self {
        Self {
            completion_repository: CompletionRepository::new((*connection).clone()),
            habit_repository: HabitRepository::new((*connection).clone()),
            events,
        }
    }

    /// Flip the completion state of a (habit, day).
    pub fn toggle_completion(&self, command: ToggleCompletionCommand) -> Result<ToggleCompletionResult> {
        info!("Toggling completion for {} on {}", command.habit_id, command.date);

        self.require_habit(&command.habit_id)?;
        let existing = self
            .completion_repository
            .get_completion(&command.habit_id, command.date)?;
        let completed = match existing {
            Some(completion) => !completion.completed,
            None => true,
        };
        let completion = Completion::new(&command.habit_id, command.date, completed);
        self.persist_and_publish(&completion)?;

        let success_message = if completed {
            "Habit marked done".to_string()
        } else {
            "Habit marked not done".to_string()
        };
        Ok(ToggleCompletionResult { completion, success_message })
    }

    /// Set the completion state of a (habit, day) absolutely.
    pub fn set_completion(&self, command: SetCompletionCommand) -> Result<Completion> {
        self.require_habit(&command.habit_id)?;
        let completion = Completion::new(&command.habit_id, command.date, command.completed);
        self.persist_and_publish(&completion)?;
        Ok(completion)
    }

    pub fn get_completion(&self, habit_id: &str, date: NaiveDate) -> Result<Option<Completion>> {
        Ok(self.completion_repository.get_completion(habit_id, date)?)
    }

    pub fn is_completed(&self, habit_id: &str, date: NaiveDate) -> Result<bool> {
        Ok(self
            .get_completion(habit_id, date)?
            .map(|c| c.completed)
            .unwrap_or(false))
    }

    /// Completions within an inclusive date range, oldest first.
    pub fn completions_in_range(&self, query: CompletionRangeQuery) -> Result<Vec<Completion>> {
        Ok(self.completion_repository.list_completions_in_range(
            &query.habit_id,
            query.start,
            query.end,
        )?)
    }

    /// The completed-day set recurrence evaluation and statistics consume.
    pub fn completion_index(&self, habit_id: &str) -> Result<CompletionIndex> {
        let completions = self.completion_repository.list_completions(habit_id)?;
        Ok(CompletionIndex::from_completions(&completions))
    }

    fn persist_and_publish(&self, completion: &Completion) -> Result<()> {
        self.completion_repository.upsert_completion(completion)?;
        self.events.publish(&DomainEvent::HabitToggled {
            habit_id: completion.habit_id.clone(),
            date: completion.date,
            completed: completion.completed,
        });
        if completion.completed {
            self.events.publish(&DomainEvent::HabitCompleted {
                habit_id: completion.habit_id.clone(),
                date: completion.date,
            });
        }
        Ok(())
    }

    fn require_habit(&self, habit_id: &str) -> Result<()> {
        if self.habit_repository.get_habit(habit_id)?.is_none() {
            return Err(anyhow::anyhow!("Habit not found: {}", habit_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::habits::CreateHabitCommand;
    use crate::domain::habit_service::HabitService;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_services() -> (CompletionService, HabitService, EventBus, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to init test storage"));
        let events = EventBus::new();
        let habit_service = HabitService::new(connection.clone(), events.clone());
        let completion_service = CompletionService::new(connection, events.clone());
        (completion_service, habit_service, events, temp_dir)
    }

    fn create_habit(habits: &HabitService) -> String {
        habits
            .create_habit(CreateHabitCommand::simple("Read", date(2024, 1, 1)))
            .unwrap()
            .habit
            .id
    }

    #[test]
    fn test_toggle_twice_restores_original_state() {
        let (service, habits, _events, _temp_dir) = create_test_services();
        let habit_id = create_habit(&habits);
        let day = date(2024, 1, 5);

        assert!(!service.is_completed(&habit_id, day).unwrap());

        let first = service
            .toggle_completion(ToggleCompletionCommand { habit_id: habit_id.clone(), date: day })
            .unwrap();
        assert!(first.completion.completed);

        let second = service
            .toggle_completion(ToggleCompletionCommand { habit_id: habit_id.clone(), date: day })
            .unwrap();
        assert!(!second.completion.completed);
        assert!(!service.is_completed(&habit_id, day).unwrap());

        // Only one record exists for the pair either way
        let completions = service
            .completions_in_range(CompletionRangeQuery {
                habit_id: habit_id.clone(),
                start: day,
                end: day,
            })
            .unwrap();
        assert_eq!(completions.len(), 1);
    }

    #[test]
    fn test_toggle_unknown_habit_fails() {
        let (service, _habits, _events, _temp_dir) = create_test_services();
        let result = service.toggle_completion(ToggleCompletionCommand {
            habit_id: "habit::missing".to_string(),
            date: date(2024, 1, 5),
        });
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_set_completion_is_absolute() {
        let (service, habits, _events, _temp_dir) = create_test_services();
        let habit_id = create_habit(&habits);
        let day = date(2024, 1, 5);

        for _ in 0..2 {
            service
                .set_completion(SetCompletionCommand {
                    habit_id: habit_id.clone(),
                    date: day,
                    completed: true,
                })
                .unwrap();
        }
        assert!(service.is_completed(&habit_id, day).unwrap());
    }

    #[test]
    fn test_toggle_publishes_events() {
        let (service, habits, events, _temp_dir) = create_test_services();
        let habit_id = create_habit(&habits);
        let day = date(2024, 1, 5);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        events.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        service
            .toggle_completion(ToggleCompletionCommand { habit_id: habit_id.clone(), date: day })
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[
                DomainEvent::HabitToggled { habit_id: habit_id.clone(), date: day, completed: true },
                DomainEvent::HabitCompleted { habit_id: habit_id.clone(), date: day },
            ]
        );
    }

    #[test]
    fn test_completion_index_reflects_completed_days() {
        let (service, habits, _events, _temp_dir) = create_test_services();
        let habit_id = create_habit(&habits);

        service
            .set_completion(SetCompletionCommand {
                habit_id: habit_id.clone(),
                date: date(2024, 1, 5),
                completed: true,
            })
            .unwrap();
        service
            .set_completion(SetCompletionCommand {
                habit_id: habit_id.clone(),
                date: date(2024, 1, 6),
                completed: false,
            })
            .unwrap();

        let index = service.completion_index(&habit_id).unwrap();
        assert!(index.is_completed(date(2024, 1, 5)));
        assert!(!index.is_completed(date(2024, 1, 6)));
    }
}
