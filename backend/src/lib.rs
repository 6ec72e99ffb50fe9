//! # Habital backend
//!
//! Headless backend of the Habital habit tracker: domain services over a
//! file-based store, a pure recurrence evaluator, and an in-process
//! event bus. The crate is synchronous throughout: every operation is a
//! blocking read-modify-write against local files, matching the
//! single-threaded, UI-event-driven shape of the application it serves.
//!
//! Frontends construct one [`Backend`] and call its services directly;
//! cross-view refresh runs over [`domain::EventBus`].

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod storage;

pub use storage::csv::CsvConnection;

use domain::{
    CalendarService, CategoryService, CompletionService, EventBus, HabitService, ListService,
    OverviewService, PreferencesService, StatsService,
};

/// Main backend struct that wires all services over one data directory.
pub struct Backend {
    pub habit_service: HabitService,
    pub completion_service: CompletionService,
    pub list_service: ListService,
    pub category_service: CategoryService,
    pub stats_service: StatsService<CsvConnection>,
    pub overview_service: OverviewService,
    pub calendar_service: CalendarService,
    pub preferences_service: PreferencesService,
    events: EventBus,
}

impl Backend {
    /// Create a backend instance with all services rooted at `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let connection = Arc::new(CsvConnection::new(data_dir)?);
        let events = EventBus::new();

        let habit_service = HabitService::new(connection.clone(), events.clone());
        let completion_service = CompletionService::new(connection.clone(), events.clone());
        let list_service = ListService::new(connection.clone(), events.clone());
        let category_service = CategoryService::new(connection.clone(), events.clone());
        let stats_service = StatsService::new(connection.clone());
        let overview_service = OverviewService::new(
            habit_service.clone(),
            completion_service.clone(),
            stats_service.clone(),
            &events,
        );
        let calendar_service = CalendarService::new(events.clone());
        let preferences_service = PreferencesService::new(connection, events.clone());

        Ok(Backend {
            habit_service,
            completion_service,
            list_service,
            category_service,
            stats_service,
            overview_service,
            calendar_service,
            preferences_service,
            events,
        })
    }

    /// The bus all services publish on; frontends subscribe here.
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::completions::ToggleCompletionCommand;
    use crate::domain::commands::habits::CreateHabitCommand;
    use crate::domain::commands::overview::OverviewQuery;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_backend_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let backend = Backend::new(temp_dir.path()).unwrap();

        let habit = backend
            .habit_service
            .create_habit(CreateHabitCommand::simple("Read", date(2024, 1, 1)))
            .unwrap()
            .habit;
        backend
            .completion_service
            .toggle_completion(ToggleCompletionCommand {
                habit_id: habit.id.clone(),
                date: date(2024, 1, 2),
            })
            .unwrap();

        let overview = backend
            .overview_service
            .habit_overview(OverviewQuery::for_date(date(2024, 1, 2)))
            .unwrap();
        assert_eq!(overview.len(), 1);
        assert!(overview[0].completed);

        let month = backend
            .calendar_service
            .calendar_month(1, 2024, &backend.habit_service, &backend.completion_service)
            .unwrap();
        assert!(month.days.iter().any(|d| d.completion_ratio == 1.0));

        // Data survives reconstruction over the same directory
        drop(backend);
        let reopened = Backend::new(temp_dir.path()).unwrap();
        let loaded = reopened.habit_service.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Read");
        assert!(reopened
            .completion_service
            .is_completed(&habit.id, date(2024, 1, 2))
            .unwrap());
    }
}
