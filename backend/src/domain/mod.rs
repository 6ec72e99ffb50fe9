//! Domain layer: models, commands, the recurrence evaluator, and the
//! services that implement the application's business rules.

pub mod calendar;
pub mod category_service;
pub mod commands;
pub mod completion_service;
pub mod events;
pub mod habit_service;
pub mod list_service;
pub mod models;
pub mod overview_service;
pub mod preferences_service;
pub mod recurrence;
pub mod stats_service;

pub use calendar::CalendarService;
pub use category_service::CategoryService;
pub use completion_service::CompletionService;
pub use events::{DomainEvent, EventBus, SubscriptionId};
pub use habit_service::HabitService;
pub use list_service::ListService;
pub use overview_service::OverviewService;
pub use preferences_service::{PreferencesService, UiPreferences};
pub use stats_service::{HabitStatistics, StatsService};
