//! Durable UI preferences: the selected tab and the overview sort.
//!
//! Both survive app restarts through the preference store. An
//! unparseable stored sort option degrades to the default instead of
//! failing, so a downgraded install never locks the user out.

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::events::{DomainEvent, EventBus};
use crate::storage::csv::{CsvConnection, PreferenceRepository};
use crate::storage::{PreferenceStorage, StoredPreferences};
use shared::HabitSortOption;

/// Typed view of the stored preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct UiPreferences {
    /// Selected tab: -1 for the all-habits tab, otherwise a list index
    pub selected_list_index: i64,
    pub sort_option: HabitSortOption,
}

/// Service for reading and writing durable UI preferences.
#[derive(Clone)]
pub struct PreferencesService {
    repository: PreferenceRepository,
    events: EventBus,
}

impl PreferencesService {
    pub fn new(connection: Arc<CsvConnection>, events: EventBus) -> Self {
        Self {
            repository: PreferenceRepository::new((*connection).clone()),
            events,
        }
    }

    pub fn get_preferences(&self) -> Result<UiPreferences> {
        let stored = self.repository.get_preferences()?;
        let sort_option = stored.sort_option.parse().unwrap_or_else(|err| {
            warn!("Stored sort option is unreadable ({}), using default", err);
            HabitSortOption::default()
        });
        Ok(UiPreferences {
            selected_list_index: stored.selected_list_index,
            sort_option,
        })
    }

    /// Persist the selected tab and notify subscribers.
    pub fn set_selected_list_index(&self, index: i64) -> Result<()> {
        if index < -1 {
            return Err(anyhow::anyhow!("Invalid list index: {}", index));
        }
        let mut stored = self.repository.get_preferences()?;
        stored.selected_list_index = index;
        self.repository.update_preferences(&stored)?;
        info!("Selected list index set to {}", index);
        self.events.publish(&DomainEvent::ListSelectionChanged { index });
        Ok(())
    }

    pub fn set_sort_option(&self, sort_option: HabitSortOption) -> Result<()> {
        let mut stored = self.repository.get_preferences()?;
        stored.sort_option = sort_option.to_string();
        self.repository.update_preferences(&stored)?;
        info!("Sort option set to {}", sort_option);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn create_test_service() -> (PreferencesService, EventBus, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to init test storage"));
        let events = EventBus::new();
        (PreferencesService::new(connection, events.clone()), events, temp_dir)
    }

    #[test]
    fn test_defaults_on_first_access() {
        let (service, _events, _temp_dir) = create_test_service();
        let preferences = service.get_preferences().unwrap();
        assert_eq!(preferences.selected_list_index, -1);
        assert_eq!(preferences.sort_option, HabitSortOption::Custom);
    }

    #[test]
    fn test_preferences_survive_restart() {
        let (service, events, temp_dir) = create_test_service();
        service.set_selected_list_index(1).unwrap();
        service.set_sort_option(HabitSortOption::Streak).unwrap();

        // New service over the same directory, simulating a restart
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let reopened = PreferencesService::new(connection, events);
        let preferences = reopened.get_preferences().unwrap();
        assert_eq!(preferences.selected_list_index, 1);
        assert_eq!(preferences.sort_option, HabitSortOption::Streak);
    }

    #[test]
    fn test_selection_publishes_event() {
        let (service, events, _temp_dir) = create_test_service();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        events.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        service.set_selected_list_index(2).unwrap();
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[DomainEvent::ListSelectionChanged { index: 2 }]
        );

        assert!(service.set_selected_list_index(-2).is_err());
    }

    #[test]
    fn test_unreadable_sort_option_degrades_to_default() {
        let (service, _events, temp_dir) = create_test_service();
        service.get_preferences().unwrap();

        // Corrupt the stored sort option directly
        let path = temp_dir.path().join("preferences.yaml");
        let yaml = std::fs::read_to_string(&path).unwrap();
        let yaml = yaml.replace("sort_option: custom", "sort_option: reverse-cosmic");
        std::fs::write(&path, yaml).unwrap();

        let preferences = service.get_preferences().unwrap();
        assert_eq!(preferences.sort_option, HabitSortOption::default());
    }
}
