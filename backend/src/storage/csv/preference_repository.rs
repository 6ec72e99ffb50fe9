//! YAML-backed preference repository.
//!
//! Durable UI state lives in a single `preferences.yaml` at the root of
//! the data directory:
//!
//! ```yaml
//! selected_list_index: -1
//! sort_option: "custom"
//! data_format_version: "1.0"
//! created_at: "2025-01-21T19:30:00Z"
//! updated_at: "2025-01-21T19:35:00Z"
//! ```

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::storage::{PreferenceStorage, StorageResult, StoredPreferences};

use super::connection::CsvConnection;

const PREFERENCES_FILE: &str = "preferences.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreferencesFile {
    selected_list_index: i64,
    sort_option: String,
    /// Data format version for future migrations
    data_format_version: String,
    created_at: String,
    updated_at: String,
}

impl Default for PreferencesFile {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        let defaults = StoredPreferences::default();
        Self {
            selected_list_index: defaults.selected_list_index,
            sort_option: defaults.sort_option,
            data_format_version: "1.0".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// YAML-backed preference repository.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    connection: CsvConnection,
}

impl PreferenceRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn preferences_path(&self) -> PathBuf {
        self.connection.file_path(PREFERENCES_FILE)
    }

    fn load_or_create(&self) -> StorageResult<PreferencesFile> {
        let path = self.preferences_path();
        if path.exists() {
            let yaml = fs::read_to_string(&path)?;
            let file: PreferencesFile = serde_yaml::from_str(&yaml)?;
            debug!("Loaded preferences from {:?}", path);
            Ok(file)
        } else {
            let file = PreferencesFile::default();
            self.save(&file)?;
            info!("Created default preferences at {:?}", path);
            Ok(file)
        }
    }

    fn save(&self, file: &PreferencesFile) -> StorageResult<()> {
        let yaml = serde_yaml::to_string(file)?;
        self.connection.write_atomic(PREFERENCES_FILE, yaml.as_bytes())
    }
}

impl PreferenceStorage for PreferenceRepository {
    fn get_preferences(&self) -> StorageResult<StoredPreferences> {
        let file = self.load_or_create()?;
        Ok(StoredPreferences {
            selected_list_index: file.selected_list_index,
            sort_option: file.sort_option,
        })
    }

    fn update_preferences(&self, preferences: &StoredPreferences) -> StorageResult<()> {
        let mut file = self.load_or_create()?;
        file.selected_list_index = preferences.selected_list_index;
        file.sort_option = preferences.sort_option.clone();
        file.updated_at = Utc::now().to_rfc3339();
        self.save(&file)
    }
}
