//! Domain model for a habit list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named group of habits with its own position in the tab bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitList {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HabitList {
    /// Generate a unique list ID.
    /// Format: list::<uuid-v4>
    pub fn generate_id() -> String {
        format!("list::{}", Uuid::new_v4())
    }
}
