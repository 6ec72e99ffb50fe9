//! Domain model for a habit reminder.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reminder attached to a habit. Delivery through the platform
/// notification system is the embedding application's concern; the
/// backend only stores the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub habit_id: String,
    pub time_of_day: NaiveTime,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Generate a unique reminder ID.
    /// Format: reminder::<uuid-v4>
    pub fn generate_id() -> String {
        format!("reminder::{}", Uuid::new_v4())
    }
}
