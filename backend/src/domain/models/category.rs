//! Domain model for a habit category.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A label habits can be tagged with, orthogonal to lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCategory {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
}

impl HabitCategory {
    /// Generate a unique category ID.
    /// Format: category::<uuid-v4>
    pub fn generate_id() -> String {
        format!("category::{}", Uuid::new_v4())
    }
}
