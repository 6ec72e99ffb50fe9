use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A habit as presented to the UI, combining stored fields with state
/// derived for a specific day (active, completed, streak, next occurrence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Icon identifier (SF Symbol / asset name, opaque to the backend)
    pub icon: String,
    /// Display color as a hex string, e.g. "#4A90D9"
    pub color: String,
    /// First day the habit can be scheduled (ISO 8601, YYYY-MM-DD)
    pub start_date: String,
    /// Bad habits invert streak semantics: a streak day is a day without a completion
    pub is_bad_habit: bool,
    pub intensity: IntensityLevel,
    /// Position within the current scope (all habits or the owning list)
    pub order: i64,
    pub is_archived: bool,
    pub list_id: Option<String>,
    pub category_id: Option<String>,
    /// Whether the habit is scheduled (or carried over by follow-up) on the requested day
    pub active: bool,
    /// Whether a completion exists for the requested day
    pub completed: bool,
    /// Human label for the next uncompleted occurrence ("Today", "Tomorrow", "Friday", "12. March")
    pub next_occurrence: String,
    /// Human label for the governing schedule ("Every day", "Every 3 days", ...)
    pub schedule_label: String,
    pub current_streak: u32,
}

/// Intensity attached to a habit, used for display weighting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntensityLevel {
    Light,
    Moderate,
    High,
    Extreme,
}

impl Default for IntensityLevel {
    fn default() -> Self {
        IntensityLevel::Moderate
    }
}

/// Sort orders a frontend can request for the habit overview.
///
/// The string forms are stable because the selected option is persisted
/// in the preferences file between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitSortOption {
    /// Alphabetical by name, A first
    NameAscending,
    /// Alphabetical by name, Z first
    NameDescending,
    /// The user's manually arranged order
    Custom,
    /// Longest current streak first
    Streak,
    /// Highest all-window completion rate first
    CompletionRate,
    /// Highest recency-weighted completion score first
    RecentCompletion,
}

impl Default for HabitSortOption {
    fn default() -> Self {
        HabitSortOption::Custom
    }
}

impl fmt::Display for HabitSortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HabitSortOption::NameAscending => "ascending",
            HabitSortOption::NameDescending => "descending",
            HabitSortOption::Custom => "custom",
            HabitSortOption::Streak => "streak",
            HabitSortOption::CompletionRate => "completion",
            HabitSortOption::RecentCompletion => "recentCompletion",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for HabitSortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" => Ok(HabitSortOption::NameAscending),
            "descending" => Ok(HabitSortOption::NameDescending),
            "custom" => Ok(HabitSortOption::Custom),
            "streak" => Ok(HabitSortOption::Streak),
            "completion" => Ok(HabitSortOption::CompletionRate),
            "recentCompletion" => Ok(HabitSortOption::RecentCompletion),
            other => Err(format!("Unknown sort option: {}", other)),
        }
    }
}

/// A habit list as presented to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitListSummary {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub order: i64,
    /// Number of non-archived habits in the list
    pub habit_count: usize,
}

/// Type of calendar day for explicit rendering logic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CalendarDayType {
    /// Empty padding day before the start of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Empty padding day after the end of the month (grid alignment)
    PaddingAfter,
}

/// Per-habit state for a single calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitDayStatus {
    pub habit_id: String,
    pub habit_name: String,
    pub color: String,
    /// Scheduled on this day by the governing repeat pattern
    pub due: bool,
    pub completed: bool,
    /// Active only because an earlier due day was missed (follow-up carry-over)
    pub overdue: bool,
}

/// Represents a single day in the calendar grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    /// Day of month, 0 for padding cells
    pub day: u32,
    pub day_type: CalendarDayType,
    pub habits: Vec<HabitDayStatus>,
    /// Completed due habits / due habits, 0.0 when nothing is due
    pub completion_ratio: f64,
}

/// A calendar month with per-day habit statuses, laid out for a
/// Monday-first week grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: u32,
    pub days: Vec<CalendarDay>,
    /// Weekday of the 1st, 0 = Monday .. 6 = Sunday
    pub first_weekday: u32,
}

/// The current focus of calendar navigation (month/year only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarFocusDate {
    pub month: u32,
    pub year: i32,
}

impl Default for CalendarFocusDate {
    fn default() -> Self {
        let now = chrono::Local::now();
        Self {
            month: now.month(),
            year: now.year(),
        }
    }
}
