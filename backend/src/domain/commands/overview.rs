//! Query types for the habit overview.

use chrono::NaiveDate;
use shared::HabitSortOption;

/// Parameters of one habit-overview rendering: which day, which list,
/// whether archived habits show, and the sort order. This tuple is also
/// the overview cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverviewQuery {
    pub date: NaiveDate,
    /// `None` means all habits regardless of list
    pub list_id: Option<String>,
    pub include_archived: bool,
    pub sort: HabitSortOption,
}

impl OverviewQuery {
    /// Overview of every habit on `date` with the default sort.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            list_id: None,
            include_archived: false,
            sort: HabitSortOption::default(),
        }
    }
}
