//! Domain model for repeat patterns.
//!
//! A habit owns an ordered history of repeat patterns. Each pattern is a
//! versioned recurrence rule: the pattern with the latest `effective_from`
//! at or before a given date governs that date. Editing a habit's schedule
//! appends a new pattern instead of mutating the old one, so past days keep
//! evaluating under the rules that applied back then.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A time-scoped recurrence rule version attached to a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatPattern {
    /// First date this pattern version governs
    pub effective_from: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// When set, a missed due day keeps the habit active on every
    /// following day until a completion is recorded
    pub follow_up: bool,
    pub tracking: Tracking,
    pub schedule: Schedule,
}

impl RepeatPattern {
    /// A plain once-per-day pattern for the given schedule.
    pub fn new(effective_from: NaiveDate, schedule: Schedule) -> Self {
        Self {
            effective_from,
            created_at: Utc::now(),
            follow_up: false,
            tracking: Tracking::default(),
            schedule,
        }
    }
}

/// How progress on an active day is measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tracking {
    /// Check off the habit a fixed number of times per day
    Repetitions { per_day: u32 },
    /// Log time spent, in minutes
    Duration { minutes: u32 },
    /// Log an amount against a target ("2.0 liters")
    Quantity { target: f64, unit: String },
}

impl Default for Tracking {
    fn default() -> Self {
        Tracking::Repetitions { per_day: 1 }
    }
}

/// The recurrence rule itself. Exactly one goal kind per pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Schedule {
    Daily(DailyGoal),
    Weekly(WeeklyGoal),
    Monthly(MonthlyGoal),
}

/// Day-granularity recurrence: every day, every Nth day, or fixed weekdays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub every_day: bool,
    /// Every Nth day counted from the habit's start date; 0 behaves as 1
    pub days_interval: u32,
    /// Monday..Sunday flags
    pub specific_days: [bool; 7],
}

/// Week-granularity recurrence: fixed weekdays within every Nth week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub every_week: bool,
    /// Every Nth ISO week counted from the start date's week; 0 behaves as 1
    pub week_interval: u32,
    /// Monday..Sunday flags
    pub specific_days: [bool; 7],
}

/// Month-granularity recurrence: fixed days of month within every Nth month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGoal {
    pub every_month: bool,
    /// Every Nth month counted from the start date's month; 0 behaves as 1
    pub month_interval: u32,
    /// Day-of-month flags, index 0 = day 1. Days 29-31 resolve to the
    /// last day of shorter months.
    #[serde(with = "month_days")]
    pub specific_days: [bool; 31],
}

impl Schedule {
    /// Every-day shorthand used by habit creation defaults.
    pub fn daily() -> Self {
        Schedule::Daily(DailyGoal {
            every_day: true,
            days_interval: 1,
            specific_days: [false; 7],
        })
    }

    /// Every Nth day counted from the habit's start date.
    pub fn every_n_days(interval: u32) -> Self {
        Schedule::Daily(DailyGoal {
            every_day: false,
            days_interval: interval,
            specific_days: [false; 7],
        })
    }

    /// Fixed weekdays, every week.
    pub fn on_weekdays(days: &[Weekday]) -> Self {
        Schedule::Daily(DailyGoal {
            every_day: false,
            days_interval: 1,
            specific_days: weekday_flags(days),
        })
    }

    /// Fixed weekdays within every Nth week.
    pub fn weekly_on(days: &[Weekday], week_interval: u32) -> Self {
        Schedule::Weekly(WeeklyGoal {
            every_week: week_interval <= 1,
            week_interval: week_interval.max(1),
            specific_days: weekday_flags(days),
        })
    }

    /// Fixed days of the month within every Nth month. Out-of-range day
    /// numbers are ignored.
    pub fn monthly_on(days: &[u32], month_interval: u32) -> Self {
        let mut flags = [false; 31];
        for day in days {
            if (1..=31).contains(day) {
                flags[(day - 1) as usize] = true;
            }
        }
        Schedule::Monthly(MonthlyGoal {
            every_month: month_interval <= 1,
            month_interval: month_interval.max(1),
            specific_days: flags,
        })
    }

    /// Human label for display, e.g. "Every 3 days" or "Monthly on day 1, 15".
    pub fn label(&self) -> String {
        match self {
            Schedule::Daily(goal) => {
                if goal.every_day {
                    return "Every day".to_string();
                }
                if goal.specific_days.iter().any(|d| *d) {
                    return weekday_list(&goal.specific_days);
                }
                match goal.days_interval {
                    0 | 1 => "Every day".to_string(),
                    2 => "Every other day".to_string(),
                    n => format!("Every {} days", n),
                }
            }
            Schedule::Weekly(goal) => {
                let days = weekday_list(&goal.specific_days);
                if goal.every_week || goal.week_interval <= 1 {
                    format!("Weekly on {}", days)
                } else {
                    format!("Every {} weeks on {}", goal.week_interval, days)
                }
            }
            Schedule::Monthly(goal) => {
                let days: Vec<String> = goal
                    .specific_days
                    .iter()
                    .enumerate()
                    .filter(|(_, flagged)| **flagged)
                    .map(|(index, _)| (index + 1).to_string())
                    .collect();
                let days = days.join(", ");
                if goal.every_month || goal.month_interval <= 1 {
                    format!("Monthly on day {}", days)
                } else {
                    format!("Every {} months on day {}", goal.month_interval, days)
                }
            }
        }
    }
}

fn weekday_flags(days: &[Weekday]) -> [bool; 7] {
    let mut flags = [false; 7];
    for day in days {
        flags[day.num_days_from_monday() as usize] = true;
    }
    flags
}

fn weekday_list(flags: &[bool; 7]) -> String {
    const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let names: Vec<&str> = flags
        .iter()
        .enumerate()
        .filter(|(_, flagged)| **flagged)
        .map(|(index, _)| NAMES[index])
        .collect();
    names.join(", ")
}

/// Serde helper: persist the 31 day flags as a `Vec<bool>` so the CSV/JSON
/// form stays readable, tolerating shorter vectors from older files.
mod month_days {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(days: &[bool; 31], serializer: S) -> Result<S::Ok, S::Error> {
        days.to_vec().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[bool; 31], D::Error> {
        let values = Vec::<bool>::deserialize(deserializer)?;
        let mut days = [false; 31];
        for (index, value) in values.into_iter().take(31).enumerate() {
            days[index] = value;
        }
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_labels() {
        assert_eq!(Schedule::daily().label(), "Every day");
        assert_eq!(Schedule::every_n_days(2).label(), "Every other day");
        assert_eq!(Schedule::every_n_days(3).label(), "Every 3 days");
        assert_eq!(
            Schedule::on_weekdays(&[Weekday::Mon, Weekday::Fri]).label(),
            "Mon, Fri"
        );
        assert_eq!(
            Schedule::weekly_on(&[Weekday::Tue], 2).label(),
            "Every 2 weeks on Tue"
        );
        assert_eq!(Schedule::monthly_on(&[1, 15], 1).label(), "Monthly on day 1, 15");
    }

    #[test]
    fn test_monthly_goal_serde_round_trip() {
        let schedule = Schedule::monthly_on(&[1, 31], 2);
        let json = serde_json::to_string(&schedule).unwrap();
        let parsed: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schedule);
    }

    #[test]
    fn test_monthly_goal_ignores_out_of_range_days() {
        let Schedule::Monthly(goal) = Schedule::monthly_on(&[0, 15, 32], 1) else {
            panic!("expected monthly schedule");
        };
        assert!(goal.specific_days[14]);
        assert_eq!(goal.specific_days.iter().filter(|d| **d).count(), 1);
    }
}
