//! Repeat-pattern evaluation.
//!
//! This module contains the scheduling logic every other part of the
//! backend leans on: deciding whether a habit is due or active on a date,
//! which pattern version governs that date, and when the next occurrence
//! falls. All functions are pure and synchronous; callers supply the
//! habit and its completion index.
//!
//! ## Rules
//!
//! - No date before the habit's start date is ever active.
//! - The governing pattern for a date is the one with the latest
//!   `effective_from` at or before it. Dates with no governing pattern
//!   are inactive; a malformed pattern never raises an error.
//! - Interval counting is anchored at the habit's start date: "every 3
//!   days" means start, start+3, start+6, regardless of when the pattern
//!   version was created.
//! - With `follow_up` set, a missed due day keeps the habit active on
//!   every later day until some completion on or after that due day
//!   settles it.

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::models::completion::CompletionIndex;
use crate::domain::models::habit::Habit;
use crate::domain::models::repeat_pattern::{
    DailyGoal, MonthlyGoal, RepeatPattern, Schedule, WeeklyGoal,
};

/// How far ahead `next_occurrence` scans.
pub const NEXT_OCCURRENCE_HORIZON_DAYS: i64 = 30;

/// How far back the follow-up rule searches for a missed due day.
const FOLLOW_UP_LOOKBACK_DAYS: i64 = 366;

/// The pattern version governing `date`: latest `effective_from` <= date.
/// Relies on the habit's pattern history being sorted ascending.
pub fn effective_pattern(patterns: &[RepeatPattern], date: NaiveDate) -> Option<&RepeatPattern> {
    let index = patterns.partition_point(|p| p.effective_from <= date);
    if index == 0 {
        None
    } else {
        Some(&patterns[index - 1])
    }
}

/// Whether `date` is a scheduled day under the habit's governing pattern,
/// ignoring follow-up carry-over.
pub fn is_due(habit: &Habit, date: NaiveDate) -> bool {
    if date < habit.start_date {
        return false;
    }
    let Some(pattern) = effective_pattern(&habit.patterns, date) else {
        return false;
    };
    schedule_matches(&pattern.schedule, habit.start_date, date)
}

/// Whether the habit is active on `date`: due, or carried over by the
/// follow-up rule from an unsettled earlier due day.
pub fn is_active(habit: &Habit, date: NaiveDate, completions: &CompletionIndex) -> bool {
    if is_due(habit, date) {
        return true;
    }
    let Some(pattern) = effective_pattern(&habit.patterns, date) else {
        return false;
    };
    if !pattern.follow_up {
        return false;
    }
    match most_recent_due_before(habit, date) {
        Some(due_day) => !completions.any_completed_in(due_day, date),
        None => false,
    }
}

/// The first date at or after `from` that is active and not yet completed,
/// within a bounded horizon.
pub fn next_occurrence(
    habit: &Habit,
    from: NaiveDate,
    completions: &CompletionIndex,
) -> Option<NaiveDate> {
    (0..=NEXT_OCCURRENCE_HORIZON_DAYS)
        .map(|offset| from + Duration::days(offset))
        .find(|date| is_active(habit, *date, completions) && !completions.is_completed(*date))
}

/// Human label for the next occurrence: "Today", "Tomorrow", a weekday
/// name within the coming week, "12. March" beyond that, or
/// "Not scheduled" when the scan finds nothing.
pub fn next_occurrence_label(
    habit: &Habit,
    from: NaiveDate,
    completions: &CompletionIndex,
) -> String {
    let Some(date) = next_occurrence(habit, from, completions) else {
        return "Not scheduled".to_string();
    };
    match (date - from).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        2..=6 => date.format("%A").to_string(),
        _ => format!("{}. {}", date.day(), date.format("%B")),
    }
}

fn schedule_matches(schedule: &Schedule, anchor: NaiveDate, date: NaiveDate) -> bool {
    match schedule {
        Schedule::Daily(goal) => daily_matches(goal, anchor, date),
        Schedule::Weekly(goal) => weekly_matches(goal, anchor, date),
        Schedule::Monthly(goal) => monthly_matches(goal, anchor, date),
    }
}

fn daily_matches(goal: &DailyGoal, anchor: NaiveDate, date: NaiveDate) -> bool {
    if goal.every_day {
        return true;
    }
    if goal.days_interval > 1 {
        let days_since = (date - anchor).num_days();
        return days_since % goal.days_interval as i64 == 0;
    }
    if goal.specific_days.iter().any(|d| *d) {
        return goal.specific_days[date.weekday().num_days_from_monday() as usize];
    }
    // Interval of 0 or 1 with no day selection behaves like every day
    true
}

fn weekly_matches(goal: &WeeklyGoal, anchor: NaiveDate, date: NaiveDate) -> bool {
    if !goal.specific_days.iter().any(|d| *d) {
        return false;
    }
    if !goal.specific_days[date.weekday().num_days_from_monday() as usize] {
        return false;
    }
    if goal.every_week || goal.week_interval <= 1 {
        return true;
    }
    let weeks_since = (week_start(date) - week_start(anchor)).num_days() / 7;
    weeks_since % goal.week_interval as i64 == 0
}

fn monthly_matches(goal: &MonthlyGoal, anchor: NaiveDate, date: NaiveDate) -> bool {
    if !goal.specific_days.iter().any(|d| *d) {
        return false;
    }
    if !goal.every_month && goal.month_interval > 1 {
        let months_since = month_number(date) - month_number(anchor);
        if months_since % goal.month_interval as i64 != 0 {
            return false;
        }
    }
    let last_day = last_day_of_month(date.year(), date.month());
    goal.specific_days
        .iter()
        .enumerate()
        .filter(|(_, flagged)| **flagged)
        .any(|(index, _)| (index as u32 + 1).min(last_day) == date.day())
}

/// Most recent due day strictly before `date`, bounded so a sparse or
/// stale pattern cannot send the scan back indefinitely.
fn most_recent_due_before(habit: &Habit, date: NaiveDate) -> Option<NaiveDate> {
    (1..=FOLLOW_UP_LOOKBACK_DAYS)
        .map(|offset| date - Duration::days(offset))
        .take_while(|day| *day >= habit.start_date)
        .find(|day| is_due(habit, *day))
}

/// Monday of the ISO week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn month_number(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}
