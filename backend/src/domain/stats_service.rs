//! Habit statistics: streaks, completion rates, and the recency-weighted
//! completion score.
//!
//! All figures are computed over *due* days only, so an every-3-days
//! habit is never penalized for the days in between. Bad habits invert
//! the success test: a due day without a completion counts as satisfied,
//! and a recorded completion is a lapse.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

use crate::domain::models::completion::CompletionIndex;
use crate::domain::models::habit::Habit;
use crate::domain::recurrence::is_due;
use crate::storage::{CompletionStorage, Connection, HabitStorage};

/// Upper bound on how far streak scans walk back.
const STREAK_LOOKBACK_DAYS: i64 = 1095;

/// Window of the recency-weighted completion score.
const RECENT_SCORE_WINDOW_DAYS: i64 = 30;

/// Weight half-life of the recency score, in days.
const RECENT_SCORE_HALF_LIFE_DAYS: f64 = 7.0;

/// Aggregated statistics for one habit.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitStatistics {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Share of satisfied due days over the trailing 30 days
    pub completion_rate: f64,
    /// Recency-weighted completion score in [0, 1]
    pub recent_score: f64,
}

/// Service computing derived statistics over stored completions.
#[derive(Clone)]
pub struct StatsService<C: Connection> {
    connection: Arc<C>,
}

impl<C: Connection> StatsService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self { connection }
    }

    /// All statistics of one habit as of a reference day.
    pub fn habit_statistics(&self, habit_id: &str, as_of: NaiveDate) -> Result<HabitStatistics> {
        let habit = self
            .connection
            .create_habit_repository()
            .get_habit(habit_id)?
            .ok_or_else(|| anyhow::anyhow!("Habit not found: {}", habit_id))?;
        let index = self.completion_index(&habit)?;
        Ok(HabitStatistics {
            current_streak: current_streak_in(&habit, as_of, &index),
            longest_streak: longest_streak_in(&habit, as_of, &index),
            completion_rate: completion_rate_in(&habit, 30, as_of, &index),
            recent_score: recent_score_in(&habit, as_of, &index),
        })
    }

    /// Consecutive satisfied due days ending at `as_of`. A good habit's
    /// still-pending `as_of` neither counts nor breaks the run.
    pub fn current_streak(&self, habit: &Habit, as_of: NaiveDate) -> Result<u32> {
        let index = self.completion_index(habit)?;
        Ok(current_streak_in(habit, as_of, &index))
    }

    pub fn longest_streak(&self, habit: &Habit, as_of: NaiveDate) -> Result<u32> {
        let index = self.completion_index(habit)?;
        Ok(longest_streak_in(habit, as_of, &index))
    }

    /// Share of satisfied due days within the trailing window; 0 when no
    /// day was due.
    pub fn completion_rate(&self, habit: &Habit, window_days: u32, as_of: NaiveDate) -> Result<f64> {
        let index = self.completion_index(habit)?;
        Ok(completion_rate_in(habit, window_days, as_of, &index))
    }

    /// Exponentially-weighted completion score over the trailing 30 days
    /// of due days: recent days dominate with a 7-day half-life.
    pub fn recent_completion_score(&self, habit: &Habit, reference: NaiveDate) -> Result<f64> {
        let index = self.completion_index(habit)?;
        Ok(recent_score_in(habit, reference, &index))
    }

    fn completion_index(&self, habit: &Habit) -> Result<CompletionIndex> {
        let completions = self
            .connection
            .create_completion_repository()
            .list_completions(&habit.id)?;
        Ok(CompletionIndex::from_completions(&completions))
    }
}

fn satisfied(habit: &Habit, day: NaiveDate, index: &CompletionIndex) -> bool {
    if habit.is_bad_habit {
        !index.is_completed(day)
    } else {
        index.is_completed(day)
    }
}

fn current_streak_in(habit: &Habit, as_of: NaiveDate, index: &CompletionIndex) -> u32 {
    let floor = habit.start_date.max(as_of - Duration::days(STREAK_LOOKBACK_DAYS));
    let mut streak = 0;
    let mut day = as_of;
    while day >= floor {
        if is_due(habit, day) {
            if satisfied(habit, day, index) {
                streak += 1;
            } else if day == as_of && !habit.is_bad_habit {
                // Today is still pending
            } else {
                break;
            }
        }
        day = match day.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }
    streak
}

fn longest_streak_in(habit: &Habit, as_of: NaiveDate, index: &CompletionIndex) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut day = habit.start_date.max(as_of - Duration::days(STREAK_LOOKBACK_DAYS));
    while day <= as_of {
        if is_due(habit, day) {
            if satisfied(habit, day, index) {
                run += 1;
                longest = longest.max(run);
            } else if day == as_of && !habit.is_bad_habit {
                // Pending today leaves the current run intact
            } else {
                run = 0;
            }
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    longest
}

fn completion_rate_in(
    habit: &Habit,
    window_days: u32,
    as_of: NaiveDate,
    index: &CompletionIndex,
) -> f64 {
    let window_start = as_of - Duration::days(window_days.saturating_sub(1) as i64);
    let mut day = habit.start_date.max(window_start);
    let mut due = 0u32;
    let mut done = 0u32;
    while day <= as_of {
        if is_due(habit, day) {
            due += 1;
            if satisfied(habit, day, index) {
                done += 1;
            }
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    if due == 0 {
        0.0
    } else {
        done as f64 / due as f64
    }
}

fn recent_score_in(habit: &Habit, reference: NaiveDate, index: &CompletionIndex) -> f64 {
    let window_start =
        habit.start_date.max(reference - Duration::days(RECENT_SCORE_WINDOW_DAYS - 1));
    let mut day = window_start;
    let mut total_weight = 0.0;
    let mut satisfied_weight = 0.0;
    while day <= reference {
        if is_due(habit, day) {
            let age = (reference - day).num_days() as f64;
            let weight = 0.5_f64.powf(age / RECENT_SCORE_HALF_LIFE_DAYS);
            total_weight += weight;
            if satisfied(habit, day, index) {
                satisfied_weight += weight;
            }
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    if total_weight == 0.0 {
        0.0
    } else {
        satisfied_weight / total_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::completion::Completion;
    use crate::domain::models::habit::Intensity;
    use crate::domain::models::repeat_pattern::{RepeatPattern, Schedule};
    use crate::storage::csv::CsvConnection;
    use chrono::Utc;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit_with_schedule(start: NaiveDate, schedule: Schedule, bad: bool) -> Habit {
        Habit {
            id: Habit::generate_id(),
            name: "Test".to_string(),
            description: None,
            icon: "star".to_string(),
            color: "#4A90D9".to_string(),
            start_date: start,
            is_bad_habit: bad,
            intensity: Intensity::default(),
            order: 0,
            is_archived: false,
            list_id: None,
            category_id: None,
            patterns: vec![RepeatPattern::new(start, schedule)],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn index_of(days: &[NaiveDate]) -> CompletionIndex {
        let completions: Vec<Completion> =
            days.iter().map(|d| Completion::new("habit::test", *d, true)).collect();
        CompletionIndex::from_completions(&completions)
    }

    #[test]
    fn test_current_streak_over_due_days_only() {
        let habit = habit_with_schedule(date(2024, 1, 1), Schedule::every_n_days(3), false);
        let index = index_of(&[date(2024, 1, 1), date(2024, 1, 4)]);

        // Jan 7 is due but still pending; the two earlier due days count
        assert_eq!(current_streak_in(&habit, date(2024, 1, 7), &index), 2);
        // Off-schedule day in between does not break anything
        assert_eq!(current_streak_in(&habit, date(2024, 1, 6), &index), 2);

        let index = index_of(&[date(2024, 1, 1), date(2024, 1, 4), date(2024, 1, 7)]);
        assert_eq!(current_streak_in(&habit, date(2024, 1, 7), &index), 3);
    }

    #[test]
    fn test_current_streak_breaks_on_missed_day() {
        let habit = habit_with_schedule(date(2024, 1, 1), Schedule::every_n_days(3), false);
        // Jan 4 missed
        let index = index_of(&[date(2024, 1, 1), date(2024, 1, 7)]);
        assert_eq!(current_streak_in(&habit, date(2024, 1, 7), &index), 1);
    }

    #[test]
    fn test_bad_habit_streak_counts_untouched_days() {
        let habit = habit_with_schedule(date(2024, 1, 1), Schedule::daily(), true);
        // Lapsed on Jan 3
        let index = index_of(&[date(2024, 1, 3)]);
        assert_eq!(current_streak_in(&habit, date(2024, 1, 5), &index), 2);
        assert_eq!(longest_streak_in(&habit, date(2024, 1, 5), &index), 2);
    }

    #[test]
    fn test_longest_streak_spans_gaps() {
        let habit = habit_with_schedule(date(2024, 1, 1), Schedule::daily(), false);
        // Four days done, Jan 5 missed, two days done
        let index = index_of(&[
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 4),
            date(2024, 1, 6),
            date(2024, 1, 7),
        ]);
        assert_eq!(longest_streak_in(&habit, date(2024, 1, 7), &index), 4);
        assert_eq!(current_streak_in(&habit, date(2024, 1, 7), &index), 2);
    }

    #[test]
    fn test_completion_rate_counts_due_days_only() {
        let habit = habit_with_schedule(date(2024, 1, 1), Schedule::every_n_days(3), false);
        // Due days in the window: 1, 4, 7, 10; two of four done
        let index = index_of(&[date(2024, 1, 1), date(2024, 1, 7)]);
        let rate = completion_rate_in(&habit, 10, date(2024, 1, 10), &index);
        assert!((rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_completion_rate_zero_when_nothing_due() {
        let habit = habit_with_schedule(date(2024, 6, 1), Schedule::daily(), false);
        let index = CompletionIndex::default();
        assert_eq!(completion_rate_in(&habit, 30, date(2024, 1, 15), &index), 0.0);
    }

    #[test]
    fn test_recent_score_weighs_recent_days_heavier() {
        let habit = habit_with_schedule(date(2024, 1, 1), Schedule::daily(), false);
        let reference = date(2024, 1, 30);

        let all_days: Vec<NaiveDate> =
            (0..30).map(|offset| date(2024, 1, 1) + Duration::days(offset)).collect();

        // Same number of misses, but one missed yesterday and one missed
        // four weeks ago
        let missed_recently: Vec<NaiveDate> =
            all_days.iter().copied().filter(|d| *d != date(2024, 1, 29)).collect();
        let missed_long_ago: Vec<NaiveDate> =
            all_days.iter().copied().filter(|d| *d != date(2024, 1, 2)).collect();

        let recent = recent_score_in(&habit, reference, &index_of(&missed_recently));
        let old = recent_score_in(&habit, reference, &index_of(&missed_long_ago));
        assert!(recent < old);
        assert!(old < 1.0);

        let perfect = recent_score_in(&habit, reference, &index_of(&all_days));
        assert!((perfect - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_habit_statistics_loads_from_storage() {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let service = StatsService::new(connection.clone());

        let habit = habit_with_schedule(date(2024, 1, 1), Schedule::daily(), false);
        connection.create_habit_repository().store_habit(&habit).unwrap();
        let completions = connection.create_completion_repository();
        for offset in 0..3 {
            completions
                .upsert_completion(&Completion::new(
                    &habit.id,
                    date(2024, 1, 1) + Duration::days(offset),
                    true,
                ))
                .unwrap();
        }

        let stats = service.habit_statistics(&habit.id, date(2024, 1, 3)).unwrap();
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
        assert!((stats.completion_rate - 1.0).abs() < 1e-9);
        assert!((stats.recent_score - 1.0).abs() < 1e-9);

        assert!(service.habit_statistics("habit::missing", date(2024, 1, 3)).is_err());
    }
}
