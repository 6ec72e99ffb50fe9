//! CSV-backed habit repository.
//!
//! Habits live in `habits.csv`; their repeat-pattern histories live in
//! `patterns.csv` keyed by habit id, with the schedule and tracking
//! payloads JSON-encoded into single columns. Loading a habit always
//! reassembles its full, sorted pattern vector.

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::models::habit::{Habit, Intensity};
use crate::domain::models::repeat_pattern::{RepeatPattern, Schedule, Tracking};
use crate::storage::{HabitStorage, StorageError, StorageResult};

use super::connection::CsvConnection;
use super::{read_rows, write_rows};

const HABITS_FILE: &str = "habits.csv";
const PATTERNS_FILE: &str = "patterns.csv";

#[derive(Debug, Serialize, Deserialize)]
struct HabitRow {
    id: String,
    name: String,
    description: Option<String>,
    icon: String,
    color: String,
    start_date: NaiveDate,
    is_bad_habit: bool,
    intensity: Intensity,
    order: i64,
    is_archived: bool,
    list_id: Option<String>,
    category_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PatternRow {
    habit_id: String,
    effective_from: NaiveDate,
    created_at: DateTime<Utc>,
    follow_up: bool,
    tracking: String,
    schedule: String,
}

/// CSV-backed habit repository.
#[derive(Debug, Clone)]
pub struct HabitRepository {
    connection: CsvConnection,
}

impl HabitRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_habit_rows(&self) -> StorageResult<Vec<HabitRow>> {
        read_rows(&self.connection, HABITS_FILE)
    }

    fn read_pattern_rows(&self) -> StorageResult<Vec<PatternRow>> {
        read_rows(&self.connection, PATTERNS_FILE)
    }

    fn write_habit_rows(&self, rows: &[HabitRow]) -> StorageResult<()> {
        write_rows(&self.connection, HABITS_FILE, rows)
    }

    fn write_pattern_rows(&self, rows: &[PatternRow]) -> StorageResult<()> {
        write_rows(&self.connection, PATTERNS_FILE, rows)
    }

    fn row_from_habit(habit: &Habit) -> HabitRow {
        HabitRow {
            id: habit.id.clone(),
            name: habit.name.clone(),
            description: habit.description.clone(),
            icon: habit.icon.clone(),
            color: habit.color.clone(),
            start_date: habit.start_date,
            is_bad_habit: habit.is_bad_habit,
            intensity: habit.intensity,
            order: habit.order,
            is_archived: habit.is_archived,
            list_id: habit.list_id.clone(),
            category_id: habit.category_id.clone(),
            created_at: habit.created_at,
            updated_at: habit.updated_at,
        }
    }

    fn habit_from_row(row: HabitRow, mut patterns: Vec<RepeatPattern>) -> Habit {
        patterns.sort_by_key(|p| p.effective_from);
        Habit {
            id: row.id,
            name: row.name,
            description: row.description,
            icon: row.icon,
            color: row.color,
            start_date: row.start_date,
            is_bad_habit: row.is_bad_habit,
            intensity: row.intensity,
            order: row.order,
            is_archived: row.is_archived,
            list_id: row.list_id,
            category_id: row.category_id,
            patterns,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn pattern_rows_for(habit: &Habit) -> StorageResult<Vec<PatternRow>> {
        habit
            .patterns
            .iter()
            .map(|pattern| {
                Ok(PatternRow {
                    habit_id: habit.id.clone(),
                    effective_from: pattern.effective_from,
                    created_at: pattern.created_at,
                    follow_up: pattern.follow_up,
                    tracking: serde_json::to_string(&pattern.tracking)?,
                    schedule: serde_json::to_string(&pattern.schedule)?,
                })
            })
            .collect()
    }

    fn pattern_from_row(row: PatternRow) -> Option<RepeatPattern> {
        let tracking: Tracking = match serde_json::from_str(&row.tracking) {
            Ok(tracking) => tracking,
            Err(err) => {
                warn!("Skipping pattern of {} with bad tracking payload: {}", row.habit_id, err);
                return None;
            }
        };
        let schedule: Schedule = match serde_json::from_str(&row.schedule) {
            Ok(schedule) => schedule,
            Err(err) => {
                warn!("Skipping pattern of {} with bad schedule payload: {}", row.habit_id, err);
                return None;
            }
        };
        Some(RepeatPattern {
            effective_from: row.effective_from,
            created_at: row.created_at,
            follow_up: row.follow_up,
            tracking,
            schedule,
        })
    }

    /// Group every stored pattern by habit id.
    fn patterns_by_habit(&self) -> StorageResult<HashMap<String, Vec<RepeatPattern>>> {
        let mut grouped: HashMap<String, Vec<RepeatPattern>> = HashMap::new();
        for row in self.read_pattern_rows()? {
            let habit_id = row.habit_id.clone();
            if let Some(pattern) = Self::pattern_from_row(row) {
                grouped.entry(habit_id).or_default().push(pattern);
            }
        }
        Ok(grouped)
    }

    /// Rewrite the pattern file so `habit`'s history matches its in-memory
    /// vector, leaving other habits' rows untouched.
    fn replace_patterns(&self, habits: &[&Habit]) -> StorageResult<()> {
        let replaced: Vec<&str> = habits.iter().map(|h| h.id.as_str()).collect();
        let mut rows: Vec<PatternRow> = self
            .read_pattern_rows()?
            .into_iter()
            .filter(|row| !replaced.contains(&row.habit_id.as_str()))
            .collect();
        for habit in habits {
            rows.extend(Self::pattern_rows_for(habit)?);
        }
        self.write_pattern_rows(&rows)
    }
}

impl HabitStorage for HabitRepository {
    fn store_habit(&self, habit: &Habit) -> StorageResult<()> {
        let mut rows = self.read_habit_rows()?;
        rows.push(Self::row_from_habit(habit));
        self.write_habit_rows(&rows)?;
        self.replace_patterns(&[habit])
    }

    fn get_habit(&self, habit_id: &str) -> StorageResult<Option<Habit>> {
        let Some(row) = self
            .read_habit_rows()?
            .into_iter()
            .find(|row| row.id == habit_id)
        else {
            return Ok(None);
        };
        let patterns = self
            .patterns_by_habit()?
            .remove(habit_id)
            .unwrap_or_default();
        Ok(Some(Self::habit_from_row(row, patterns)))
    }

    fn list_habits(&self) -> StorageResult<Vec<Habit>> {
        let mut patterns = self.patterns_by_habit()?;
        let mut habits: Vec<Habit> = self
            .read_habit_rows()?
            .into_iter()
            .map(|row| {
                let habit_patterns = patterns.remove(&row.id).unwrap_or_default();
                Self::habit_from_row(row, habit_patterns)
            })
            .collect();
        habits.sort_by(|a, b| (&a.list_id, a.order).cmp(&(&b.list_id, b.order)));
        Ok(habits)
    }

    fn update_habit(&self, habit: &Habit) -> StorageResult<()> {
        let mut rows = self.read_habit_rows()?;
        let row = rows
            .iter_mut()
            .find(|row| row.id == habit.id)
            .ok_or_else(|| StorageError::NotFound {
                entity: "habit",
                id: habit.id.clone(),
            })?;
        *row = Self::row_from_habit(habit);
        self.write_habit_rows(&rows)?;
        self.replace_patterns(&[habit])
    }

    fn update_habits(&self, habits: &[Habit]) -> StorageResult<()> {
        let mut rows = self.read_habit_rows()?;
        for habit in habits {
            let row = rows
                .iter_mut()
                .find(|row| row.id == habit.id)
                .ok_or_else(|| StorageError::NotFound {
                    entity: "habit",
                    id: habit.id.clone(),
                })?;
            *row = Self::row_from_habit(habit);
        }
        self.write_habit_rows(&rows)?;
        let habit_refs: Vec<&Habit> = habits.iter().collect();
        self.replace_patterns(&habit_refs)
    }

    fn delete_habit(&self, habit_id: &str) -> StorageResult<bool> {
        let mut rows = self.read_habit_rows()?;
        let before = rows.len();
        rows.retain(|row| row.id != habit_id);
        if rows.len() == before {
            return Ok(false);
        }
        self.write_habit_rows(&rows)?;

        let pattern_rows: Vec<PatternRow> = self
            .read_pattern_rows()?
            .into_iter()
            .filter(|row| row.habit_id != habit_id)
            .collect();
        self.write_pattern_rows(&pattern_rows)?;
        Ok(true)
    }
}
