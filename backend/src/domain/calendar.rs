//! Calendar domain logic.
//!
//! Builds the month-grid view model frontends render: leading padding
//! cells, one cell per day carrying the per-habit due/completed/overdue
//! statuses, and trailing padding to square off the final week. The grid
//! is Monday-first. Navigation focus (which month is showing) lives here
//! too, in memory only; it is UI state, not model state.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use log::info;
use std::sync::{Arc, Mutex};

use crate::domain::commands::habits::HabitListQuery;
use crate::domain::completion_service::CompletionService;
use crate::domain::events::{DomainEvent, EventBus};
use crate::domain::habit_service::HabitService;
use crate::domain::models::completion::CompletionIndex;
use crate::domain::models::habit::Habit;
use crate::domain::recurrence::{is_active, is_due};
use shared::{CalendarDay, CalendarDayType, CalendarFocusDate, CalendarMonth, HabitDayStatus};

/// Calendar service holding navigation focus and building month grids.
#[derive(Clone)]
pub struct CalendarService {
    /// Current focus for calendar navigation (month/year only), kept in
    /// memory and not persisted
    focus: Arc<Mutex<CalendarFocusDate>>,
    events: EventBus,
}

impl CalendarService {
    pub fn new(events: EventBus) -> Self {
        Self {
            focus: Arc::new(Mutex::new(CalendarFocusDate::default())),
            events,
        }
    }

    pub fn focus(&self) -> CalendarFocusDate {
        self.focus.lock().expect("calendar focus lock poisoned").clone()
    }

    pub fn set_focus(&self, month: u32, year: i32) -> Result<CalendarFocusDate> {
        if !(1..=12).contains(&month) {
            return Err(anyhow::anyhow!("Invalid month: {}", month));
        }
        let focus = CalendarFocusDate { month, year };
        *self.focus.lock().expect("calendar focus lock poisoned") = focus.clone();
        self.events.publish(&DomainEvent::CalendarRangeChanged { month, year });
        Ok(focus)
    }

    /// Step the focus forward or backward by whole months.
    pub fn step_month(&self, delta: i32) -> Result<CalendarFocusDate> {
        let current = self.focus();
        let zero_based = current.year * 12 + current.month as i32 - 1 + delta;
        let (year, month) = (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1);
        self.set_focus(month, year)
    }

    /// Build the focused month's grid from live habit and completion data.
    pub fn focused_month(
        &self,
        habit_service: &HabitService,
        completion_service: &CompletionService,
    ) -> Result<CalendarMonth> {
        let focus = self.focus();
        self.calendar_month(focus.month, focus.year, habit_service, completion_service)
    }

    /// Build a month grid, loading visible habits and their completions.
    pub fn calendar_month(
        &self,
        month: u32,
        year: i32,
        habit_service: &HabitService,
        completion_service: &CompletionService,
    ) -> Result<CalendarMonth> {
        info!("🗓️ Building calendar month {}/{}", month, year);

        let habits = habit_service.list_habits(HabitListQuery::default())?;
        let mut indexed: Vec<(Habit, CompletionIndex)> = Vec::with_capacity(habits.len());
        for habit in habits {
            let index = completion_service.completion_index(&habit.id)?;
            indexed.push((habit, index));
        }
        generate_calendar_month(month, year, &indexed)
    }
}

/// Generate a calendar month view from already-loaded habit data.
pub fn generate_calendar_month(
    month: u32,
    year: i32,
    habits: &[(Habit, CompletionIndex)],
) -> Result<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow::anyhow!("Invalid month: {}/{}", month, year))?;
    let days_in_month = days_in_month(month, year);
    let first_weekday = first.weekday().num_days_from_monday();

    let mut days: Vec<CalendarDay> = Vec::new();
    for _ in 0..first_weekday {
        days.push(padding_day(CalendarDayType::PaddingBefore));
    }

    for day in 1..=days_in_month {
        // Every day of a stored month is representable
        let date = match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => date,
            None => continue,
        };
        let mut statuses: Vec<HabitDayStatus> = Vec::new();
        let mut due_count = 0u32;
        let mut completed_due = 0u32;
        for (habit, index) in habits {
            if !is_active(habit, date, index) {
                continue;
            }
            let due = is_due(habit, date);
            let completed = index.is_completed(date);
            if due {
                due_count += 1;
                if completed {
                    completed_due += 1;
                }
            }
            statuses.push(HabitDayStatus {
                habit_id: habit.id.clone(),
                habit_name: habit.name.clone(),
                color: habit.color.clone(),
                due,
                completed,
                overdue: !due,
            });
        }
        let completion_ratio = if due_count == 0 {
            0.0
        } else {
            completed_due as f64 / due_count as f64
        };
        days.push(CalendarDay {
            day,
            day_type: CalendarDayType::MonthDay,
            habits: statuses,
            completion_ratio,
        });
    }

    while days.len() % 7 != 0 {
        days.push(padding_day(CalendarDayType::PaddingAfter));
    }

    Ok(CalendarMonth {
        month,
        year,
        days,
        first_weekday,
    })
}

fn padding_day(day_type: CalendarDayType) -> CalendarDay {
    CalendarDay {
        day: 0,
        day_type,
        habits: Vec::new(),
        completion_ratio: 0.0,
    }
}

fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}
