//! The habit overview: the filtered, decorated, sorted habit collection
//! a frontend renders for one day.
//!
//! Building a summary touches every subsystem (recurrence, completions,
//! statistics), so results are kept in a single cache keyed by the full
//! query tuple. The cache is invalidated wholesale whenever any habit or
//! completion mutation is published on the event bus; correctness comes
//! first, recomputation is cheap at personal-data scale.

use anyhow::Result;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::commands::habits::HabitListQuery;
use crate::domain::commands::overview::OverviewQuery;
use crate::domain::completion_service::CompletionService;
use crate::domain::events::{DomainEvent, EventBus};
use crate::domain::habit_service::HabitService;
use crate::domain::models::habit::Intensity;
use crate::domain::recurrence::{effective_pattern, is_active, next_occurrence_label};
use crate::domain::stats_service::StatsService;
use crate::storage::csv::CsvConnection;
use shared::{HabitSortOption, HabitSummary, IntensityLevel};

type OverviewCache = Arc<Mutex<HashMap<OverviewQuery, Vec<HabitSummary>>>>;

/// Service assembling the per-day habit overview.
#[derive(Clone)]
pub struct OverviewService {
    habit_service: HabitService,
    completion_service: CompletionService,
    stats_service: StatsService<CsvConnection>,
    cache: OverviewCache,
}

impl OverviewService {
    /// Create the service and hook its cache invalidation into the bus.
    pub fn new(
        habit_service: HabitService,
        completion_service: CompletionService,
        stats_service: StatsService<CsvConnection>,
        events: &EventBus,
    ) -> Self {
        let cache: OverviewCache = Arc::new(Mutex::new(HashMap::new()));

        let invalidated = cache.clone();
        events.subscribe(move |event| {
            let stale = matches!(
                event,
                DomainEvent::HabitCreated { .. }
                    | DomainEvent::HabitUpdated { .. }
                    | DomainEvent::HabitDeleted { .. }
                    | DomainEvent::HabitsReordered { .. }
                    | DomainEvent::HabitToggled { .. }
                    | DomainEvent::HabitCompleted { .. }
            );
            if stale {
                debug!("Overview cache invalidated by {:?}", event);
                invalidated.lock().expect("overview cache lock poisoned").clear();
            }
        });

        Self {
            habit_service,
            completion_service,
            stats_service,
            cache,
        }
    }

    /// Habits active on the queried day, decorated and sorted.
    pub fn habit_overview(&self, query: OverviewQuery) -> Result<Vec<HabitSummary>> {
        if let Some(cached) = self
            .cache
            .lock()
            .expect("overview cache lock poisoned")
            .get(&query)
        {
            debug!("Overview cache hit for {:?}", query);
            return Ok(cached.clone());
        }

        let summaries = self.build_overview(&query)?;
        self.cache
            .lock()
            .expect("overview cache lock poisoned")
            .insert(query, summaries.clone());
        Ok(summaries)
    }

    /// Number of cached overview variants.
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().expect("overview cache lock poisoned").len()
    }

    fn build_overview(&self, query: &OverviewQuery) -> Result<Vec<HabitSummary>> {
        let habits = self.habit_service.list_habits(HabitListQuery {
            include_archived: query.include_archived,
            list_id: query.list_id.clone(),
        })?;

        // (summary, completion rate, recency score) so the sort below can
        // use figures the DTO does not carry
        let mut decorated: Vec<(HabitSummary, f64, f64)> = Vec::new();
        for habit in habits {
            let index = self.completion_service.completion_index(&habit.id)?;
            if !is_active(&habit, query.date, &index) {
                continue;
            }
            let streak = self.stats_service.current_streak(&habit, query.date)?;
            let rate = self.stats_service.completion_rate(&habit, 30, query.date)?;
            let score = self.stats_service.recent_completion_score(&habit, query.date)?;

            let schedule_label = effective_pattern(&habit.patterns, query.date)
                .map(|p| p.schedule.label())
                .unwrap_or_else(|| "Not scheduled".to_string());
            let summary = HabitSummary {
                id: habit.id.clone(),
                name: habit.name.clone(),
                description: habit.description.clone(),
                icon: habit.icon.clone(),
                color: habit.color.clone(),
                start_date: habit.start_date.format("%Y-%m-%d").to_string(),
                is_bad_habit: habit.is_bad_habit,
                intensity: intensity_to_dto(habit.intensity),
                order: habit.order,
                is_archived: habit.is_archived,
                list_id: habit.list_id.clone(),
                category_id: habit.category_id.clone(),
                active: true,
                completed: index.is_completed(query.date),
                next_occurrence: next_occurrence_label(&habit, query.date, &index),
                schedule_label,
                current_streak: streak,
            };
            decorated.push((summary, rate, score));
        }

        sort_overview(&mut decorated, query.sort);
        Ok(decorated.into_iter().map(|(summary, _, _)| summary).collect())
    }
}

fn sort_overview(entries: &mut [(HabitSummary, f64, f64)], sort: HabitSortOption) {
    match sort {
        // Repository order is already (scope, manual order)
        HabitSortOption::Custom => {}
        HabitSortOption::NameAscending => {
            entries.sort_by(|a, b| a.0.name.to_lowercase().cmp(&b.0.name.to_lowercase()));
        }
        HabitSortOption::NameDescending => {
            entries.sort_by(|a, b| b.0.name.to_lowercase().cmp(&a.0.name.to_lowercase()));
        }
        HabitSortOption::Streak => {
            entries.sort_by(|a, b| b.0.current_streak.cmp(&a.0.current_streak));
        }
        HabitSortOption::CompletionRate => {
            entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        }
        HabitSortOption::RecentCompletion => {
            entries.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
        }
    }
}

fn intensity_to_dto(intensity: Intensity) -> IntensityLevel {
    match intensity {
        Intensity::Light => IntensityLevel::Light,
        Intensity::Moderate => IntensityLevel::Moderate,
        Intensity::High => IntensityLevel::High,
        Intensity::Extreme => IntensityLevel::Extreme,
    }
}
