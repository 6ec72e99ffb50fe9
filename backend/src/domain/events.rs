//! In-process event bus.
//!
//! Cross-view invalidation in the original application ran over the
//! platform's notification center. Here the same role is played by a
//! small synchronous publish/subscribe bus: services publish after
//! every mutation, and derived-state holders (the overview cache, any
//! embedding UI) subscribe to know when to refresh.
//!
//! The bus is a `Clone` handle over shared state and is injected into
//! services rather than reached through a global.

use chrono::NaiveDate;
use log::debug;
use std::sync::{Arc, Mutex};

/// Everything that can change observable model state.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    HabitCreated { habit_id: String },
    HabitUpdated { habit_id: String },
    HabitDeleted { habit_id: String },
    /// Manual order rewritten within one scope; `None` is the unlisted scope
    HabitsReordered { list_id: Option<String> },
    /// A (habit, day) completion flipped; `completed` is the new state
    HabitToggled { habit_id: String, date: NaiveDate, completed: bool },
    /// A toggle or set landed on completed
    HabitCompleted { habit_id: String, date: NaiveDate },
    /// The user switched tabs; -1 means the all-habits tab
    ListSelectionChanged { index: i64 },
    /// Calendar navigation moved to another month
    CalendarRangeChanged { month: u32, year: i32 },
    /// A subscriber asked every calendar consumer to rebuild
    CalendarRefreshRequested,
}

/// Handle returned by `subscribe`, used to unsubscribe later.
pub type SubscriptionId = u64;

type Callback = Arc<dyn Fn(&DomainEvent) + Send + Sync>;

struct BusState {
    next_id: SubscriptionId,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

/// Synchronous publish/subscribe bus. Callbacks run on the publishing
/// thread, in subscription order.
#[derive(Clone)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DomainEvent) + Send + Sync + 'static,
    {
        let mut state = self.state.lock().expect("event bus lock poisoned");
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Returns true if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock().expect("event bus lock poisoned");
        let before = state.subscribers.len();
        state.subscribers.retain(|(sub_id, _)| *sub_id != id);
        state.subscribers.len() < before
    }

    pub fn publish(&self, event: &DomainEvent) {
        // Snapshot the callbacks so a subscriber may publish or
        // (un)subscribe without deadlocking on the bus lock.
        let callbacks: Vec<Callback> = {
            let state = self.state.lock().expect("event bus lock poisoned");
            state.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };
        debug!("Publishing {:?} to {} subscribers", event, callbacks.len());
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().expect("event bus lock poisoned").subscribers.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
