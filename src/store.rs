use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::lifecycle::{self, TaskPatch};
use crate::core::reflect::{self, MonthlyEntry, SnapshotPatch};
use crate::core::task::{Flow, Task};

/// User-level defaults, prefilled into a fresh month's reflection form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_debt: Option<f64>,
}

/// Everything the app persists: the task collection, the reflection journal
/// and the settings. One `State` is one atomic snapshot; the store swaps
/// whole snapshots, never fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub monthly_entries: Vec<MonthlyEntry>,
    #[serde(default)]
    pub settings: Settings,
}

/// Every mutation the store accepts. The presentation layer dispatches
/// these; nothing else touches the state.
#[derive(Debug, Clone)]
pub enum Intent {
    AddTask { text: String, flow: Flow },
    UpdateTask { id: Uuid, patch: TaskPatch },
    ToggleComplete { id: Uuid },
    DeleteTask { id: Uuid },
    MoveTo { id: Uuid, flow: Flow },
    LockTomorrow,
    ClearAllTasks,
    UpsertEntry { month: String, patch: SnapshotPatch },
    AddWeeklyNote { month: String, text: String },
    LockEntry { month: String },
    SetBaseFinancials { income: Option<f64>, debt: Option<f64> },
}

/// Notified with the fresh snapshot after every state change. The storage
/// autosave hangs off this; a failing observer is its own problem and never
/// unwinds into the store.
pub trait Observer {
    fn state_changed(&self, state: &State);
}

pub struct Store {
    state: State,
    observers: Vec<Box<dyn Observer>>,
}

impl Store {
    pub fn new(state: State) -> Self {
        Self {
            state,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Apply one intent against the wall clock. Returns the new task's id
    /// for `AddTask`, `None` otherwise.
    pub fn apply(&mut self, intent: Intent) -> Option<Uuid> {
        let now = Local::now().naive_local();
        self.apply_at(intent, now.date(), now)
    }

    /// Apply one intent at an explicit time. The successor state is computed
    /// as a pure function of the current snapshot, then published in one
    /// replacement; observers only ever see fully-applied transactions, and
    /// a no-op intent publishes nothing.
    pub fn apply_at(
        &mut self,
        intent: Intent,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Option<Uuid> {
        let mut added = None;
        let next = self.successor(intent, today, now, &mut added);
        if next != self.state {
            self.state = next;
            for observer in &self.observers {
                observer.state_changed(&self.state);
            }
        }
        added
    }

    fn successor(
        &self,
        intent: Intent,
        today: NaiveDate,
        now: NaiveDateTime,
        added: &mut Option<Uuid>,
    ) -> State {
        let mut next = self.state.clone();
        match intent {
            Intent::AddTask { text, flow } => {
                if let Some((tasks, id)) = lifecycle::add_task(&next.tasks, &text, flow, now) {
                    next.tasks = tasks;
                    *added = Some(id);
                }
            }
            Intent::UpdateTask { id, patch } => {
                next.tasks = lifecycle::update_task(&next.tasks, id, &patch);
            }
            Intent::ToggleComplete { id } => {
                next.tasks = lifecycle::toggle_complete(&next.tasks, id, now);
            }
            Intent::DeleteTask { id } => {
                next.tasks = lifecycle::delete_task(&next.tasks, id);
            }
            Intent::MoveTo { id, flow } => {
                next.tasks = lifecycle::move_to(&next.tasks, id, flow);
            }
            Intent::LockTomorrow => {
                next.tasks = lifecycle::lock_tomorrow(&next.tasks);
            }
            Intent::ClearAllTasks => {
                next.tasks = lifecycle::clear_all(&next.tasks);
            }
            Intent::UpsertEntry { month, patch } => {
                next.monthly_entries =
                    reflect::upsert_entry(&next.monthly_entries, &month, &patch, now);
            }
            Intent::AddWeeklyNote { month, text } => {
                next.monthly_entries =
                    reflect::add_weekly_note(&next.monthly_entries, &month, &text, today, now);
            }
            Intent::LockEntry { month } => {
                next.monthly_entries = reflect::lock_entry(&next.monthly_entries, &month, now);
            }
            Intent::SetBaseFinancials { income, debt } => {
                next.settings.base_income = income;
                next.settings.base_debt = debt;
            }
        }
        next
    }
}
