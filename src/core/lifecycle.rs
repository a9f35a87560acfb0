use chrono::NaiveDateTime;
use uuid::Uuid;

use super::task::{Category, Flow, Task};

/// Whitelisted editable fields for [`update_task`]. `category` is doubly
/// optional so a patch can distinguish "leave alone" from "clear the tag".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub category: Option<Option<Category>>,
    pub has_note: Option<bool>,
}

/// Create a task and prepend it to the collection. Returns `None` when the
/// text trims to empty; the caller keeps its current snapshot.
pub fn add_task(
    tasks: &[Task],
    text: &str,
    flow: Flow,
    now: NaiveDateTime,
) -> Option<(Vec<Task>, Uuid)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let task = Task::new(text, flow, now);
    let id = task.id;
    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.push(task);
    next.extend(tasks.iter().cloned());
    Some((next, id))
}

/// Apply a whitelist patch to one task. Unknown id, or a patch text that
/// trims to empty, leaves the collection unchanged.
pub fn update_task(tasks: &[Task], id: Uuid, patch: &TaskPatch) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            if t.id != id {
                return t.clone();
            }
            let mut t = t.clone();
            if let Some(ref text) = patch.text {
                let text = text.trim();
                if !text.is_empty() {
                    t.text = text.to_string();
                }
            }
            if let Some(category) = patch.category {
                t.category = category;
            }
            if let Some(has_note) = patch.has_note {
                t.has_note = has_note;
            }
            t
        })
        .collect()
}

/// Flip completion. `completed_at` is stamped on false→true and cleared on
/// true→false, so a double toggle restores the task exactly.
pub fn toggle_complete(tasks: &[Task], id: Uuid, now: NaiveDateTime) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            if t.id != id {
                return t.clone();
            }
            let mut t = t.clone();
            t.completed = !t.completed;
            t.completed_at = if t.completed { Some(now) } else { None };
            t
        })
        .collect()
}

/// Remove a task permanently. Unknown id is a no-op.
pub fn delete_task(tasks: &[Task], id: Uuid) -> Vec<Task> {
    tasks.iter().filter(|t| t.id != id).cloned().collect()
}

/// Move a task to another lifecycle state. Completion is untouched; this is
/// the only path into `TomorrowStaged` (the Evening Ritual gate lives in the
/// presentation layer, not here).
pub fn move_to(tasks: &[Task], id: Uuid, flow: Flow) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            if t.id != id {
                return t.clone();
            }
            let mut t = t.clone();
            t.flow = flow;
            t
        })
        .collect()
}

/// The day-boundary rollover. Computed as a pure function of the full
/// snapshot so observers only ever see the before or the after:
/// completed Today tasks are dropped, unfinished Today tasks demote to
/// Backlog, staged Tomorrow tasks promote to Today, Backlog passes through.
///
/// Dropping completed tasks is lossy: nothing beyond the completion
/// timestamp survives the rollover. Intentional, inherited behavior.
pub fn lock_tomorrow(tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .filter_map(|t| match t.flow {
            Flow::Today if t.completed => None,
            Flow::Today => {
                let mut t = t.clone();
                t.flow = Flow::Backlog;
                Some(t)
            }
            Flow::TomorrowStaged => {
                let mut t = t.clone();
                t.flow = Flow::Today;
                Some(t)
            }
            Flow::Backlog => Some(t.clone()),
        })
        .collect()
}

/// Drop every task. The settings screen's "reset all data" action.
pub fn clear_all(_tasks: &[Task]) -> Vec<Task> {
    Vec::new()
}
