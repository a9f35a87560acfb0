use chrono::NaiveDateTime;

use super::task::{Flow, Task};

/// The active focus set. Completion does not remove a task from Today;
/// finished items stay visible until the day rolls over.
pub fn today(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| t.is_today()).cloned().collect()
}

/// The holding pen, newest first.
pub fn backlog(tasks: &[Task]) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.iter().filter(|t| t.is_backlog()).cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

/// Tasks staged for tomorrow during the Evening Ritual.
pub fn tomorrow(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| t.is_tomorrow()).cloned().collect()
}

/// Every completed task, most recent completion first.
pub fn completed(tasks: &[Task]) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.iter().filter(|t| t.completed).cloned().collect();
    out.sort_by(|a, b| {
        b.completed_at
            .unwrap_or(NaiveDateTime::MIN)
            .cmp(&a.completed_at.unwrap_or(NaiveDateTime::MIN))
    });
    out
}

/// What the Evening Ritual offers for staging: unfinished backlog tasks.
pub fn ritual_candidates(tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.is_backlog() && !t.completed)
        .cloned()
        .collect()
}

/// Done-count over the Today set, for the day's progress line.
pub fn today_completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.is_today() && t.completed).count()
}
