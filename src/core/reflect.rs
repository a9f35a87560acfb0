use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::temporal::week_of_month;

/// One free-text note inside a month, tagged with its week-of-month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyNote {
    pub id: Uuid,
    pub week_number: u32,
    pub note: String,
    pub created_at: NaiveDateTime,
}

/// One reflection entry per calendar month, keyed by `"YYYY-MM"`. Created
/// lazily on first write, never deleted. Once `locked_at` is set the
/// snapshot fields (income, debt, lists, one-liner) are frozen; weekly
/// notes keep accruing regardless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEntry {
    pub id: Uuid,
    pub month: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt: Option<f64>,
    #[serde(default)]
    pub let_go_of: Vec<String>,
    #[serde(default)]
    pub move_toward: Vec<String>,
    #[serde(default)]
    pub one_liner: String,
    #[serde(default)]
    pub weekly_notes: Vec<WeeklyNote>,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<NaiveDateTime>,
}

impl MonthlyEntry {
    pub fn new(month: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            month: month.into(),
            income: None,
            income_note: None,
            debt: None,
            let_go_of: Vec::new(),
            move_toward: Vec::new(),
            one_liner: String::new(),
            weekly_notes: Vec::new(),
            created_at,
            locked_at: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_at.is_some()
    }
}

/// Shallow merge for the snapshot fields. The numeric and note fields are
/// doubly optional so a patch can clear a value, not just overwrite it.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPatch {
    pub income: Option<Option<f64>>,
    pub income_note: Option<Option<String>>,
    pub debt: Option<Option<f64>>,
    pub let_go_of: Option<Vec<String>>,
    pub move_toward: Option<Vec<String>>,
    pub one_liner: Option<String>,
}

fn apply_patch(entry: &mut MonthlyEntry, patch: &SnapshotPatch) {
    if let Some(income) = patch.income {
        entry.income = income;
    }
    if let Some(ref income_note) = patch.income_note {
        entry.income_note = income_note.clone();
    }
    if let Some(debt) = patch.debt {
        entry.debt = debt;
    }
    if let Some(ref let_go_of) = patch.let_go_of {
        entry.let_go_of = let_go_of.clone();
    }
    if let Some(ref move_toward) = patch.move_toward {
        entry.move_toward = move_toward.clone();
    }
    if let Some(ref one_liner) = patch.one_liner {
        entry.one_liner = one_liner.clone();
    }
}

/// Merge snapshot fields into the entry for `month`, creating it if absent.
/// A locked entry ignores the patch entirely; the engine, not the UI, is
/// the authority on the freeze.
pub fn upsert_entry(
    entries: &[MonthlyEntry],
    month: &str,
    patch: &SnapshotPatch,
    now: NaiveDateTime,
) -> Vec<MonthlyEntry> {
    if let Some(pos) = entries.iter().position(|e| e.month == month) {
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                if i != pos || e.is_locked() {
                    return e.clone();
                }
                let mut e = e.clone();
                apply_patch(&mut e, patch);
                e
            })
            .collect()
    } else {
        let mut entry = MonthlyEntry::new(month, now);
        apply_patch(&mut entry, patch);
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.push(entry);
        next.extend(entries.iter().cloned());
        next
    }
}

/// Append a weekly note to the entry for `month`, creating the entry if
/// absent. Never blocked by the monthly lock. The week number comes from
/// `today`, the current calendar date, even when `month` is a past key.
pub fn add_weekly_note(
    entries: &[MonthlyEntry],
    month: &str,
    text: &str,
    today: NaiveDate,
    now: NaiveDateTime,
) -> Vec<MonthlyEntry> {
    let text = text.trim();
    if text.is_empty() {
        return entries.to_vec();
    }
    let note = WeeklyNote {
        id: Uuid::new_v4(),
        week_number: week_of_month(today),
        note: text.to_string(),
        created_at: now,
    };

    if entries.iter().any(|e| e.month == month) {
        entries
            .iter()
            .map(|e| {
                if e.month != month {
                    return e.clone();
                }
                let mut e = e.clone();
                e.weekly_notes.push(note.clone());
                e
            })
            .collect()
    } else {
        let mut entry = MonthlyEntry::new(month, now);
        entry.weekly_notes.push(note);
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.push(entry);
        next.extend(entries.iter().cloned());
        next
    }
}

/// Freeze the snapshot fields of the entry for `month`. One-way and
/// idempotent: re-locking keeps the original timestamp, and no unlock
/// operation exists. Unknown month is a no-op.
pub fn lock_entry(entries: &[MonthlyEntry], month: &str, now: NaiveDateTime) -> Vec<MonthlyEntry> {
    entries
        .iter()
        .map(|e| {
            if e.month != month || e.is_locked() {
                return e.clone();
            }
            let mut e = e.clone();
            e.locked_at = Some(now);
            e
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn upsert_creates_entry_lazily() {
        let patch = SnapshotPatch {
            income: Some(Some(4200.0)),
            one_liner: Some("Shipped the big thing".into()),
            ..SnapshotPatch::default()
        };
        let entries = upsert_entry(&[], "2026-03", &patch, at(25, 10));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].month, "2026-03");
        assert_eq!(entries[0].income, Some(4200.0));
        assert_eq!(entries[0].one_liner, "Shipped the big thing");
        assert!(entries[0].let_go_of.is_empty());
        assert!(entries[0].weekly_notes.is_empty());
        assert!(!entries[0].is_locked());
    }

    #[test]
    fn upsert_merges_shallowly() {
        let entries = upsert_entry(
            &[],
            "2026-03",
            &SnapshotPatch {
                income: Some(Some(4200.0)),
                ..SnapshotPatch::default()
            },
            at(25, 10),
        );
        let entries = upsert_entry(
            &entries,
            "2026-03",
            &SnapshotPatch {
                debt: Some(Some(300.0)),
                ..SnapshotPatch::default()
            },
            at(26, 10),
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].income, Some(4200.0));
        assert_eq!(entries[0].debt, Some(300.0));
    }

    #[test]
    fn upsert_can_clear_a_value() {
        let entries = upsert_entry(
            &[],
            "2026-03",
            &SnapshotPatch {
                debt: Some(Some(300.0)),
                ..SnapshotPatch::default()
            },
            at(25, 10),
        );
        let entries = upsert_entry(
            &entries,
            "2026-03",
            &SnapshotPatch {
                debt: Some(None),
                ..SnapshotPatch::default()
            },
            at(26, 10),
        );
        assert_eq!(entries[0].debt, None);
    }

    #[test]
    fn locked_entry_rejects_snapshot_writes() {
        let entries = upsert_entry(
            &[],
            "2026-03",
            &SnapshotPatch {
                one_liner: Some("A".into()),
                ..SnapshotPatch::default()
            },
            at(25, 10),
        );
        let entries = lock_entry(&entries, "2026-03", at(25, 11));
        let entries = upsert_entry(
            &entries,
            "2026-03",
            &SnapshotPatch {
                one_liner: Some("B".into()),
                ..SnapshotPatch::default()
            },
            at(25, 12),
        );
        assert_eq!(entries[0].one_liner, "A");
    }

    #[test]
    fn lock_is_idempotent() {
        let entries = upsert_entry(&[], "2026-03", &SnapshotPatch::default(), at(25, 10));
        let entries = lock_entry(&entries, "2026-03", at(25, 11));
        let first = entries[0].locked_at;
        let entries = lock_entry(&entries, "2026-03", at(26, 9));
        assert_eq!(entries[0].locked_at, first);
    }

    #[test]
    fn lock_unknown_month_is_noop() {
        let entries = lock_entry(&[], "2026-03", at(25, 10));
        assert!(entries.is_empty());
    }

    #[test]
    fn weekly_note_creates_entry_and_numbers_by_today() {
        let entries = add_weekly_note(&[], "2026-03", "Steady week", d(10), at(10, 20));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].weekly_notes.len(), 1);
        assert_eq!(entries[0].weekly_notes[0].week_number, 2);
        assert_eq!(entries[0].weekly_notes[0].note, "Steady week");
    }

    #[test]
    fn weekly_note_appends_in_order() {
        let entries = add_weekly_note(&[], "2026-03", "one", d(3), at(3, 20));
        let entries = add_weekly_note(&entries, "2026-03", "two", d(10), at(10, 20));
        assert_eq!(entries[0].weekly_notes.len(), 2);
        assert_eq!(entries[0].weekly_notes[0].note, "one");
        assert_eq!(entries[0].weekly_notes[1].note, "two");
        assert_eq!(entries[0].weekly_notes[1].week_number, 2);
    }

    #[test]
    fn weekly_note_ignores_blank_text() {
        let entries = add_weekly_note(&[], "2026-03", "   ", d(10), at(10, 20));
        assert!(entries.is_empty());
    }

    #[test]
    fn weekly_note_survives_the_lock() {
        let entries = upsert_entry(&[], "2026-03", &SnapshotPatch::default(), at(25, 10));
        let entries = lock_entry(&entries, "2026-03", at(25, 11));
        let entries = add_weekly_note(&entries, "2026-03", "after the lock", d(26), at(26, 9));
        assert_eq!(entries[0].weekly_notes.len(), 1);
        assert!(entries[0].is_locked());
    }

    #[test]
    fn entries_for_other_months_pass_through() {
        let entries = upsert_entry(
            &[],
            "2026-02",
            &SnapshotPatch {
                one_liner: Some("February".into()),
                ..SnapshotPatch::default()
            },
            at(1, 10),
        );
        let entries = upsert_entry(
            &entries,
            "2026-03",
            &SnapshotPatch {
                one_liner: Some("March".into()),
                ..SnapshotPatch::default()
            },
            at(25, 10),
        );
        assert_eq!(entries.len(), 2);
        let feb = entries.iter().find(|e| e.month == "2026-02").unwrap();
        assert_eq!(feb.one_liner, "February");
    }

    #[test]
    fn absent_optionals_stay_absent_in_json() {
        let entry = MonthlyEntry::new("2026-03", at(1, 10));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("income"));
        assert!(!json.contains("debt"));
        assert!(!json.contains("locked_at"));
    }
}
