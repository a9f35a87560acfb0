use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a task lives in its day-to-day lifecycle. Exactly one state at a
/// time; the enum makes "backlog and tomorrow at once" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    Today,
    Backlog,
    TomorrowStaged,
}

impl Default for Flow {
    fn default() -> Self {
        Self::Backlog
    }
}

impl Flow {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Backlog => "backlog",
            Self::TomorrowStaged => "tomorrow",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "today" => Some(Self::Today),
            "backlog" => Some(Self::Backlog),
            "tomorrow" => Some(Self::TomorrowStaged),
            _ => None,
        }
    }
}

/// Display-grouping tag. Closed set; no behavioral effect anywhere in the
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Client,
    Personal,
    Ops,
    Urgent,
}

impl Category {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Personal => "Personal",
            Self::Ops => "Ops",
            Self::Urgent => "Urgent",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Client" => Some(Self::Client),
            "Personal" => Some(Self::Personal),
            "Ops" => Some(Self::Ops),
            "Urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub flow: Flow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub has_note: bool,
    pub created_at: NaiveDateTime,
}

impl Task {
    pub fn new(text: impl Into<String>, flow: Flow, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            completed_at: None,
            flow,
            category: None,
            has_note: false,
            created_at,
        }
    }

    pub fn is_today(&self) -> bool {
        self.flow == Flow::Today
    }

    pub fn is_backlog(&self) -> bool {
        self.flow == Flow::Backlog
    }

    pub fn is_tomorrow(&self) -> bool {
        self.flow == Flow::TomorrowStaged
    }
}
