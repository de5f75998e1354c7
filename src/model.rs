//! Task data model shared by the sync layer, the backends and the mirror cache.
//!
//! Serialized field names are camelCase so a mirror snapshot reads the same as
//! a document in the remote store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DEFAULT_LIST_ID;
use crate::identity::UserId;
use crate::utils::datetime;

/// Task priority. Records without one read as [`Priority::Medium`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown priority '{other}' (expected high, medium or low)")),
        }
    }
}

/// Repeat rule attached to a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    Daily,
    Weekly,
    Monthly,
    None,
}

impl Repeat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::None => "none",
        }
    }
}

impl std::str::FromStr for Repeat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "none" => Ok(Self::None),
            other => Err(format!("unknown repeat rule '{other}'")),
        }
    }
}

/// A stored task, including the identifier assigned by the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub important: bool,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub is_outdoor: bool,
    #[serde(default)]
    pub location: String,
}

impl Task {
    /// Build the stored form of a record once the remote store has assigned its id.
    pub fn from_new(id: impl Into<String>, new: NewTask) -> Self {
        Self {
            id: id.into(),
            title: new.title,
            description: new.description,
            completed: new.completed,
            important: new.important,
            user_id: new.user_id,
            list_id: new.list_id,
            due_date: new.due_date,
            due_time: new.due_time,
            reminder: new.reminder,
            repeat: new.repeat,
            priority: new.priority,
            created_at: new.created_at,
            is_outdoor: new.is_outdoor,
            location: new.location,
        }
    }

    /// The record without its identifier, as written to the remote store.
    pub fn to_fields(&self) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
            important: self.important,
            user_id: self.user_id.clone(),
            list_id: self.list_id.clone(),
            due_date: self.due_date.clone(),
            due_time: self.due_time.clone(),
            reminder: self.reminder.clone(),
            repeat: self.repeat,
            priority: self.priority,
            created_at: self.created_at.clone(),
            is_outdoor: self.is_outdoor,
            location: self.location.clone(),
        }
    }

    /// List tag, reading as `"today"` when unset.
    pub fn list_id(&self) -> &str {
        self.list_id.as_deref().unwrap_or(DEFAULT_LIST_ID)
    }

    /// Whether the weather collaborator should be consulted for this task.
    pub fn wants_weather(&self) -> bool {
        self.is_outdoor && !self.location.trim().is_empty()
    }
}

/// A fully-formed record that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub important: bool,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub is_outdoor: bool,
    #[serde(default)]
    pub location: String,
}

impl NewTask {
    /// Apply creation defaults to a caller draft.
    ///
    /// The owner always comes from `owner`; the draft has no way to name one.
    pub fn from_draft(draft: TaskDraft, owner: &UserId) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            completed: draft.completed,
            important: draft.important,
            user_id: owner.as_str().to_string(),
            list_id: draft.list_id,
            due_date: draft.due_date,
            due_time: draft.due_time,
            reminder: draft.reminder,
            repeat: draft.repeat,
            priority: draft.priority.unwrap_or_default(),
            created_at: draft.created_at.unwrap_or_else(datetime::now_timestamp),
            is_outdoor: draft.is_outdoor.unwrap_or(false),
            location: draft.location.unwrap_or_default(),
        }
    }
}

/// Caller input for creating a task.
///
/// Fields left as `None` receive the creation defaults from
/// [`NewTask::from_draft`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub important: bool,
    pub list_id: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub reminder: Option<String>,
    pub repeat: Option<Repeat>,
    pub priority: Option<Priority>,
    pub created_at: Option<String>,
    pub is_outdoor: Option<bool>,
    pub location: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}
