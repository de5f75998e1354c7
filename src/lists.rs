//! Named task lists.
//!
//! Membership is never stored: a list is a filter over the task collection,
//! evaluated at read time against the current local date.

use std::fmt;

use crate::constants::{LIST_ALL, LIST_ASSIGNED, LIST_IMPORTANT, LIST_PLANNED, LIST_TODAY};
use crate::model::Task;

/// Identifier of a list: one of the built-in views or an ad hoc `listId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskListId {
    All,
    Today,
    Important,
    Planned,
    Assigned,
    Custom(String),
}

impl TaskListId {
    pub fn from_id(id: &str) -> Self {
        match id {
            LIST_ALL => Self::All,
            LIST_TODAY => Self::Today,
            LIST_IMPORTANT => Self::Important,
            LIST_PLANNED => Self::Planned,
            LIST_ASSIGNED => Self::Assigned,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => LIST_ALL,
            Self::Today => LIST_TODAY,
            Self::Important => LIST_IMPORTANT,
            Self::Planned => LIST_PLANNED,
            Self::Assigned => LIST_ASSIGNED,
            Self::Custom(id) => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::All => "All Tasks",
            Self::Today => "Today",
            Self::Important => "Important",
            Self::Planned => "Planned",
            Self::Assigned => "Assigned to me",
            Self::Custom(id) => id,
        }
    }

    /// Whether `task` belongs to this list.
    ///
    /// `today` is the user's local calendar date as `YYYY-MM-DD`, not the UTC
    /// date: a task due today stays in "Today" until local midnight whatever
    /// the UTC offset. Due dates carry no zone, so they are compared as given.
    pub fn contains(&self, task: &Task, today: &str) -> bool {
        match self {
            Self::All => true,
            Self::Today => task.due_date.as_deref() == Some(today),
            Self::Important => task.important,
            Self::Planned => task.due_date.is_some(),
            Self::Assigned => task.list_id.as_deref() == Some(LIST_ASSIGNED),
            Self::Custom(id) => task.list_id.as_deref() == Some(id.as_str()),
        }
    }

    /// List a task created while this list is active should be tagged with.
    /// Creating from "All Tasks" files the task under "today".
    pub fn list_for_new_task(&self) -> String {
        match self {
            Self::All => LIST_TODAY.to_string(),
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named grouping shown in the sidebar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskList {
    pub id: String,
    pub name: String,
}

/// The built-in lists, in display order.
pub fn builtin_lists() -> Vec<TaskList> {
    [
        TaskListId::All,
        TaskListId::Today,
        TaskListId::Important,
        TaskListId::Planned,
        TaskListId::Assigned,
    ]
    .iter()
    .map(|id| TaskList {
        id: id.as_str().to_string(),
        name: id.display_name().to_string(),
    })
    .collect()
}

/// A filtered list split into open and completed tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskView {
    pub list: TaskListId,
    pub active: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskView {
    pub fn build(tasks: &[Task], list: TaskListId, today: &str) -> Self {
        let (completed, active) = tasks
            .iter()
            .filter(|t| list.contains(t, today))
            .cloned()
            .partition(|t| t.completed);
        Self { list, active, completed }
    }

    pub fn total(&self) -> usize {
        self.active.len() + self.completed.len()
    }

    /// Completed share of the view as a rounded percentage.
    pub fn progress(&self) -> u8 {
        progress_percent(self.completed.len(), self.total())
    }
}

/// `round(completed / total * 100)`, or 0 for an empty list.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_half_up() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(4, 4), 100);
    }

    #[test]
    fn well_known_ids_round_trip() {
        for id in ["all", "today", "important", "planned", "assigned", "groceries"] {
            assert_eq!(TaskListId::from_id(id).as_str(), id);
        }
        assert_eq!(TaskListId::from_id("groceries"), TaskListId::Custom("groceries".to_string()));
    }

    #[test]
    fn new_tasks_from_all_go_to_today() {
        assert_eq!(TaskListId::All.list_for_new_task(), "today");
        assert_eq!(TaskListId::Important.list_for_new_task(), "important");
    }
}
