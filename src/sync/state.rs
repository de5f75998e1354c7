use crate::constants::DEFAULT_LIST_ID;
use crate::lists::{builtin_lists, TaskList, TaskListId};
use crate::model::Task;

use super::SyncStatus;

/// In-memory task state owned by a [`super::SyncService`].
///
/// Task ids are unique within `tasks`; every mutator preserves that.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub lists: Vec<TaskList>,
    pub active_list: TaskListId,
    pub status: SyncStatus,
    pub error: Option<String>,
    pub selected_task: Option<String>,
    /// Bumped on every reset; remote results requested under an older
    /// generation are discarded
    pub(super) generation: u64,
}

impl Default for TaskState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            lists: builtin_lists(),
            active_list: TaskListId::from_id(DEFAULT_LIST_ID),
            status: SyncStatus::Idle,
            error: None,
            selected_task: None,
            generation: 0,
        }
    }
}

impl TaskState {
    /// Replace the whole collection. Later duplicates of an id are dropped.
    pub(super) fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut unique: Vec<Task> = Vec::with_capacity(tasks.len());
        for task in tasks {
            if unique.iter().any(|t| t.id == task.id) {
                log::warn!("⚠️  Dropping duplicate task id {}", task.id);
                continue;
            }
            unique.push(task);
        }
        self.tasks = unique;

        if let Some(selected) = &self.selected_task {
            if !self.tasks.iter().any(|t| &t.id == selected) {
                self.selected_task = None;
            }
        }
    }

    /// Append a task, or overwrite the entry that already carries its id.
    pub(super) fn insert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Overwrite the entry with the same id. Returns false when there is none.
    pub(super) fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                *existing = task;
                true
            }
            None => false,
        }
    }

    /// Remove the entry with `task_id`. Returns false when there is none.
    pub(super) fn remove(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        if self.selected_task.as_deref() == Some(task_id) {
            self.selected_task = None;
        }
        self.tasks.len() != before
    }
}
