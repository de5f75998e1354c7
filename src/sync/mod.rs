//! Synchronization service for tasksync.
//!
//! This module provides the [`SyncService`] struct which reconciles the remote
//! task store with the in-memory task collection and the local mirror cache.
//!
//! The service enforces an intentional asymmetry:
//! - Reads degrade: a failed load falls back to the mirror snapshot, or to an
//!   empty collection, and never surfaces an error to the caller
//! - Writes fail hard: a failed create, update or delete is returned to the
//!   caller and leaves both the collection and the mirror untouched
//!
//! State only changes after the remote call has resolved, and only if the
//! user who issued the call is still signed in and the state has not been
//! reset in the meantime. Mirror writes happen under the state lock so the
//! snapshot follows the collection.

pub mod state;
pub mod tasks;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::backend::{BackendError, TaskBackend};
use crate::identity::Identity;
use crate::lists::{TaskList, TaskListId, TaskView};
use crate::model::Task;
use crate::storage::{MirrorCache, TaskMirror};
use crate::utils::datetime;

pub use state::TaskState;

/// Service that manages task synchronization between a remote store and the
/// local mirror.
///
/// The service is cheap to clone; clones share the same state.
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use tasksync::backend::MemoryBackend;
/// use tasksync::identity::{Session, User, UserId};
/// use tasksync::model::TaskDraft;
/// use tasksync::storage::MemoryMirror;
/// use tasksync::sync::SyncService;
///
/// # async fn example() -> anyhow::Result<()> {
/// let session = Arc::new(Session::new());
/// let service = SyncService::new(Arc::new(MemoryBackend::new()), Arc::new(MemoryMirror::new()), session.clone());
///
/// let uid = UserId::new("user-1").unwrap();
/// session.sign_in(User::new(uid.clone()));
///
/// service.load(&uid).await;
/// let task = service.create_task(TaskDraft::new("Buy milk")).await?;
/// service.toggle_completed(&task.id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SyncService {
    backend: Arc<dyn TaskBackend>,
    mirror: TaskMirror,
    identity: Arc<dyn Identity>,
    state: Arc<Mutex<TaskState>>,
}

/// Request status of the most recent load.
///
/// Only [`SyncService::load`] moves this flag; mutations report their outcome
/// directly so a concurrent load's status is never overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// No load has been issued yet
    Idle,
    /// A load is in flight
    Loading,
    /// The last load was served by the remote store
    Succeeded,
    /// The last load could not reach the remote store
    Failed {
        /// Human-readable error message describing what went wrong
        message: String,
    },
}

/// Outcome of a rejected write.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No user is signed in; nothing was sent to the remote store
    #[error("User not authenticated")]
    Unauthenticated,

    /// The task is not in the in-memory collection
    #[error("Task not found: {0}")]
    NotFound(String),

    /// The record belongs to someone other than the signed-in user; nothing
    /// was sent to the remote store
    #[error("Task {0} belongs to another user")]
    NotOwner(String),

    /// The remote store rejected or never answered the write
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SyncService {
    /// Creates a new `SyncService` with an empty collection and `Idle` status.
    pub fn new(backend: Arc<dyn TaskBackend>, mirror: Arc<dyn MirrorCache>, identity: Arc<dyn Identity>) -> Self {
        Self {
            backend,
            mirror: TaskMirror::new(mirror),
            identity,
            state: Arc::new(Mutex::new(TaskState::default())),
        }
    }

    /// Backend type identifier of the remote store in use.
    pub fn backend_type(&self) -> &str {
        self.backend.backend_type()
    }

    pub async fn status(&self) -> SyncStatus {
        self.state.lock().await.status.clone()
    }

    /// Message recorded by the last failed load.
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.status == SyncStatus::Loading
    }

    /// Copy of the whole in-memory state.
    pub async fn snapshot(&self) -> TaskState {
        self.state.lock().await.clone()
    }

    /// All tasks currently held in memory.
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.lock().await.tasks.clone()
    }

    pub async fn task(&self, task_id: &str) -> Option<Task> {
        self.state.lock().await.tasks.iter().find(|t| t.id == task_id).cloned()
    }

    pub async fn lists(&self) -> Vec<TaskList> {
        self.state.lock().await.lists.clone()
    }

    /// Filter the collection into `list`, evaluated against the local date.
    pub async fn view(&self, list: TaskListId) -> TaskView {
        let state = self.state.lock().await;
        TaskView::build(&state.tasks, list, &datetime::format_today())
    }

    pub async fn active_list(&self) -> TaskListId {
        self.state.lock().await.active_list.clone()
    }

    pub async fn set_active_list(&self, list: TaskListId) {
        self.state.lock().await.active_list = list;
    }

    pub async fn selected_task(&self) -> Option<String> {
        self.state.lock().await.selected_task.clone()
    }

    pub async fn set_selected_task(&self, task_id: Option<String>) {
        self.state.lock().await.selected_task = task_id;
    }

    /// Return to the initial state: no tasks, `Idle`, default list.
    ///
    /// The mirror is left alone; it is only ever read back for its owner.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        let generation = state.generation.wrapping_add(1);
        *state = TaskState {
            generation,
            ..TaskState::default()
        };
    }
}
