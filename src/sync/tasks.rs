use log::{error, info, warn};

use crate::backend::BackendError;
use crate::identity::{User, UserId};
use crate::model::{NewTask, Task, TaskDraft};
use crate::sync::{SyncError, SyncService, SyncStatus, TaskState};

impl SyncService {
    /// Loads every task owned by `user_id`, replacing the in-memory collection.
    ///
    /// On success the mirror is overwritten with the same snapshot. When the
    /// remote store cannot be reached the mirror snapshot is used instead, or
    /// an empty collection when there is none. This never fails; the status
    /// flag records what happened.
    ///
    /// A result that arrives after `user_id` signed out, or after a reset, is
    /// discarded and leaves both the collection and the mirror alone.
    ///
    /// # Returns
    /// The collection now held in memory
    pub async fn load(&self, user_id: &UserId) -> Vec<Task> {
        let generation = {
            let mut state = self.state.lock().await;
            state.status = SyncStatus::Loading;
            state.generation
        };

        info!("🔄 Loading tasks for {user_id} from {}...", self.backend.backend_type());

        let fetched = self.backend.fetch_tasks(user_id).await;

        let mut state = self.state.lock().await;
        if !self.is_current(&state, user_id, generation) {
            warn!("⚠️  Discarding tasks loaded for {user_id}: the session changed while loading");
            return state.tasks.clone();
        }

        match fetched {
            Ok(tasks) => {
                let tasks = owned_by(tasks, user_id, "remote store");
                info!("✅ Fetched {} tasks", tasks.len());

                if let Err(e) = self.mirror.write(&tasks).await {
                    error!("❌ Failed to refresh task mirror: {e:#}");
                }

                state.replace_all(tasks);
                state.status = SyncStatus::Succeeded;
                state.error = None;
            }
            Err(e) => {
                let message = format!("Failed to fetch tasks: {e}");
                error!("❌ {message}");

                let fallback = match self.mirror.read().await {
                    Ok(Some(cached)) => {
                        let cached = owned_by(cached, user_id, "mirror");
                        warn!("⚠️  Serving {} tasks from the local mirror", cached.len());
                        cached
                    }
                    Ok(None) => {
                        warn!("⚠️  No local mirror available, starting with an empty list");
                        Vec::new()
                    }
                    Err(mirror_err) => {
                        error!("❌ Failed to read task mirror: {mirror_err:#}");
                        Vec::new()
                    }
                };

                state.replace_all(fallback);
                state.status = SyncStatus::Failed {
                    message: message.clone(),
                };
                state.error = Some(message);
            }
        }
        state.tasks.clone()
    }

    /// Creates a task for the signed-in user.
    ///
    /// The owner is always taken from the identity context. Missing priority,
    /// creation time, outdoor flag and location are defaulted before the
    /// record is sent. The created task, with the id the store assigned, is
    /// appended to the collection and the mirror, unless the user signed out
    /// while the write was in flight.
    ///
    /// # Errors
    /// - [`SyncError::Unauthenticated`] if nobody is signed in; nothing is sent
    /// - [`SyncError::Backend`] if the store rejects the write; nothing changes locally
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, SyncError> {
        let user = self.require_user("create task")?;
        let generation = self.state.lock().await.generation;

        let new_task = NewTask::from_draft(draft, &user.uid);
        let task_id = self
            .backend
            .create_task(&new_task)
            .await
            .map_err(|e| write_failed("create task", e))?;

        let task = Task::from_new(task_id, new_task);
        info!("✅ Created task {}", task.id);

        let mut state = self.state.lock().await;
        if !self.is_current(&state, &user.uid, generation) {
            warn!("⚠️  Task {} was created after {} signed out; not keeping it locally", task.id, user.uid);
            return Ok(task);
        }
        if let Err(e) = self.mirror.append(&task).await {
            error!("❌ Failed to add task {} to mirror: {e:#}", task.id);
        }
        state.insert(task.clone());

        Ok(task)
    }

    /// Replaces a task with `task`, matched by id.
    ///
    /// The full record is written; fields are not merged with what the store
    /// held before. If the task disappeared from memory while the write was in
    /// flight, only the remote record changes.
    ///
    /// # Errors
    /// - [`SyncError::Unauthenticated`] if nobody is signed in; nothing is sent
    /// - [`SyncError::NotOwner`] if `task` belongs to another user; nothing is sent
    /// - [`SyncError::Backend`] if the store rejects the write; the in-memory
    ///   record is left as it was
    pub async fn update_task(&self, task: Task) -> Result<Task, SyncError> {
        let user = self.require_user("update task")?;
        let generation = self.check_owner(&user.uid, &task.id, Some(task.user_id.as_str())).await?;

        self.backend
            .update_task(&task)
            .await
            .map_err(|e| write_failed(&format!("update task {}", task.id), e))?;

        let mut state = self.state.lock().await;
        if !self.is_current(&state, &user.uid, generation) {
            warn!("⚠️  Task {} was updated after {} signed out; not keeping it locally", task.id, user.uid);
            return Ok(task);
        }
        if let Err(e) = self.mirror.replace(&task).await {
            error!("❌ Failed to update task {} in mirror: {e:#}", task.id);
        }

        if state.replace(task.clone()) {
            info!("✅ Updated task {}", task.id);
        } else {
            warn!("⚠️  Task {} was updated remotely but is no longer held locally", task.id);
        }

        Ok(task)
    }

    /// Permanently deletes a task.
    ///
    /// # Errors
    /// - [`SyncError::Unauthenticated`] if nobody is signed in; nothing is sent
    /// - [`SyncError::NotOwner`] if the task held in memory belongs to another user
    /// - [`SyncError::Backend`] if the store rejects the delete; the task stays in memory
    pub async fn delete_task(&self, task_id: &str) -> Result<(), SyncError> {
        let user = self.require_user("delete task")?;
        let generation = self.check_owner(&user.uid, task_id, None).await?;

        self.backend
            .delete_task(task_id)
            .await
            .map_err(|e| write_failed(&format!("delete task {task_id}"), e))?;

        let mut state = self.state.lock().await;
        if !self.is_current(&state, &user.uid, generation) {
            warn!("⚠️  Task {task_id} was deleted after {} signed out", user.uid);
            return Ok(());
        }
        if let Err(e) = self.mirror.remove(task_id).await {
            error!("❌ Failed to remove task {task_id} from mirror: {e:#}");
        }
        state.remove(task_id);
        info!("✅ Deleted task {task_id}");

        Ok(())
    }

    /// Flip the completed flag of a task held in memory and write it back.
    pub async fn toggle_completed(&self, task_id: &str) -> Result<Task, SyncError> {
        let mut task = self.require_task(task_id).await?;
        task.completed = !task.completed;
        self.update_task(task).await
    }

    /// Flip the important flag of a task held in memory and write it back.
    pub async fn toggle_important(&self, task_id: &str) -> Result<Task, SyncError> {
        let mut task = self.require_task(task_id).await?;
        task.important = !task.important;
        self.update_task(task).await
    }

    async fn require_task(&self, task_id: &str) -> Result<Task, SyncError> {
        self.task(task_id)
            .await
            .ok_or_else(|| SyncError::NotFound(task_id.to_string()))
    }

    fn require_user(&self, action: &str) -> Result<User, SyncError> {
        self.identity.current_user().ok_or_else(|| {
            error!("❌ Cannot {action}: user not authenticated");
            SyncError::Unauthenticated
        })
    }

    /// Reject writes to records owned by anyone but `user`, both the record
    /// being written and the copy held in memory. Returns the state generation
    /// the write is issued under.
    async fn check_owner(&self, user: &UserId, task_id: &str, record_owner: Option<&str>) -> Result<u64, SyncError> {
        let state = self.state.lock().await;
        let held_owner = state.tasks.iter().find(|t| t.id == task_id).map(|t| t.user_id.as_str());
        let foreign = [record_owner, held_owner]
            .into_iter()
            .flatten()
            .any(|owner| owner != user.as_str());
        if foreign {
            error!("❌ Refusing to write task {task_id}: it is not owned by {user}");
            return Err(SyncError::NotOwner(task_id.to_string()));
        }
        Ok(state.generation)
    }

    /// Whether a result requested by `owner` under `generation` may still be
    /// applied to `state`.
    fn is_current(&self, state: &TaskState, owner: &UserId, generation: u64) -> bool {
        state.generation == generation && self.identity.current_user().is_some_and(|u| &u.uid == owner)
    }
}

fn write_failed(action: &str, err: BackendError) -> SyncError {
    error!("❌ Failed to {action}: {err}");
    SyncError::Backend(err)
}

/// Keep only the records owned by `owner`.
fn owned_by(tasks: Vec<Task>, owner: &UserId, source: &str) -> Vec<Task> {
    let total = tasks.len();
    let owned: Vec<Task> = tasks.into_iter().filter(|t| t.user_id == owner.as_str()).collect();
    if owned.len() != total {
        warn!(
            "⚠️  Dropped {} tasks from the {source} that belong to another user",
            total - owned.len()
        );
    }
    owned
}
