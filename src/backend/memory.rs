//! In-process document store.
//!
//! Useful for offline runs and for exercising the sync layer: the store can be
//! taken offline to simulate network failures, and it counts the calls it
//! receives.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BackendError, TaskBackend};
use crate::identity::UserId;
use crate::model::{NewTask, Task};

/// Task store kept entirely in memory, in insertion order.
pub struct MemoryBackend {
    documents: Mutex<Vec<Task>>,
    online: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            online: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Seed the store with existing records, bypassing call accounting.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            documents: Mutex::new(tasks),
            ..Self::new()
        }
    }

    /// Simulate the store becoming reachable or unreachable.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of operations attempted against the store, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored record regardless of owner.
    pub async fn documents(&self) -> Vec<Task> {
        self.documents.lock().await.clone()
    }

    fn begin_call(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Network("task store is unreachable".to_string()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskBackend for MemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn fetch_tasks(&self, owner: &UserId) -> Result<Vec<Task>, BackendError> {
        self.begin_call()?;
        let documents = self.documents.lock().await;
        Ok(documents
            .iter()
            .filter(|t| t.user_id == owner.as_str())
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: &NewTask) -> Result<String, BackendError> {
        self.begin_call()?;
        let id = Uuid::new_v4().simple().to_string();
        self.documents.lock().await.push(Task::from_new(id.clone(), task.clone()));
        Ok(id)
    }

    async fn update_task(&self, task: &Task) -> Result<(), BackendError> {
        self.begin_call()?;
        let mut documents = self.documents.lock().await;
        let stored = documents
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| BackendError::NotFound(format!("task {}", task.id)))?;
        *stored = task.clone();
        Ok(())
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), BackendError> {
        self.begin_call()?;
        self.documents.lock().await.retain(|t| t.id != task_id);
        Ok(())
    }
}
