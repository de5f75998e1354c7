//! Local mirror cache: the last known task snapshot, used as a fallback read
//! path when the remote store cannot be reached.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::constants::MIRROR_TASKS_KEY;
use crate::model::Task;

/// Durable key/value store. A missing key is a valid state.
#[async_trait]
pub trait MirrorCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Mirror kept in process memory.
#[derive(Default)]
pub struct MemoryMirror {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MirrorCache for MemoryMirror {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the task snapshot stored under the `"tasks"` key.
///
/// Writes through one `TaskMirror` (and its clones) are serialized, so
/// concurrent appends never drop each other's entries.
#[derive(Clone)]
pub struct TaskMirror {
    cache: Arc<dyn MirrorCache>,
    write_lock: Arc<Mutex<()>>,
}

impl TaskMirror {
    pub fn new(cache: Arc<dyn MirrorCache>) -> Self {
        Self {
            cache,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read the snapshot. A snapshot that no longer parses is treated as
    /// absent.
    pub async fn read(&self) -> Result<Option<Vec<Task>>> {
        let Some(raw) = self.cache.get(MIRROR_TASKS_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(tasks) => Ok(Some(tasks)),
            Err(e) => {
                log::warn!("⚠️  Ignoring unreadable task snapshot in mirror: {e}");
                Ok(None)
            }
        }
    }

    /// Overwrite the snapshot.
    pub async fn write(&self, tasks: &[Task]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store(tasks).await
    }

    /// Add a created task, starting a snapshot if there is none yet.
    pub async fn append(&self, task: &Task) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.read().await?.unwrap_or_default();
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => tasks.push(task.clone()),
        }
        self.store(&tasks).await
    }

    /// Rewrite the entry with the same id in place. Without a snapshot this
    /// does nothing.
    pub async fn replace(&self, task: &Task) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let Some(mut tasks) = self.read().await? else {
            return Ok(());
        };
        for t in tasks.iter_mut().filter(|t| t.id == task.id) {
            *t = task.clone();
        }
        self.store(&tasks).await
    }

    /// Drop the entry with `task_id`. Without a snapshot this does nothing.
    pub async fn remove(&self, task_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let Some(mut tasks) = self.read().await? else {
            return Ok(());
        };
        tasks.retain(|t| t.id != task_id);
        self.store(&tasks).await
    }

    async fn store(&self, tasks: &[Task]) -> Result<()> {
        let raw = serde_json::to_string(tasks).context("Failed to serialize task snapshot")?;
        self.cache.set(MIRROR_TASKS_KEY, &raw).await
    }
}
