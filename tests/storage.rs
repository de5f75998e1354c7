use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use tasksync::identity::UserId;
use tasksync::model::{NewTask, Task, TaskDraft};
use tasksync::storage::{LocalStorage, MemoryMirror, MirrorCache, TaskMirror};

/// Mirror that yields on every access, like a real database would.
#[derive(Default)]
struct SlowMirror {
    inner: MemoryMirror,
}

#[async_trait]
impl MirrorCache for SlowMirror {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.inner.set(key, value).await
    }
}

fn task(id: &str, title: &str) -> Task {
    let owner = UserId::new("u1").unwrap();
    Task::from_new(id, NewTask::from_draft(TaskDraft::new(title), &owner))
}

#[tokio::test]
async fn test_local_storage_get_and_set() {
    let storage = LocalStorage::in_memory().await.unwrap();

    assert!(storage.get("tasks").await.unwrap().is_none());

    storage.set("tasks", "[]").await.unwrap();
    assert_eq!(storage.get("tasks").await.unwrap().as_deref(), Some("[]"));

    // Setting again overwrites
    storage.set("tasks", "[1]").await.unwrap();
    assert_eq!(storage.get("tasks").await.unwrap().as_deref(), Some("[1]"));
}

#[tokio::test]
async fn test_local_storage_clear_all_data() {
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.set("tasks", "[]").await.unwrap();

    storage.clear_all_data().await.unwrap();

    assert!(storage.get("tasks").await.unwrap().is_none());
}

#[tokio::test]
async fn test_local_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("mirror.db");

    {
        let storage = LocalStorage::open(&path).await.unwrap();
        let mirror = TaskMirror::new(Arc::new(storage));
        mirror.write(&[task("1", "A"), task("2", "B")]).await.unwrap();
    }

    let storage = LocalStorage::open(&path).await.unwrap();
    let mirror = TaskMirror::new(Arc::new(storage));
    let tasks = mirror.read().await.unwrap().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "A");
}

#[tokio::test]
async fn test_open_memory_path() {
    let storage = LocalStorage::open(std::path::Path::new(":memory:")).await.unwrap();
    storage.set("k", "v").await.unwrap();
    assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn test_task_mirror_snapshot_operations() {
    let mirror = TaskMirror::new(Arc::new(MemoryMirror::new()));
    assert!(mirror.read().await.unwrap().is_none());

    // Append starts a snapshot
    mirror.append(&task("1", "A")).await.unwrap();
    mirror.append(&task("2", "B")).await.unwrap();
    assert_eq!(mirror.read().await.unwrap().unwrap().len(), 2);

    let mut edited = task("1", "A2");
    edited.completed = true;
    mirror.replace(&edited).await.unwrap();

    mirror.remove("2").await.unwrap();

    let tasks = mirror.read().await.unwrap().unwrap();
    assert_eq!(tasks, vec![edited]);
}

#[tokio::test]
async fn test_task_mirror_append_replaces_duplicate_id() {
    let mirror = TaskMirror::new(Arc::new(MemoryMirror::new()));
    mirror.append(&task("1", "A")).await.unwrap();
    mirror.append(&task("1", "B")).await.unwrap();

    let tasks = mirror.read().await.unwrap().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "B");
}

#[tokio::test]
async fn test_task_mirror_without_snapshot_ignores_replace_and_remove() {
    let mirror = TaskMirror::new(Arc::new(MemoryMirror::new()));

    mirror.replace(&task("1", "A")).await.unwrap();
    mirror.remove("1").await.unwrap();

    assert!(mirror.read().await.unwrap().is_none());
}

#[tokio::test]
async fn test_task_mirror_treats_corrupt_snapshot_as_absent() {
    let cache = Arc::new(MemoryMirror::new());
    cache.set("tasks", "not json at all").await.unwrap();

    let mirror = TaskMirror::new(cache);
    assert!(mirror.read().await.unwrap().is_none());
}

#[tokio::test]
async fn test_snapshot_uses_camel_case_fields() {
    let cache = Arc::new(MemoryMirror::new());
    let mirror = TaskMirror::new(cache.clone());
    mirror.write(&[task("1", "A")]).await.unwrap();

    let raw = cache.get("tasks").await.unwrap().unwrap();
    assert!(raw.contains("\"userId\":\"u1\""));
    assert!(raw.contains("\"createdAt\""));
    assert!(raw.contains("\"isOutdoor\":false"));
}

#[tokio::test]
async fn test_concurrent_appends_are_all_kept() {
    let mirror = TaskMirror::new(Arc::new(SlowMirror::default()));
    let other_handle = mirror.clone();

    let first = task("1", "A");
    let second = task("2", "B");
    let third = task("3", "C");
    let (a, b, c) = tokio::join!(mirror.append(&first), other_handle.append(&second), mirror.append(&third));
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let mut ids: Vec<String> = mirror.read().await.unwrap().unwrap().into_iter().map(|t| t.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_concurrent_append_and_remove() {
    let mirror = TaskMirror::new(Arc::new(SlowMirror::default()));
    mirror.write(&[task("1", "A")]).await.unwrap();

    let second = task("2", "B");
    let (added, removed) = tokio::join!(mirror.append(&second), mirror.remove("1"));
    added.unwrap();
    removed.unwrap();

    let tasks = mirror.read().await.unwrap().unwrap();
    assert_eq!(tasks, vec![second]);
}
