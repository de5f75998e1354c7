//! Remote task store abstraction.
//!
//! This module defines the interface every remote document store must
//! implement, along with the common error type. The sync layer only sees
//! [`TaskBackend`]; which database sits behind it is a configuration choice.

use async_trait::async_trait;

use crate::identity::UserId;
use crate::model::{NewTask, Task};

pub mod factory;
pub mod firestore;
pub mod memory;

pub use factory::create_backend;
pub use firestore::FirestoreBackend;
pub use memory::MemoryBackend;

/// Common error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Backend error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidData(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Remote task store that all backends must implement.
///
/// Every record is owned by exactly one user; queries are always scoped to an
/// owner.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Returns the backend type identifier (e.g., "firestore", "memory").
    fn backend_type(&self) -> &str;

    /// Fetch every task owned by `owner`.
    async fn fetch_tasks(&self, owner: &UserId) -> Result<Vec<Task>, BackendError>;

    /// Store a new record and return the identifier the store assigned to it.
    async fn create_task(&self, task: &NewTask) -> Result<String, BackendError>;

    /// Replace the stored record with the same id by `task` (minus its id).
    async fn update_task(&self, task: &Task) -> Result<(), BackendError>;

    /// Permanently remove the record with `task_id`.
    async fn delete_task(&self, task_id: &str) -> Result<(), BackendError>;
}
