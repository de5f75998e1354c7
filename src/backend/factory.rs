//! Backend factory for creating backend instances from configuration.

use anyhow::{anyhow, Result};
use std::sync::Arc;

use super::{FirestoreBackend, MemoryBackend, TaskBackend};
use crate::config::RemoteConfig;

/// Create a backend instance from the `[remote]` configuration section.
///
/// # Errors
/// Returns error if:
/// - Backend type is unknown
/// - Required settings for the backend are missing
pub fn create_backend(config: &RemoteConfig) -> Result<Arc<dyn TaskBackend>> {
    match config.backend.as_str() {
        "firestore" => {
            if config.project_id.is_empty() {
                return Err(anyhow!("Missing 'project_id' for the firestore backend"));
            }
            let mut backend = FirestoreBackend::new(config.project_id.clone()).with_base_url(config.base_url.clone());
            if let Some(api_key) = config.api_key() {
                backend = backend.with_api_key(api_key);
            }
            match config.id_token() {
                Some(token) => backend = backend.with_id_token(token),
                None => log::warn!(
                    "⚠️  {} is not set, Firestore requests are unauthenticated",
                    config.id_token_env
                ),
            }
            Ok(Arc::new(backend))
        }
        "memory" => Ok(Arc::new(MemoryBackend::new())),
        _ => Err(anyhow!("Unknown backend type: {}", config.backend)),
    }
}
