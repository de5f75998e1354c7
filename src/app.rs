//! Application state.
//!
//! Everything the client needs at runtime is owned by one explicitly
//! constructed [`AppState`] and handed to whoever needs it. There is no
//! process-wide store.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::backend::{create_backend, TaskBackend};
use crate::config::Config;
use crate::identity::{Session, SessionEvent};
use crate::storage::{LocalStorage, MirrorCache};
use crate::sync::SyncService;

/// Session, task synchronization and theme, wired together.
#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub tasks: SyncService,
    dark_mode: Arc<AtomicBool>,
}

impl AppState {
    /// Fresh state: nobody signed in, no tasks, `Idle`, light theme.
    pub fn new(backend: Arc<dyn TaskBackend>, mirror: Arc<dyn MirrorCache>) -> Self {
        let session = Session::new();
        let tasks = SyncService::new(backend, mirror, Arc::new(session.clone()));
        Self {
            session,
            tasks,
            dark_mode: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build the remote backend and open the SQLite mirror described by `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let backend = create_backend(&config.remote)?;
        let mirror_path = config.mirror_path()?;
        log::info!("💾 Opening task mirror at {}", mirror_path.display());
        let storage = LocalStorage::open(&mirror_path).await?;
        Ok(Self::new(backend, Arc::new(storage)))
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode.load(Ordering::SeqCst)
    }

    /// Flip the theme and return the new value.
    pub fn toggle_theme(&self) -> bool {
        !self.dark_mode.fetch_xor(true, Ordering::SeqCst)
    }

    /// Load the user's tasks on sign-in; drop all task state on sign-out.
    pub async fn handle_session_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(user) => {
                self.tasks.load(&user.uid).await;
            }
            SessionEvent::SignedOut => {
                self.tasks.reset().await;
            }
        }
    }

    /// Drive [`Self::handle_session_event`] from session changes until the
    /// session is dropped.
    pub fn spawn_session_listener(&self) -> JoinHandle<()> {
        let mut events = self.session.subscribe();
        let app = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                app.handle_session_event(event).await;
            }
        })
    }
}
