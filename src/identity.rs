//! Identity context: who is signed in.
//!
//! The sync layer only ever asks [`Identity::current_user`]. Callers that want
//! to react to sign-in and sign-out subscribe to a [`Session`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Non-empty user identifier issued by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Returns `None` for an empty or whitespace-only identifier.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "user id cannot be empty".to_string())
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Authenticated user and profile fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
}

impl User {
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            email: None,
            display_name: None,
            photo_url: None,
            email_verified: false,
        }
    }

    /// Display name, falling back to the email and then the uid.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.uid.as_str())
    }
}

/// Sign-in state transitions observed by subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(User),
    SignedOut,
}

/// Source of the currently authenticated user.
pub trait Identity: Send + Sync {
    fn current_user(&self) -> Option<User>;
}

/// In-process identity context backed by a watch channel.
#[derive(Clone)]
pub struct Session {
    tx: Arc<watch::Sender<Option<User>>>,
}

impl Session {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn sign_in(&self, user: User) {
        log::info!("👤 Signed in as {}", user.label());
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            log::info!("👤 Signed out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Subscribe to sign-in/sign-out events from this point on.
    pub fn subscribe(&self) -> SessionEvents {
        let mut rx = self.tx.subscribe();
        rx.mark_unchanged();
        SessionEvents { rx }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Identity for Session {
    fn current_user(&self) -> Option<User> {
        self.tx.borrow().clone()
    }
}

/// Stream of [`SessionEvent`]s for one subscriber.
pub struct SessionEvents {
    rx: watch::Receiver<Option<User>>,
}

impl SessionEvents {
    /// Wait for the next change. Returns `None` once the session is dropped.
    ///
    /// Intermediate states may be skipped if several changes happen before the
    /// subscriber wakes up; the latest one is always delivered.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        self.rx.changed().await.ok()?;
        let event = match self.rx.borrow_and_update().clone() {
            Some(user) => SessionEvent::SignedIn(user),
            None => SessionEvent::SignedOut,
        };
        Some(event)
    }
}
