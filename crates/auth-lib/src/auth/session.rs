// ============================
// crates/auth-lib/src/auth/session.rs
// ============================
//! Session establishment on successful authentication.
//!
//! Whatever the authentication path was (password login, remember-me,
//! impersonation), the transition is the same: rotate the session
//! identifier, then overwrite the identity snapshot. Rotation comes first
//! and its failure is fatal; continuing with a fixated identifier would
//! defeat the point.
use crate::error::AuthError;
use crate::metrics::{SESSION_ACTIVE, SESSION_ROTATED};
use crate::now_secs;
use async_trait::async_trait;
use credence_common::{Roles, SessionIdentity, Status, UserId};
use metrics::{counter, gauge};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// The session-state sink the embedding application provides.
///
/// `rotate_id` must issue a fresh identifier and invalidate the old one;
/// the returned identifier is what the host transmits to the client.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a fresh session identifier, invalidating `old_id`. Existing
    /// state moves over to the new identifier.
    async fn rotate_id(&self, old_id: &str) -> Result<String, AuthError>;

    /// Overwrite the identity snapshot stored under `id`.
    async fn put_identity(&self, id: &str, identity: SessionIdentity) -> Result<(), AuthError>;

    /// The identity snapshot stored under `id`, if any.
    async fn identity(&self, id: &str) -> Option<SessionIdentity>;

    /// Drop the session outright.
    async fn remove(&self, id: &str);
}

/// In-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionIdentity>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn rotate_id(&self, old_id: &str) -> Result<String, AuthError> {
        let mut sessions = self.sessions.write().await;

        let carried = sessions.remove(old_id).unwrap_or_default();
        let new_id = Uuid::new_v4().to_string();
        sessions.insert(new_id.clone(), carried);

        gauge!(SESSION_ACTIVE).set(sessions.len() as f64);

        Ok(new_id)
    }

    async fn put_identity(&self, id: &str, identity: SessionIdentity) -> Result<(), AuthError> {
        self.sessions.write().await.insert(id.to_string(), identity);
        Ok(())
    }

    async fn identity(&self, id: &str) -> Option<SessionIdentity> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn remove(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
    }
}

/// Binds an authenticated identity to session state.
#[derive(Clone)]
pub struct SessionBinder {
    store: Arc<dyn SessionStore>,
}

impl SessionBinder {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Called when a user has successfully authenticated.
    ///
    /// Rotates the session identifier first (a fixated identifier must not
    /// survive authentication; rotation failure propagates and the login
    /// fails), then writes the full identity snapshot with a fresh
    /// `last_resync`. Returns the new session identifier for the host to
    /// transmit to the client.
    #[allow(clippy::too_many_arguments)]
    pub async fn on_authenticated(
        &self,
        session_id: &str,
        user_id: UserId,
        email: &str,
        username: Option<&str>,
        status: Status,
        roles: Roles,
        force_logout: i64,
        remembered: bool,
    ) -> Result<String, AuthError> {
        let new_id = self.store.rotate_id(session_id).await?;

        let identity = SessionIdentity {
            logged_in: true,
            user_id,
            email: email.to_string(),
            username: username.map(str::to_string),
            status,
            roles,
            force_logout,
            remembered,
            last_resync: now_secs(),
        };
        self.store.put_identity(&new_id, identity).await?;

        counter!(SESSION_ROTATED).increment(1);
        tracing::debug!(user_id, remembered, "session identity bound");

        Ok(new_id)
    }

    /// The identity currently bound to `session_id`, if any.
    pub async fn identity(&self, session_id: &str) -> Option<SessionIdentity> {
        self.store.identity(session_id).await
    }
}
