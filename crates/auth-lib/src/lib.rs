// ============================
// crates/auth-lib/src/lib.rs
// ============================
//! Embeddable user-account and credential-lifecycle core: account creation
//! with uniqueness enforcement, email-confirmation challenges, password
//! hashing, and session establishment for the embedding web application.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod tables;
pub mod validation;

use crate::accounts::{AccountManager, AccountStore};
use crate::auth::session::{MemorySessionStore, SessionBinder, SessionStore};
use crate::config::Settings;
use crate::storage::{MemoryStorage, Storage};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// The core's collaborators wired together for the embedding application
#[derive(Clone)]
pub struct AuthCore {
    /// Account lifecycle orchestrator
    pub accounts: AccountManager,
    /// Session establishment on successful authentication
    pub sessions: SessionBinder,
    /// Settings the core was built with
    pub settings: Arc<Settings>,
}

impl AuthCore {
    /// Wire the core against application-provided storage and session-state
    /// collaborators.
    pub fn new(
        storage: Arc<dyn Storage>,
        session_store: Arc<dyn SessionStore>,
        settings: Settings,
    ) -> Self {
        let settings = Arc::new(settings);
        let store = AccountStore::new(storage, settings.table_names());
        let accounts = AccountManager::new(store, Arc::clone(&settings));
        let sessions = SessionBinder::new(session_store);

        Self {
            accounts,
            sessions,
            settings,
        }
    }

    /// Core wired to the in-memory reference backends.
    ///
    /// When the settings require unique usernames, a storage-level unique
    /// index is declared as well, so the guarantee does not rest on the
    /// manager's pre-check alone.
    pub fn in_memory(settings: Settings) -> Self {
        let mut storage = MemoryStorage::new();
        if settings.require_unique_username {
            storage = storage
                .with_unique_index(settings.table_names().qualify(accounts::USERS), "username");
        }

        Self::new(
            Arc::new(storage),
            Arc::new(MemorySessionStore::new()),
            settings,
        )
    }
}

/// Current Unix epoch in seconds.
pub(crate) fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
