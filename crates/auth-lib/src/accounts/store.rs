// ============================
// crates/auth-lib/src/accounts/store.rs
// ============================
//! The data-access boundary for account rows.
//!
//! Every operation is a single logical unit against the storage
//! collaborator. Storage faults surface as `AuthError::Storage`, wrapping
//! the backend cause; unique violations on the account row are translated
//! to the business-rule error here.
use crate::error::AuthError;
use crate::storage::{Row, Storage, StorageError};
use crate::tables::TableNames;
use credence_common::{AccountRecord, ConfirmationRequestRow, NewAccount, UserId};
use serde_json::{json, Value};
use std::sync::Arc;

/// Logical table names; the configured schema/prefix is applied on access.
pub const USERS: &str = "users";
pub const USERS_CONFIRMATIONS: &str = "users_confirmations";
pub const USERS_REMEMBERED: &str = "users_remembered";

fn row_of(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(column, value)| ((*column).to_string(), value.clone()))
        .collect()
}

#[derive(Clone)]
pub struct AccountStore {
    storage: Arc<dyn Storage>,
    tables: TableNames,
}

impl AccountStore {
    pub fn new(storage: Arc<dyn Storage>, tables: TableNames) -> Self {
        Self { storage, tables }
    }

    /// Insert a new account row and return the generated id.
    ///
    /// A storage-level unique violation (e.g. an index the deployment added
    /// on email or username) becomes `UserAlreadyExists`; this also covers
    /// the race window left open by any application-level pre-check.
    pub async fn insert_account(&self, account: &NewAccount) -> Result<UserId, AuthError> {
        let fields = row_of(&[
            ("email", json!(account.email)),
            ("password", json!(account.password_hash)),
            ("username", account.username.as_deref().map_or(Value::Null, Value::from)),
            ("verified", json!(i32::from(account.verified))),
            ("resettable", json!(i32::from(account.resettable))),
            ("registered", json!(account.registered)),
        ]);

        match self.storage.insert(&self.tables.qualify(USERS), fields).await {
            Ok(id) => Ok(id),
            Err(StorageError::UniqueViolation { .. }) => Err(AuthError::UserAlreadyExists),
            Err(fault) => Err(AuthError::Storage(fault)),
        }
    }

    /// Overwrite the password hash; returns the number of affected rows.
    pub async fn update_password(&self, user_id: UserId, password_hash: &str) -> Result<u64, AuthError> {
        let affected = self
            .storage
            .update(
                &self.tables.qualify(USERS),
                row_of(&[("password", json!(password_hash))]),
                row_of(&[("id", json!(user_id))]),
            )
            .await?;

        Ok(affected)
    }

    /// Number of accounts carrying the given username.
    pub async fn count_username_occurrences(&self, username: &str) -> Result<i64, AuthError> {
        let count = self
            .storage
            .select_count(&self.tables.qualify(USERS), row_of(&[("username", json!(username))]))
            .await?;

        Ok(count)
    }

    /// The account row with the given username, projected to `columns`.
    ///
    /// Usernames are not guaranteed unique at the storage layer unless the
    /// deployment enforces it, so ambiguity is an expected outcome that
    /// callers must handle, not an internal error.
    pub async fn fetch_by_username(
        &self,
        username: &str,
        columns: &[&str],
    ) -> Result<AccountRecord, AuthError> {
        let rows = self
            .storage
            .select(
                &self.tables.qualify(USERS),
                columns,
                row_of(&[("username", json!(username))]),
                Some(2),
            )
            .await?;

        match rows.as_slice() {
            [] => Err(AuthError::UnknownUsername),
            [row] => Ok(AccountRecord::from_row(row)),
            _ => Err(AuthError::AmbiguousUsername),
        }
    }

    /// Insert a pending email-confirmation row.
    pub async fn insert_confirmation_request(
        &self,
        request: &ConfirmationRequestRow,
    ) -> Result<(), AuthError> {
        let fields = row_of(&[
            ("user_id", json!(request.user_id)),
            ("email", json!(request.email)),
            ("selector", json!(request.selector)),
            ("token", json!(request.token_hash)),
            ("expires", json!(request.expires)),
        ]);

        self.storage
            .insert(&self.tables.qualify(USERS_CONFIRMATIONS), fields)
            .await?;

        Ok(())
    }

    /// Delete remember-me directives for the user: all of them, or only the
    /// one matching `selector` when given.
    pub async fn delete_remember_directives(
        &self,
        user_id: UserId,
        selector: Option<&str>,
    ) -> Result<u64, AuthError> {
        let mut where_eq = row_of(&[("user", json!(user_id))]);
        if let Some(selector) = selector {
            where_eq.insert("selector".to_string(), json!(selector));
        }

        let deleted = self
            .storage
            .delete(&self.tables.qualify(USERS_REMEMBERED), where_eq)
            .await?;

        Ok(deleted)
    }

    /// Bump the monotonic force-logout counter.
    ///
    /// The storage contract has no arithmetic update, so this is a
    /// read-then-write; a SQL adapter should instead issue
    /// `SET force_logout = force_logout + 1` in one statement. The counter
    /// only ever increases, so a lost race costs at most a repeated bump.
    pub async fn increment_force_logout(&self, user_id: UserId) -> Result<(), AuthError> {
        let table = self.tables.qualify(USERS);
        let rows = self
            .storage
            .select(&table, &["force_logout"], row_of(&[("id", json!(user_id))]), Some(1))
            .await?;

        let current = rows
            .first()
            .map(|row| AccountRecord::from_row(row).force_logout)
            .unwrap_or(0);

        self.storage
            .update(
                &table,
                row_of(&[("force_logout", json!(current + 1))]),
                row_of(&[("id", json!(user_id))]),
            )
            .await?;

        Ok(())
    }
}
