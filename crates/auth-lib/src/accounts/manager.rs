// ============================
// crates/auth-lib/src/accounts/manager.rs
// ============================
//! The account-lifecycle orchestrator: creation with conditional email
//! verification, confirmation-request issuance, password updates, and
//! forced logout.
use crate::accounts::AccountStore;
use crate::auth::{password, token_generator};
use crate::config::Settings;
use crate::error::AuthError;
use crate::metrics::{ACCOUNT_CREATED, CONFIRMATION_ISSUED, FORCE_LOGOUT, PASSWORD_UPDATED};
use crate::now_secs;
use crate::validation;
use credence_common::{ConfirmationRequestRow, NewAccount, UserId};
use metrics::counter;
use std::sync::Arc;

/// Length of confirmation selectors and token secrets.
const CONFIRMATION_TOKEN_LENGTH: usize = 16;

/// Delivery hook for confirmation email content.
///
/// Receives the public selector and the plaintext token secret; this is the
/// only point where the plaintext token exists outside the generator. The
/// hook is a per-call capability, never process-wide state.
pub type ConfirmationMailer<'a> = &'a (dyn Fn(&str, &str) + Send + Sync);

#[derive(Clone)]
pub struct AccountManager {
    store: AccountStore,
    settings: Arc<Settings>,
}

impl AccountManager {
    pub fn new(store: AccountStore, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }

    /// The underlying data-access boundary, for callers that resolve
    /// accounts themselves (e.g. a username login path).
    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Creates a new account and returns its id.
    ///
    /// With no `callback` the account starts out verified and usable
    /// immediately. With a callback it starts unverified and a confirmation
    /// request is issued for the new account's address; enforcing the
    /// "unusable until verified" restriction is the embedding
    /// application's job.
    ///
    /// The username-uniqueness pre-check here is a fast path; under
    /// concurrent signups only a storage-level unique constraint (surfaced
    /// as `UserAlreadyExists`) truly closes the check-then-insert window.
    pub async fn create_account(
        &self,
        require_unique_username: bool,
        email: &str,
        password: &str,
        username: Option<&str>,
        callback: Option<ConfirmationMailer<'_>>,
    ) -> Result<UserId, AuthError> {
        let email = validation::validate_email(email)?;
        let password = validation::validate_password(password)?;
        let username = validation::normalize_username(username);

        if require_unique_username {
            if let Some(name) = username.as_deref() {
                if self.store.count_username_occurrences(name).await? > 0 {
                    return Err(AuthError::DuplicateUsername);
                }
            }
        }

        let password_hash =
            password::hash_password(&password).map_err(|e| AuthError::Internal(e.to_string()))?;
        let verified = callback.is_none();

        let account = NewAccount {
            email: email.clone(),
            password_hash,
            username,
            verified,
            resettable: true,
            registered: now_secs(),
        };
        let new_user_id = self.store.insert_account(&account).await?;

        counter!(ACCOUNT_CREATED).increment(1);
        tracing::info!(user_id = new_user_id, verified, "account created");

        if !verified {
            self.create_confirmation_request(new_user_id, &email, callback)
                .await?;
        }

        Ok(new_user_id)
    }

    /// Creates a request for email confirmation.
    ///
    /// The selector and the token secret come from two independent draws;
    /// only the token's hash is persisted. The callback receives the
    /// selector and the plaintext token, both of which the user must
    /// present again to confirm. A missing callback is a programming error
    /// at the call site, not a recoverable runtime condition.
    pub async fn create_confirmation_request(
        &self,
        user_id: UserId,
        email: &str,
        callback: Option<ConfirmationMailer<'_>>,
    ) -> Result<(), AuthError> {
        let selector = token_generator::new_random_token_with_length(CONFIRMATION_TOKEN_LENGTH);
        let token = token_generator::new_random_token_with_length(CONFIRMATION_TOKEN_LENGTH);
        let token_hash =
            token_generator::hash_token(&token).map_err(|e| AuthError::Internal(e.to_string()))?;

        let request = ConfirmationRequestRow {
            user_id,
            email: email.to_string(),
            selector: selector.clone(),
            token_hash,
            expires: now_secs() + self.settings.confirmation_ttl_secs,
        };
        self.store.insert_confirmation_request(&request).await?;

        counter!(CONFIRMATION_ISSUED).increment(1);
        tracing::debug!(user_id, "confirmation request issued");

        match callback {
            Some(deliver) => {
                deliver(&selector, &token);
                Ok(())
            },
            None => Err(AuthError::MissingCallback),
        }
    }

    /// Updates the given user's password.
    pub async fn update_password(&self, user_id: UserId, new_password: &str) -> Result<(), AuthError> {
        let password_hash = password::hash_password(new_password)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let affected = self.store.update_password(user_id, &password_hash).await?;
        if affected == 0 {
            return Err(AuthError::UnknownAccount);
        }

        counter!(PASSWORD_UPDATED).increment(1);
        tracing::debug!(user_id, "password updated");

        Ok(())
    }

    /// Triggers a forced logout in all sessions that belong to the user.
    ///
    /// Deletes the remember-me directives, then bumps the force-logout
    /// counter. A partial failure leaves the account transiently
    /// inconsistent but self-healing: a retry re-runs both steps, and a
    /// stale remembered session is still invalidated by the counter bump.
    pub async fn force_logout_for_account(&self, user_id: UserId) -> Result<(), AuthError> {
        self.store.delete_remember_directives(user_id, None).await?;
        self.store.increment_force_logout(user_id).await?;

        counter!(FORCE_LOGOUT).increment(1);
        tracing::info!(user_id, "forced logout");

        Ok(())
    }
}
