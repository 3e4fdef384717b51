// crates/auth-lib/src/error.rs

//! Central error type + Axum integration.
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Account-core error taxonomy.
///
/// Validation and business-rule variants are recoverable by the caller;
/// `MissingCallback` is a programmer error at the call site; rotation,
/// internal, and storage faults propagate unmodified to the outermost
/// caller and must never be caught and hidden inside this crate.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("An account with these credentials already exists")]
    UserAlreadyExists,

    #[error("No account with the specified id")]
    UnknownAccount,

    #[error("No account with the specified username")]
    UnknownUsername,

    #[error("Multiple accounts share the specified username")]
    AmbiguousUsername,

    #[error("No confirmation callback was supplied")]
    MissingCallback,

    #[error("Session rotation failed: {0}")]
    SessionRotation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidEmail(_) | AuthError::InvalidPassword(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateUsername
            | AuthError::UserAlreadyExists
            | AuthError::AmbiguousUsername => StatusCode::CONFLICT,
            AuthError::UnknownAccount | AuthError::UnknownUsername => StatusCode::NOT_FOUND,
            AuthError::MissingCallback
            | AuthError::SessionRotation(_)
            | AuthError::Internal(_)
            | AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail(_) => "VAL_001",
            AuthError::InvalidPassword(_) => "VAL_002",
            AuthError::DuplicateUsername => "ACCT_001",
            AuthError::UserAlreadyExists => "ACCT_002",
            AuthError::UnknownAccount => "ACCT_003",
            AuthError::UnknownUsername => "ACCT_004",
            AuthError::AmbiguousUsername => "ACCT_005",
            AuthError::MissingCallback => "CONF_001",
            AuthError::SessionRotation(_) => "SESS_001",
            AuthError::Internal(_) => "INT_001",
            AuthError::Storage(_) => "STORE_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
            AuthError::InvalidPassword(_) => "Invalid password".to_string(),
            AuthError::DuplicateUsername => "Username is already taken".to_string(),
            AuthError::UserAlreadyExists => {
                "An account with these credentials already exists".to_string()
            },
            AuthError::UnknownAccount
            | AuthError::UnknownUsername => "Account not found".to_string(),
            AuthError::AmbiguousUsername => {
                "Username does not identify a single account".to_string()
            },
            AuthError::MissingCallback
            | AuthError::SessionRotation(_)
            | AuthError::Internal(_)
            | AuthError::Storage(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_auth_error_display() {
        let email_error = AuthError::InvalidEmail("missing @".to_string());
        assert_eq!(email_error.to_string(), "Invalid email address: missing @");

        assert_eq!(
            AuthError::DuplicateUsername.to_string(),
            "Username is already taken"
        );

        let storage_error = AuthError::Storage(StorageError::Backend("timeout".to_string()));
        assert!(storage_error.to_string().contains("Storage error"));
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            AuthError::InvalidEmail("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::DuplicateUsername.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::UserAlreadyExists.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::UnknownUsername.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::AmbiguousUsername.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::MissingCallback.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::Storage(StorageError::Backend("down".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_error_codes() {
        assert_eq!(
            AuthError::InvalidPassword("empty".to_string()).error_code(),
            "VAL_002"
        );
        assert_eq!(AuthError::DuplicateUsername.error_code(), "ACCT_001");
        assert_eq!(AuthError::UnknownAccount.error_code(), "ACCT_003");
        assert_eq!(AuthError::MissingCallback.error_code(), "CONF_001");
        assert_eq!(
            AuthError::SessionRotation("lost".to_string()).error_code(),
            "SESS_001"
        );
    }

    #[test]
    fn test_unique_violation_maps_through_storage_variant() {
        let err: AuthError = StorageError::UniqueViolation {
            table: "users".to_string(),
            column: "username".to_string(),
        }
        .into();
        assert!(matches!(err, AuthError::Storage(_)));
    }

    #[test]
    fn test_auth_error_into_response() {
        let error = AuthError::UnknownUsername;
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("application/json"));
    }
}
