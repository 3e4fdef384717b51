// ================
// crates/common/src/lib.rs
// ================
//! Common types shared between the `Credence` account core and the
//! application embedding it.
//! This crate defines the persisted row shapes and the session identity
//! snapshot; it carries no behavior beyond construction and coercion.

use serde::{Deserialize, Serialize};

/// Opaque account identifier, assigned by storage on insert.
pub type UserId = i64;

/// A storage result row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Account status, stored as an integer column.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Normal = 0,
    Archived = 1,
    Banned = 2,
    Locked = 3,
    PendingReview = 4,
    Suspended = 5,
}

impl Status {
    /// Numeric form used in storage rows.
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    /// Maps the stored integer back to a status; unknown values fall back
    /// to `Normal`, matching how the column is read elsewhere.
    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => Status::Archived,
            2 => Status::Banned,
            3 => Status::Locked,
            4 => Status::PendingReview,
            5 => Status::Suspended,
            _ => Status::Normal,
        }
    }
}

/// Role bitmask. Roles are assigned by the embedding application; the core
/// only transports the mask between storage and session state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Roles(pub u32);

impl Roles {
    pub const NONE: Roles = Roles(0);
    pub const ADMIN: Roles = Roles(1);
    pub const AUTHOR: Roles = Roles(2);
    pub const COLLABORATOR: Roles = Roles(4);
    pub const CONSUMER: Roles = Roles(8);
    pub const CONTRIBUTOR: Roles = Roles(16);
    pub const EDITOR: Roles = Roles(32);
    pub const MAINTAINER: Roles = Roles(64);
    pub const MODERATOR: Roles = Roles(128);
    pub const REVIEWER: Roles = Roles(256);
    pub const SUBSCRIBER: Roles = Roles(512);
    pub const SUPER_ADMIN: Roles = Roles(1024);

    /// Whether every bit of `role` is set in this mask.
    pub fn has(self, role: Roles) -> bool {
        role.0 != 0 && self.0 & role.0 == role.0
    }

    pub fn with(self, role: Roles) -> Roles {
        Roles(self.0 | role.0)
    }

    pub fn without(self, role: Roles) -> Roles {
        Roles(self.0 & !role.0)
    }
}

/// The authenticated identity snapshot written into session state on any
/// successful login path.
///
/// `force_logout` is the counter value cached at login time; the embedding
/// application must periodically re-compare it against the account's live
/// counter and invalidate the session on mismatch. `last_resync` records
/// when that comparison last happened.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SessionIdentity {
    pub logged_in: bool,
    pub user_id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub status: Status,
    pub roles: Roles,
    pub force_logout: i64,
    pub remembered: bool,
    pub last_resync: i64,
}

/// Field set for a new account row. The password arrives here already
/// hashed; plaintext never crosses this boundary.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub username: Option<String>,
    pub verified: bool,
    pub resettable: bool,
    pub registered: i64,
}

/// Field set for a pending email-confirmation row. `token_hash` is the
/// hashed-at-rest form; the plaintext token exists only in the delivery
/// callback.
#[derive(Debug, Clone)]
pub struct ConfirmationRequestRow {
    pub user_id: UserId,
    pub email: String,
    pub selector: String,
    pub token_hash: String,
    pub expires: i64,
}

/// A fully hydrated account row.
///
/// Construction is tolerant of the value shapes different storage adapters
/// produce: integers may arrive as any JSON number, as numeric strings, or
/// (for flag columns) as booleans.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: UserId,
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
    pub status: Status,
    pub verified: bool,
    pub resettable: bool,
    pub roles_mask: Roles,
    pub registered: i64,
    pub last_login: i64,
    pub force_logout: i64,
    pub internal_notes: Option<String>,
}

impl AccountRecord {
    /// Hydrates a record from a storage row. Missing columns default to
    /// zero/`None`, so callers may project only the columns they need.
    pub fn from_row(row: &Row) -> Self {
        AccountRecord {
            id: row_i64(row, "id"),
            email: row_str(row, "email"),
            password: row_str(row, "password"),
            username: row_str(row, "username"),
            status: Status::from_i64(row_i64(row, "status")),
            verified: row_i64(row, "verified") != 0,
            resettable: row_i64(row, "resettable") != 0,
            roles_mask: Roles(row_i64(row, "roles_mask") as u32),
            registered: row_i64(row, "registered"),
            last_login: row_i64(row, "last_login"),
            force_logout: row_i64(row, "force_logout"),
            internal_notes: row_str(row, "internal_notes"),
        }
    }
}

fn row_i64(row: &Row, key: &str) -> i64 {
    match row.get(key) {
        Some(serde_json::Value::Number(n)) => {
            n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0)
        }
        Some(serde_json::Value::Bool(b)) => i64::from(*b),
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn row_str(row: &Row, key: &str) -> Option<String> {
    match row.get(key) {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}
