// ==============
// crates/auth-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const ACCOUNT_CREATED: &str = "account.created";
pub const CONFIRMATION_ISSUED: &str = "account.confirmation_issued";
pub const PASSWORD_UPDATED: &str = "account.password_updated";
pub const FORCE_LOGOUT: &str = "account.force_logout";
pub const SESSION_ROTATED: &str = "session.rotated";
pub const SESSION_ACTIVE: &str = "session.active";
