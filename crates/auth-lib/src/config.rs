// ============================
// crates/auth-lib/src/config.rs
// ============================
//! Configuration management.
use crate::tables::TableNames;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::Deserialize;

/// Core settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Schema qualifier for all tables used by this crate
    pub db_schema: Option<String>,
    /// Prefix for the names of all tables used by this crate
    pub db_table_prefix: Option<String>,
    /// Lifetime of email-confirmation requests in seconds
    pub confirmation_ttl_secs: i64,
    /// Whether new accounts must carry a unique username
    pub require_unique_username: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_schema: None,
            db_table_prefix: None,
            confirmation_ttl_secs: 60 * 60 * 24, // 24 hours
            require_unique_username: false,
        }
    }
}

impl Settings {
    /// Table naming derived from the configured schema and prefix.
    pub fn table_names(&self) -> TableNames {
        TableNames::new(self.db_schema.clone(), self.db_table_prefix.clone())
    }
}

/// Load settings from various sources
pub fn load_settings() -> Result<Settings> {
    // Try to load from config files first, then environment variables
    let settings = Figment::new()
        .merge(Toml::file("credence.toml"))
        .merge(Yaml::file("credence.yaml"))
        .merge(Json::file("credence.json"))
        .merge(Env::prefixed("CREDENCE_"))
        .extract()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();

        assert_eq!(settings.confirmation_ttl_secs, 86_400);
        assert!(!settings.require_unique_username);
        assert_eq!(settings.table_names().qualify("users"), "users");
    }

    #[test]
    fn table_names_pick_up_schema_and_prefix() {
        let settings = Settings {
            db_schema: Some("auth".to_string()),
            db_table_prefix: Some("app_".to_string()),
            ..Settings::default()
        };

        assert_eq!(settings.table_names().qualify("users"), "auth.app_users");
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "db_table_prefix": "acme_" }"#).unwrap();

        assert_eq!(settings.db_table_prefix.as_deref(), Some("acme_"));
        assert_eq!(settings.confirmation_ttl_secs, 86_400);
    }
}
