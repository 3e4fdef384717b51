// ==============
// crates/auth-lib/src/tables.rs

//! Qualified table naming from an optional schema and an optional prefix.

/// Builds qualified table names for every storage access in this crate.
///
/// The schema qualifier may be a database name or a schema name; the prefix
/// lets several installations share one schema.
#[derive(Debug, Clone, Default)]
pub struct TableNames {
    schema: Option<String>,
    prefix: Option<String>,
}

impl TableNames {
    pub fn new(schema: Option<String>, prefix: Option<String>) -> Self {
        Self { schema, prefix }
    }

    /// The components of the qualified name: the schema (when configured and
    /// non-empty) followed by the prefixed table name. An empty table name
    /// yields no table component.
    pub fn components(&self, name: &str) -> Vec<String> {
        let mut components = Vec::new();

        if let Some(schema) = self.schema.as_deref() {
            if !schema.is_empty() {
                components.push(schema.to_string());
            }
        }

        if !name.is_empty() {
            match self.prefix.as_deref() {
                Some(prefix) if !prefix.is_empty() => {
                    components.push(format!("{prefix}{name}"));
                },
                _ => components.push(name.to_string()),
            }
        }

        components
    }

    /// The qualified name with components joined by `.`.
    pub fn qualify(&self, name: &str) -> String {
        self.components(name).join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_table_name_passes_through() {
        let tables = TableNames::default();
        assert_eq!(tables.qualify("users"), "users");
        assert_eq!(tables.components("users"), vec!["users"]);
    }

    #[test]
    fn prefix_is_fused_onto_the_table_component() {
        let tables = TableNames::new(None, Some("app_".to_string()));
        assert_eq!(tables.qualify("users"), "app_users");
        assert_eq!(tables.components("users"), vec!["app_users"]);
    }

    #[test]
    fn schema_leads_the_qualified_name() {
        let tables = TableNames::new(Some("auth".to_string()), Some("app_".to_string()));
        assert_eq!(tables.qualify("users"), "auth.app_users");
        assert_eq!(tables.components("users"), vec!["auth", "app_users"]);
    }

    #[test]
    fn empty_schema_and_prefix_are_ignored() {
        let tables = TableNames::new(Some(String::new()), Some(String::new()));
        assert_eq!(tables.qualify("users"), "users");
    }

    #[test]
    fn empty_table_name_yields_no_table_component() {
        let tables = TableNames::new(Some("auth".to_string()), Some("app_".to_string()));
        assert_eq!(tables.components(""), vec!["auth"]);
        assert_eq!(tables.qualify(""), "auth");
    }
}
