// ============================
// crates/auth-lib/src/storage.rs
// ============================
//! Storage abstraction with an in-memory implementation.
//!
//! The account core never speaks SQL itself; it goes through this trait,
//! which any relational adapter can implement. Backends must report
//! unique-constraint violations distinctly from generic faults so that the
//! account layer can translate them into business-rule errors.
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

pub use credence_common::Row;

/// Faults a storage backend may signal.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("unique constraint violated on {table}.{column}")]
    UniqueViolation { table: String, column: String },

    #[error("backend fault: {0}")]
    Backend(String),
}

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a row and return the generated id.
    async fn insert(&self, table: &str, fields: Row) -> Result<i64, StorageError>;

    /// Update all rows matching the equality predicate; returns the number
    /// of affected rows.
    async fn update(&self, table: &str, fields: Row, where_eq: Row) -> Result<u64, StorageError>;

    /// Delete all rows matching the equality predicate; returns the number
    /// of deleted rows.
    async fn delete(&self, table: &str, where_eq: Row) -> Result<u64, StorageError>;

    /// Select rows matching the equality predicate, projected to `columns`
    /// (empty projection returns whole rows).
    async fn select(
        &self,
        table: &str,
        columns: &[&str],
        where_eq: Row,
        limit: Option<usize>,
    ) -> Result<Vec<Row>, StorageError>;

    /// Count rows matching the equality predicate.
    async fn select_count(&self, table: &str, where_eq: Row) -> Result<i64, StorageError>;
}

#[derive(Default)]
struct TableData {
    rows: Vec<Row>,
    next_id: i64,
}

/// In-memory implementation of the `Storage` trait.
///
/// Tables are created implicitly on first insert. Declared unique indexes
/// are enforced on insert and update, which makes this backend the
/// authoritative guard against duplicate-credential races; the account
/// layer's own pre-checks are a fast path only.
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, TableData>>,
    unique_indexes: Vec<(String, String)>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            unique_indexes: Vec::new(),
        }
    }

    /// Declare a unique index on `table.column`. Null values are exempt,
    /// matching how SQL unique indexes treat NULL.
    pub fn with_unique_index(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.unique_indexes.push((table.into(), column.into()));
        self
    }

    fn check_unique(
        &self,
        table: &str,
        data: &TableData,
        fields: &Row,
        skip_row: Option<usize>,
    ) -> Result<(), StorageError> {
        for (index_table, column) in &self.unique_indexes {
            if index_table != table {
                continue;
            }
            let candidate = match fields.get(column.as_str()) {
                Some(value) if !value.is_null() => value,
                _ => continue,
            };
            let collision = data.rows.iter().enumerate().any(|(position, row)| {
                Some(position) != skip_row && row.get(column.as_str()) == Some(candidate)
            });
            if collision {
                return Err(StorageError::UniqueViolation {
                    table: table.to_string(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(row: &Row, where_eq: &Row) -> bool {
    where_eq
        .iter()
        .all(|(column, expected)| row.get(column).unwrap_or(&Value::Null) == expected)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert(&self, table: &str, mut fields: Row) -> Result<i64, StorageError> {
        let mut tables = self.tables.write().await;
        let data = tables.entry(table.to_string()).or_default();

        self.check_unique(table, data, &fields, None)?;

        data.next_id += 1;
        let id = data.next_id;
        fields.insert("id".to_string(), Value::from(id));
        data.rows.push(fields);

        Ok(id)
    }

    async fn update(&self, table: &str, fields: Row, where_eq: Row) -> Result<u64, StorageError> {
        let mut tables = self.tables.write().await;
        let Some(data) = tables.get_mut(table) else {
            return Ok(0);
        };

        let targets: Vec<usize> = data
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches(row, &where_eq))
            .map(|(position, _)| position)
            .collect();

        for &position in &targets {
            let merged: Row = {
                let mut merged = data.rows[position].clone();
                for (column, value) in &fields {
                    merged.insert(column.clone(), value.clone());
                }
                merged
            };
            self.check_unique(table, data, &merged, Some(position))?;
            data.rows[position] = merged;
        }

        Ok(targets.len() as u64)
    }

    async fn delete(&self, table: &str, where_eq: Row) -> Result<u64, StorageError> {
        let mut tables = self.tables.write().await;
        let Some(data) = tables.get_mut(table) else {
            return Ok(0);
        };

        let before = data.rows.len();
        data.rows.retain(|row| !matches(row, &where_eq));

        Ok((before - data.rows.len()) as u64)
    }

    async fn select(
        &self,
        table: &str,
        columns: &[&str],
        where_eq: Row,
        limit: Option<usize>,
    ) -> Result<Vec<Row>, StorageError> {
        let tables = self.tables.read().await;
        let Some(data) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for row in data.rows.iter().filter(|row| matches(row, &where_eq)) {
            let projected = if columns.is_empty() {
                row.clone()
            } else {
                columns
                    .iter()
                    .filter_map(|column| {
                        row.get(*column)
                            .map(|value| ((*column).to_string(), value.clone()))
                    })
                    .collect()
            };
            results.push(projected);

            if let Some(limit) = limit {
                if results.len() >= limit {
                    break;
                }
            }
        }

        Ok(results)
    }

    async fn select_count(&self, table: &str, where_eq: Row) -> Result<i64, StorageError> {
        let tables = self.tables.read().await;
        let Some(data) = tables.get(table) else {
            return Ok(0);
        };

        Ok(data.rows.iter().filter(|row| matches(row, &where_eq)).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let storage = MemoryStorage::new();

        let first = storage
            .insert("users", row(&[("email", json!("a@example.com"))]))
            .await
            .unwrap();
        let second = storage
            .insert("users", row(&[("email", json!("b@example.com"))]))
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicates() {
        let storage = MemoryStorage::new().with_unique_index("users", "username");

        storage
            .insert("users", row(&[("username", json!("alice"))]))
            .await
            .unwrap();
        let result = storage
            .insert("users", row(&[("username", json!("alice"))]))
            .await;

        assert!(matches!(
            result,
            Err(StorageError::UniqueViolation { .. })
        ));

        // Null values are exempt, as in SQL
        storage
            .insert("users", row(&[("username", Value::Null)]))
            .await
            .unwrap();
        storage
            .insert("users", row(&[("username", Value::Null)]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_affects_only_matching_rows() {
        let storage = MemoryStorage::new();

        let id = storage
            .insert("users", row(&[("verified", json!(0))]))
            .await
            .unwrap();
        storage
            .insert("users", row(&[("verified", json!(0))]))
            .await
            .unwrap();

        let affected = storage
            .update(
                "users",
                row(&[("verified", json!(1))]),
                row(&[("id", json!(id))]),
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let missing = storage
            .update(
                "users",
                row(&[("verified", json!(1))]),
                row(&[("id", json!(999))]),
            )
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }

    #[tokio::test]
    async fn select_projects_and_limits() {
        let storage = MemoryStorage::new();
        for name in ["alice", "alice", "bob"] {
            storage
                .insert(
                    "users",
                    row(&[("username", json!(name)), ("verified", json!(1))]),
                )
                .await
                .unwrap();
        }

        let rows = storage
            .select(
                "users",
                &["username"],
                row(&[("username", json!("alice"))]),
                Some(2),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 1);
        assert!(rows[0].contains_key("username"));

        let count = storage
            .select_count("users", row(&[("username", json!("alice"))]))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn delete_by_predicate() {
        let storage = MemoryStorage::new();
        storage
            .insert("tokens", row(&[("user", json!(1)), ("selector", json!("s1"))]))
            .await
            .unwrap();
        storage
            .insert("tokens", row(&[("user", json!(1)), ("selector", json!("s2"))]))
            .await
            .unwrap();
        storage
            .insert("tokens", row(&[("user", json!(2)), ("selector", json!("s3"))]))
            .await
            .unwrap();

        let deleted = storage
            .delete("tokens", row(&[("user", json!(1))]))
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        let remaining = storage.select_count("tokens", Row::new()).await.unwrap();
        assert_eq!(remaining, 1);
    }
}
