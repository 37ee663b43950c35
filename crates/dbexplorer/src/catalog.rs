//! Schema catalog: every table and column of the connected database,
//! introspected once at startup.
//!
//! Construction is two-phase. [`CatalogBuilder`] is mutable and only lives
//! inside [`SchemaCatalog::load`]; [`SchemaCatalog`] is immutable once built,
//! so concurrent readers share it through an `Arc` without locking.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::core::identifier::Ident;
use crate::core::schema::{ColumnSchema, DeclaredType, TableSchema};
use crate::core::traits::{RawColumn, Storage};
use crate::error::{ExplorerError, Result};

/// Immutable description of all tables in the connected database.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    names: Vec<String>,
    tables: HashMap<String, TableSchema>,
}

impl SchemaCatalog {
    /// Introspect every table through `storage`.
    ///
    /// Any introspection error fails the whole load; there is no partial
    /// catalog.
    pub async fn load(storage: &dyn Storage) -> Result<Self> {
        let table_names = storage
            .list_tables()
            .await
            .map_err(|e| ExplorerError::schema_load(format!("listing tables: {}", e)))?;

        let mut builder = CatalogBuilder::new();
        for name in table_names {
            let columns = storage.describe_table(&name).await.map_err(|e| {
                ExplorerError::schema_load(format!("describing table {}: {}", name, e))
            })?;
            debug!("Table {}: {} columns", name, columns.len());
            builder.add_table(&name, columns)?;
        }

        let catalog = builder.build();
        info!(
            "Loaded schema catalog from {}: {} tables",
            storage.db_type(),
            catalog.names.len()
        );
        Ok(catalog)
    }

    /// Check if a table was discovered.
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in discovery order.
    pub fn table_names(&self) -> &[String] {
        &self.names
    }

    /// Schema of a table, `None` if unknown.
    pub fn columns(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    /// The table's primary-key column, `None` if the table is unknown or has
    /// no auto-increment primary key.
    pub fn primary_key(&self, table: &str) -> Option<&ColumnSchema> {
        self.tables.get(table).and_then(TableSchema::primary_key)
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the database has no tables.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Mutable accumulator used while loading.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    names: Vec<String>,
    tables: HashMap<String, TableSchema>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and add one table's columns.
    pub fn add_table(&mut self, name: &str, raw_columns: Vec<RawColumn>) -> Result<&mut Self> {
        if raw_columns.is_empty() {
            return Err(ExplorerError::schema_load(format!(
                "table {} has no columns",
                name
            )));
        }
        if self.tables.contains_key(name) {
            return Err(ExplorerError::schema_load(format!(
                "table {} listed twice",
                name
            )));
        }

        let columns = raw_columns
            .into_iter()
            .map(normalize_column)
            .collect::<Result<Vec<_>>>()?;

        let pk_count = columns.iter().filter(|c| c.is_primary_key).count();
        if pk_count > 1 {
            return Err(ExplorerError::schema_load(format!(
                "table {} has {} auto-increment primary key columns",
                name, pk_count
            )));
        }

        let table = TableSchema::new(Ident::trusted(name)?, columns);
        self.names.push(name.to_string());
        self.tables.insert(name.to_string(), table);
        Ok(self)
    }

    /// Freeze into an immutable catalog.
    pub fn build(self) -> SchemaCatalog {
        SchemaCatalog {
            names: self.names,
            tables: self.tables,
        }
    }
}

fn normalize_column(raw: RawColumn) -> Result<ColumnSchema> {
    let is_primary_key = raw.is_auto_increment_pk();
    // Generated columns are computed by the server and never take a value
    let has_default =
        raw.default.is_some() || raw.extra.to_ascii_uppercase().contains("GENERATED");
    Ok(ColumnSchema {
        name: Ident::trusted(raw.name)?,
        declared_type: DeclaredType::from_raw(&raw.column_type),
        raw_type: raw.column_type,
        nullable: raw.nullable,
        has_default,
        is_primary_key,
        ordinal: raw.ordinal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::memory::{MemoryStorage, MemoryTable};
    use std::sync::Arc;

    fn raw(name: &str, ty: &str, nullable: bool, ordinal: u32) -> RawColumn {
        RawColumn {
            name: name.into(),
            column_type: ty.into(),
            nullable,
            default: None,
            key: String::new(),
            extra: String::new(),
            ordinal,
        }
    }

    fn pk(name: &str) -> RawColumn {
        RawColumn {
            key: "PRI".into(),
            extra: "auto_increment".into(),
            ..raw(name, "int(11)", false, 1)
        }
    }

    #[test]
    fn test_builder_normalizes_columns() {
        let mut builder = CatalogBuilder::new();
        builder
            .add_table(
                "users",
                vec![
                    pk("id"),
                    raw("name", "varchar(255)", false, 2),
                    RawColumn {
                        default: Some("0".into()),
                        ..raw("age", "int(11)", true, 3)
                    },
                ],
            )
            .unwrap();
        let catalog = builder.build();

        assert!(catalog.table_exists("users"));
        assert!(!catalog.table_exists("Users"));
        let users = catalog.columns("users").unwrap();
        let name = users.column("name").unwrap();
        assert_eq!(name.declared_type, DeclaredType::Text);
        assert!(!name.nullable);
        assert!(users.column("age").unwrap().has_default);
        assert_eq!(catalog.primary_key("users").unwrap().name.as_str(), "id");
    }

    #[test]
    fn test_builder_rejects_empty_table() {
        let mut builder = CatalogBuilder::new();
        let err = builder.add_table("empty", vec![]).unwrap_err();
        assert!(matches!(err, ExplorerError::SchemaLoad(_)));
    }

    #[test]
    fn test_builder_rejects_two_primary_keys() {
        let mut builder = CatalogBuilder::new();
        let mut second = pk("other_id");
        second.ordinal = 2;
        assert!(builder.add_table("t", vec![pk("id"), second]).is_err());
    }

    #[test]
    fn test_table_without_auto_increment_has_no_pk() {
        let mut builder = CatalogBuilder::new();
        let natural = RawColumn {
            key: "PRI".into(),
            ..raw("code", "varchar(10)", false, 1)
        };
        builder.add_table("countries", vec![natural]).unwrap();
        let catalog = builder.build();
        assert!(catalog.primary_key("countries").is_none());
    }

    #[test]
    fn test_generated_column_counts_as_defaulted() {
        let mut builder = CatalogBuilder::new();
        builder
            .add_table(
                "lines",
                vec![
                    pk("id"),
                    RawColumn {
                        extra: "STORED GENERATED".into(),
                        ..raw("total", "int(11)", false, 2)
                    },
                ],
            )
            .unwrap();
        let catalog = builder.build();
        let total = catalog.columns("lines").unwrap().column("total").unwrap();
        assert!(total.has_default);
        assert!(!total.requires_value());
    }

    #[test]
    fn test_primary_key_unknown_table() {
        let catalog = CatalogBuilder::new().build();
        assert!(catalog.primary_key("nope").is_none());
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_load_preserves_discovery_order() {
        let storage = MemoryStorage::new()
            .with_table(MemoryTable::new("zebra", vec![pk("id")]))
            .with_table(MemoryTable::new("apple", vec![pk("id")]))
            .with_table(MemoryTable::new("mango", vec![pk("id")]));

        let catalog = SchemaCatalog::load(&storage).await.unwrap();
        assert_eq!(catalog.table_names(), ["zebra", "apple", "mango"]);
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn test_load_fails_on_table_without_columns() {
        let storage = MemoryStorage::new().with_table(MemoryTable::new("broken", vec![]));
        let err = SchemaCatalog::load(&storage).await.unwrap_err();
        assert!(matches!(err, ExplorerError::SchemaLoad(_)));
    }

    #[tokio::test]
    async fn test_load_fails_when_introspection_fails() {
        let storage = MemoryStorage::new().fail_introspection("access denied");
        let err = SchemaCatalog::load(&storage).await.unwrap_err();
        assert!(err.to_string().contains("access denied"));
    }

    #[tokio::test]
    async fn test_concurrent_reads_are_stable() {
        let storage = MemoryStorage::new()
            .with_table(MemoryTable::new("a", vec![pk("id")]))
            .with_table(MemoryTable::new("b", vec![raw("x", "text", true, 1)]));
        let catalog = Arc::new(SchemaCatalog::load(&storage).await.unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                tokio::spawn(async move {
                    (
                        catalog.table_names().to_vec(),
                        catalog.primary_key("a").map(|c| c.name.as_str().to_string()),
                        catalog.primary_key("b").is_none(),
                        catalog.columns("b").map(|t| t.columns.len()),
                    )
                })
            })
            .collect();

        for handle in handles {
            let (names, pk_a, b_has_no_pk, b_cols) = handle.await.unwrap();
            assert_eq!(names, ["a", "b"]);
            assert_eq!(pk_a.as_deref(), Some("id"));
            assert!(b_has_no_pk);
            assert_eq!(b_cols, Some(1));
        }
    }
}
