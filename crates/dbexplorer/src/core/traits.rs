//! Core traits at the seams between the engine and a database.
//!
//! - [`Dialect`]: SQL syntax strategy (identifier quoting, placeholders)
//! - [`Storage`]: introspection and statement execution against one database

use async_trait::async_trait;

use crate::codec::RawRow;
use crate::error::Result;
use crate::query::Query;

use super::identifier::Ident;

/// SQL syntax strategy for a database engine.
pub trait Dialect: Send + Sync {
    /// Dialect name (e.g., "mysql").
    fn name(&self) -> &str;

    /// Quote a catalog identifier for inclusion in SQL text.
    fn quote_ident(&self, ident: &Ident) -> String;

    /// Placeholder for the bound parameter at `index` (1-based).
    fn param_placeholder(&self, index: usize) -> String;
}

/// One column as reported by introspection, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    /// Column name.
    pub name: String,
    /// Full storage type, e.g. "int(11) unsigned".
    pub column_type: String,
    /// Whether the column allows NULL.
    pub nullable: bool,
    /// Storage default expression, if any.
    pub default: Option<String>,
    /// Key flag ("PRI", "UNI", "MUL" or empty).
    pub key: String,
    /// Extra flags (e.g. "auto_increment").
    pub extra: String,
    /// Ordinal position (1-based).
    pub ordinal: u32,
}

impl RawColumn {
    /// Single auto-increment primary key column.
    pub fn is_auto_increment_pk(&self) -> bool {
        self.key.eq_ignore_ascii_case("PRI") && self.extra.to_lowercase().contains("auto_increment")
    }
}

/// Result of a statement that modifies rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Rows affected by the statement.
    pub rows_affected: u64,
    /// Identifier generated by an auto-increment column, if any.
    pub last_insert_id: Option<u64>,
}

/// Access to one database: schema introspection plus single-round-trip
/// statement execution.
///
/// Implementations own their connection pooling. Each call acquires a
/// connection and releases it before returning, on success and error alike.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Names of all base tables, in discovery order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Column metadata for one table.
    async fn describe_table(&self, table: &str) -> Result<Vec<RawColumn>>;

    /// Run a row-returning statement.
    async fn fetch(&self, query: &Query) -> Result<Vec<RawRow>>;

    /// Run a row-modifying statement.
    async fn execute(&self, query: &Query) -> Result<ExecOutcome>;

    /// Round trip to check connectivity.
    async fn ping(&self) -> Result<()>;

    /// Get the database type identifier (e.g., "mysql", "memory").
    fn db_type(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(key: &str, extra: &str) -> RawColumn {
        RawColumn {
            name: "id".into(),
            column_type: "int(11)".into(),
            nullable: false,
            default: None,
            key: key.into(),
            extra: extra.into(),
            ordinal: 1,
        }
    }

    #[test]
    fn test_auto_increment_pk_detection() {
        assert!(raw("PRI", "auto_increment").is_auto_increment_pk());
        assert!(raw("pri", "AUTO_INCREMENT").is_auto_increment_pk());
        // natural keys are not treated as engine-addressable primary keys
        assert!(!raw("PRI", "").is_auto_increment_pk());
        assert!(!raw("UNI", "auto_increment").is_auto_increment_pk());
    }
}
