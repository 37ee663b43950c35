//! Table and column metadata discovered by introspection.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::identifier::Ident;
use super::value::Value;

/// Normalized storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Integer,
    Text,
    FloatingPoint,
    Other,
}

impl DeclaredType {
    /// Normalize a raw storage type string such as `int(11) unsigned`,
    /// `varchar(255)` or `double`.
    pub fn from_raw(raw_type: &str) -> Self {
        let lower = raw_type.trim().to_lowercase();
        let base = lower
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or("");

        match base {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" => {
                DeclaredType::Integer
            }
            "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum"
            | "set" => DeclaredType::Text,
            "float" | "double" | "real" | "decimal" | "numeric" => DeclaredType::FloatingPoint,
            _ => DeclaredType::Other,
        }
    }

    /// Zero value used when a NOT NULL column without default is omitted.
    pub fn zero_value(&self) -> Option<Value> {
        match self {
            DeclaredType::Integer => Some(Value::Integer(0)),
            DeclaredType::Text => Some(Value::Text(String::new())),
            DeclaredType::FloatingPoint => Some(Value::Float(0.0)),
            DeclaredType::Other => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclaredType::Integer => "integer",
            DeclaredType::Text => "text",
            DeclaredType::FloatingPoint => "floating point",
            DeclaredType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Column metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSchema {
    /// Column name.
    #[serde(serialize_with = "serialize_ident")]
    pub name: Ident,

    /// Raw storage type (e.g., "int(11)", "varchar(255)").
    pub raw_type: String,

    /// Normalized type tag.
    pub declared_type: DeclaredType,

    /// Whether the column allows NULL.
    pub nullable: bool,

    /// Whether storage defines a default value.
    pub has_default: bool,

    /// Whether this is the table's single auto-increment primary key.
    pub is_primary_key: bool,

    /// Ordinal position (1-based).
    pub ordinal: u32,
}

impl ColumnSchema {
    /// True when an omitted value must be synthesized on insert.
    pub fn requires_value(&self) -> bool {
        !self.nullable && !self.has_default && !self.is_primary_key
    }
}

fn serialize_ident<S: serde::Serializer>(ident: &Ident, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(ident.as_str())
}

/// Table metadata.
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    /// Table name.
    #[serde(serialize_with = "serialize_ident")]
    pub name: Ident,

    /// Columns in ordinal order.
    pub columns: Vec<ColumnSchema>,

    #[serde(skip)]
    by_name: HashMap<String, usize>,

    #[serde(skip)]
    primary_key: Option<usize>,
}

impl TableSchema {
    /// Assemble a table from its columns. The caller guarantees at most one
    /// primary-key column.
    pub(crate) fn new(name: Ident, mut columns: Vec<ColumnSchema>) -> Self {
        columns.sort_by_key(|c| c.ordinal);
        let by_name = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.as_str().to_string(), i))
            .collect();
        let primary_key = columns.iter().position(|c| c.is_primary_key);
        Self {
            name,
            columns,
            by_name,
            primary_key,
        }
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.by_name.get(name).map(|&i| &self.columns[i])
    }

    /// The primary-key column, if the table has one.
    pub fn primary_key(&self) -> Option<&ColumnSchema> {
        self.primary_key.map(|i| &self.columns[i])
    }

    /// Check if the table has a primary key.
    pub fn has_pk(&self) -> bool {
        self.primary_key.is_some()
    }

    /// Column names in ordinal order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
