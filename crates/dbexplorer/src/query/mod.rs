//! Structured statements for dynamic CRUD.
//!
//! A [`Query`] names its table and columns with [`Ident`]s, which only the
//! catalog can create, and carries every caller value as a bound parameter.
//! Rendering to SQL text happens in [`render`], through a [`Dialect`], so no
//! path exists from request data to SQL structure.
//!
//! [`Dialect`]: crate::core::Dialect

mod render;

pub use render::Statement;

use crate::core::identifier::Ident;
use crate::core::schema::{ColumnSchema, TableSchema};
use crate::core::value::Value;

/// `<column> = ?` predicate on the primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFilter {
    pub column: Ident,
    pub value: Value,
}

/// A single CRUD statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// `SELECT * FROM t [WHERE pk = ?] [LIMIT ? OFFSET ?]`
    Select {
        table: Ident,
        key: Option<KeyFilter>,
        limit: Option<u64>,
        offset: Option<u64>,
    },

    /// `INSERT INTO t (c, ...) VALUES (?, ...)`
    Insert {
        table: Ident,
        columns: Vec<Ident>,
        values: Vec<Value>,
    },

    /// `UPDATE t SET c = ?, ... WHERE pk = ?`
    Update {
        table: Ident,
        assignments: Vec<(Ident, Value)>,
        key: KeyFilter,
    },

    /// `DELETE FROM t WHERE pk = ?`
    Delete { table: Ident, key: KeyFilter },
}

impl Query {
    /// One page of a table in natural storage order.
    pub fn select_page(table: &TableSchema, offset: u64, limit: u64) -> Self {
        Query::Select {
            table: table.name.clone(),
            key: None,
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    /// Rows whose primary key equals `id`.
    pub fn select_by_key(table: &TableSchema, pk: &ColumnSchema, id: i64) -> Self {
        Query::Select {
            table: table.name.clone(),
            key: Some(KeyFilter::on(pk, id)),
            limit: None,
            offset: None,
        }
    }

    /// Insert one row. Columns and values are zipped in order.
    pub fn insert<'a>(
        table: &TableSchema,
        cells: impl IntoIterator<Item = (&'a ColumnSchema, Value)>,
    ) -> Self {
        let (columns, values) = cells
            .into_iter()
            .map(|(col, value)| (col.name.clone(), value))
            .unzip();
        Query::Insert {
            table: table.name.clone(),
            columns,
            values,
        }
    }

    /// Update the row whose primary key equals `id`.
    pub fn update<'a>(
        table: &TableSchema,
        assignments: impl IntoIterator<Item = (&'a ColumnSchema, Value)>,
        pk: &ColumnSchema,
        id: i64,
    ) -> Self {
        Query::Update {
            table: table.name.clone(),
            assignments: assignments
                .into_iter()
                .map(|(col, value)| (col.name.clone(), value))
                .collect(),
            key: KeyFilter::on(pk, id),
        }
    }

    /// Delete the row whose primary key equals `id`.
    pub fn delete(table: &TableSchema, pk: &ColumnSchema, id: i64) -> Self {
        Query::Delete {
            table: table.name.clone(),
            key: KeyFilter::on(pk, id),
        }
    }

    /// Target table.
    pub fn table(&self) -> &Ident {
        match self {
            Query::Select { table, .. }
            | Query::Insert { table, .. }
            | Query::Update { table, .. }
            | Query::Delete { table, .. } => table,
        }
    }
}

impl KeyFilter {
    fn on(pk: &ColumnSchema, id: i64) -> Self {
        KeyFilter {
            column: pk.name.clone(),
            value: Value::Integer(id),
        }
    }
}
