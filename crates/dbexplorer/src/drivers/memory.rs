//! In-process storage backend.
//!
//! Interprets structured [`Query`] values against tables held in memory,
//! with MySQL-like semantics for the parts the engine relies on:
//! auto-increment ids, storage defaults, strict NOT NULL checks and
//! matched-row counts for updates. Used by the test suites.
//!
//! # Feature Flag
//!
//! Outside this crate's own unit tests the module is only available when
//! the `testing` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! dbexplorer = { version = "0.1", features = ["testing"] }
//! ```

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::codec::{RawRow, RawValue};
use crate::core::schema::DeclaredType;
use crate::core::traits::{ExecOutcome, RawColumn, Storage};
use crate::core::value::Value;
use crate::error::{ExplorerError, Result};
use crate::query::{KeyFilter, Query};

/// One in-memory table.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    columns: Vec<RawColumn>,
    rows: Vec<BTreeMap<String, Value>>,
    next_id: u64,
}

impl MemoryTable {
    /// Create an empty table with the given column definitions.
    pub fn new(name: impl Into<String>, columns: Vec<RawColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            next_id: 1,
        }
    }

    fn auto_increment_column(&self) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.is_auto_increment_pk())
    }

    fn column(&self, name: &str) -> Result<&RawColumn> {
        self.columns.iter().find(|c| c.name == name).ok_or_else(|| {
            ExplorerError::StorageFailure(format!(
                "Unknown column '{}' in '{}'",
                name, self.name
            ))
        })
    }

    fn matches(row: &BTreeMap<String, Value>, key: &KeyFilter) -> bool {
        row.get(key.column.as_str()) == Some(&key.value)
    }

    fn insert(&mut self, columns: &[String], values: &[Value]) -> Result<ExecOutcome> {
        let mut row = BTreeMap::new();
        for (name, value) in columns.iter().zip(values) {
            self.column(name)?;
            row.insert(name.clone(), value.clone());
        }

        let mut generated = None;
        for column in &self.columns {
            if row.contains_key(&column.name) {
                continue;
            }
            let value = if column.is_auto_increment_pk() {
                let id = self.next_id;
                generated = Some(id);
                Value::Integer(id as i64)
            } else if let Some(default) = &column.default {
                parse_default(&column.column_type, default)
            } else if column.nullable {
                Value::Null
            } else {
                return Err(ExplorerError::StorageFailure(format!(
                    "Field '{}' doesn't have a default value",
                    column.name
                )));
            };
            row.insert(column.name.clone(), value);
        }

        let pk_name = self.auto_increment_column().map(|c| c.name.clone());
        if let Some(pk_name) = pk_name {
            if let Some(&Value::Integer(id)) = row.get(&pk_name) {
                if self
                    .rows
                    .iter()
                    .any(|r| r.get(&pk_name) == Some(&Value::Integer(id)))
                {
                    return Err(ExplorerError::StorageFailure(format!(
                        "Duplicate entry '{}' for key 'PRIMARY'",
                        id
                    )));
                }
                self.next_id = self.next_id.max(id as u64 + 1);
            }
        }

        self.rows.push(row);
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: generated,
        })
    }

    fn to_raw(&self, row: &BTreeMap<String, Value>) -> RawRow {
        let mut raw = RawRow::default();
        for column in &self.columns {
            raw.columns.push(column.name.clone());
            raw.types.push(storage_type_name(&column.column_type));
            raw.values.push(match row.get(&column.name).unwrap_or(&Value::Null) {
                Value::Integer(v) => RawValue::Int(*v),
                Value::Float(v) => RawValue::Float(*v),
                Value::Text(v) => RawValue::Text(v.clone()),
                Value::Bool(v) => RawValue::Bool(*v),
                Value::Null => RawValue::Null,
            });
        }
        raw
    }
}

/// Driver-style type name: `varchar(255)` becomes `VARCHAR`.
fn storage_type_name(column_type: &str) -> String {
    column_type
        .split('(')
        .next()
        .unwrap_or(column_type)
        .trim()
        .to_uppercase()
}

fn parse_default(column_type: &str, default: &str) -> Value {
    match DeclaredType::from_raw(column_type) {
        DeclaredType::Integer => default
            .parse()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(default.to_string())),
        DeclaredType::FloatingPoint => default
            .parse()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(default.to_string())),
        DeclaredType::Text | DeclaredType::Other => Value::Text(default.to_string()),
    }
}

#[derive(Debug, Default)]
struct State {
    tables: Vec<MemoryTable>,
    history: Vec<Query>,
}

/// Storage backed by in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
    introspection_error: Option<String>,
}

impl MemoryStorage {
    /// Create a storage with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table; tables are listed in the order they were added.
    pub fn with_table(mut self, table: MemoryTable) -> Self {
        if let Ok(state) = self.state.get_mut() {
            state.tables.push(table);
        }
        self
    }

    /// Make every introspection call fail with `message`.
    pub fn fail_introspection(mut self, message: impl Into<String>) -> Self {
        self.introspection_error = Some(message.into());
        self
    }

    /// Every statement run so far, oldest first.
    pub fn history(&self) -> Vec<Query> {
        self.state
            .lock()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ExplorerError::StorageFailure("memory storage poisoned".into()))?;
        f(&mut state)
    }

    fn check_introspection(&self) -> Result<()> {
        match &self.introspection_error {
            Some(msg) => Err(ExplorerError::StorageFailure(msg.clone())),
            None => Ok(()),
        }
    }
}

fn table_ref<'s>(tables: &'s [MemoryTable], name: &str) -> Result<&'s MemoryTable> {
    tables
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| ExplorerError::StorageFailure(format!("Table '{}' doesn't exist", name)))
}

fn table_mut<'s>(tables: &'s mut [MemoryTable], name: &str) -> Result<&'s mut MemoryTable> {
    tables
        .iter_mut()
        .find(|t| t.name == name)
        .ok_or_else(|| ExplorerError::StorageFailure(format!("Table '{}' doesn't exist", name)))
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list_tables(&self) -> Result<Vec<String>> {
        self.check_introspection()?;
        self.with_state(|s| Ok(s.tables.iter().map(|t| t.name.clone()).collect()))
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<RawColumn>> {
        self.check_introspection()?;
        self.with_state(|s| Ok(table_ref(&s.tables, table)?.columns.clone()))
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<RawRow>> {
        self.with_state(|s| {
            s.history.push(query.clone());
            let Query::Select {
                table,
                key,
                limit,
                offset,
            } = query
            else {
                return Err(ExplorerError::StorageFailure(
                    "fetch requires a SELECT".into(),
                ));
            };

            let t = table_ref(&s.tables, table.as_str())?;
            let offset = offset.unwrap_or(0) as usize;
            let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
            Ok(t.rows
                .iter()
                .filter(|row| key.as_ref().map_or(true, |k| MemoryTable::matches(row, k)))
                .skip(offset)
                .take(limit)
                .map(|row| t.to_raw(row))
                .collect())
        })
    }

    async fn execute(&self, query: &Query) -> Result<ExecOutcome> {
        self.with_state(|s| {
            s.history.push(query.clone());
            let t = table_mut(&mut s.tables, query.table().as_str())?;
            match query {
                Query::Select { .. } => Err(ExplorerError::StorageFailure(
                    "execute does not return rows".into(),
                )),
                Query::Insert {
                    columns, values, ..
                } => {
                    let names: Vec<String> =
                        columns.iter().map(|c| c.as_str().to_string()).collect();
                    t.insert(&names, values)
                }
                Query::Update {
                    assignments, key, ..
                } => {
                    for (column, _) in assignments {
                        t.column(column.as_str())?;
                    }
                    let mut affected = 0;
                    for row in t.rows.iter_mut().filter(|r| MemoryTable::matches(r, key)) {
                        for (column, value) in assignments {
                            row.insert(column.as_str().to_string(), value.clone());
                        }
                        affected += 1;
                    }
                    Ok(ExecOutcome {
                        rows_affected: affected,
                        last_insert_id: None,
                    })
                }
                Query::Delete { key, .. } => {
                    let before = t.rows.len();
                    t.rows.retain(|r| !MemoryTable::matches(r, key));
                    Ok(ExecOutcome {
                        rows_affected: (before - t.rows.len()) as u64,
                        last_insert_id: None,
                    })
                }
            }
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn db_type(&self) -> &str {
        "memory"
    }
}
