//! SQL text rendering for [`Query`].

use crate::core::traits::Dialect;
use crate::core::value::Value;

use super::{KeyFilter, Query};

/// Rendered SQL plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates parameters and hands out matching placeholders.
struct Binder<'d> {
    dialect: &'d dyn Dialect,
    params: Vec<Value>,
}

impl<'d> Binder<'d> {
    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        self.dialect.param_placeholder(self.params.len())
    }

    fn where_key(&mut self, key: &KeyFilter) -> String {
        format!(
            " WHERE {} = {}",
            self.dialect.quote_ident(&key.column),
            self.bind(key.value.clone())
        )
    }
}

impl Query {
    /// Render to SQL text for `dialect`.
    pub fn render(&self, dialect: &dyn Dialect) -> Statement {
        let mut b = Binder {
            dialect,
            params: Vec::new(),
        };

        let sql = match self {
            Query::Select {
                table,
                key,
                limit,
                offset,
            } => {
                let mut sql = format!("SELECT * FROM {}", dialect.quote_ident(table));
                if let Some(key) = key {
                    sql.push_str(&b.where_key(key));
                }
                if let Some(limit) = limit {
                    let p = b.bind(Value::Integer(clamp(*limit)));
                    sql.push_str(&format!(" LIMIT {}", p));
                }
                if let Some(offset) = offset {
                    let p = b.bind(Value::Integer(clamp(*offset)));
                    sql.push_str(&format!(" OFFSET {}", p));
                }
                sql
            }

            Query::Insert {
                table,
                columns,
                values,
            } => {
                let cols = columns
                    .iter()
                    .map(|c| dialect.quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", ");
                let placeholders = values
                    .iter()
                    .map(|v| b.bind(v.clone()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    dialect.quote_ident(table),
                    cols,
                    placeholders
                )
            }

            Query::Update {
                table,
                assignments,
                key,
            } => {
                let set = assignments
                    .iter()
                    .map(|(col, v)| format!("{} = {}", dialect.quote_ident(col), b.bind(v.clone())))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut sql = format!("UPDATE {} SET {}", dialect.quote_ident(table), set);
                sql.push_str(&b.where_key(key));
                sql
            }

            Query::Delete { table, key } => {
                let mut sql = format!("DELETE FROM {}", dialect.quote_ident(table));
                sql.push_str(&b.where_key(key));
                sql
            }
        };

        Statement {
            sql,
            params: b.params,
        }
    }
}

fn clamp(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
