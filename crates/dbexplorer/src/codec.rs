//! Row decoding: raw driver values to normalized [`Record`]s.
//!
//! Storage drivers report each cell as a [`RawValue`] together with the
//! storage type name the driver saw for that column. [`RowCodec`] folds those
//! into the closed [`Value`] set. Text-encoded numbers (the MySQL text
//! protocol hands integers and decimals over as bytes) are parsed according
//! to the column's storage type.

use crate::core::schema::DeclaredType;
use crate::core::value::{Record, Value};
use crate::error::{ExplorerError, Result};

/// A single cell as reported by a storage driver.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
    /// The driver could not read the cell; carries the storage type name.
    Unsupported(String),
}

/// A fetched row before decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Driver-reported storage type per column (e.g. "INT", "VARCHAR").
    pub types: Vec<String>,
    /// Cell values.
    pub values: Vec<RawValue>,
}

/// Stateless decoder for result rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowCodec;

impl RowCodec {
    /// Decode one row given its column names, storage types and raw values.
    pub fn decode(columns: &[String], types: &[String], values: Vec<RawValue>) -> Result<Record> {
        if columns.len() != values.len() || columns.len() != types.len() {
            return Err(ExplorerError::decode(
                "<row>",
                format!(
                    "row shape mismatch: {} columns, {} types, {} values",
                    columns.len(),
                    types.len(),
                    values.len()
                ),
            ));
        }

        let mut record = Record::new();
        for ((column, storage_type), raw) in columns.iter().zip(types).zip(values) {
            let value = Self::decode_value(column, storage_type, raw)?;
            record.insert(column.clone(), value);
        }
        Ok(record)
    }

    /// Decode a [`RawRow`].
    pub fn decode_row(row: RawRow) -> Result<Record> {
        Self::decode(&row.columns, &row.types, row.values)
    }

    /// Decode every row, failing on the first undecodable one.
    pub fn decode_all(rows: Vec<RawRow>) -> Result<Vec<Record>> {
        rows.into_iter().map(Self::decode_row).collect()
    }

    fn decode_value(column: &str, storage_type: &str, raw: RawValue) -> Result<Value> {
        match raw {
            RawValue::Null => Ok(Value::Null),
            RawValue::Int(v) => Ok(Value::Integer(v)),
            RawValue::UInt(v) => i64::try_from(v)
                .map(Value::Integer)
                .map_err(|_| ExplorerError::decode(column, format!("{} overflows i64", v))),
            RawValue::Float(v) => Ok(Value::Float(v)),
            RawValue::Bool(v) => Ok(Value::Bool(v)),
            RawValue::Text(s) => Self::decode_text(column, storage_type, s),
            RawValue::Bytes(b) => {
                let s = String::from_utf8_lossy(&b).into_owned();
                Self::decode_text(column, storage_type, s)
            }
            RawValue::Unsupported(type_name) => Err(ExplorerError::decode(
                column,
                format!("unsupported storage type {}", type_name),
            )),
        }
    }

    fn decode_text(column: &str, storage_type: &str, s: String) -> Result<Value> {
        match DeclaredType::from_raw(storage_type) {
            DeclaredType::Integer => s.trim().parse::<i64>().map(Value::Integer).map_err(|e| {
                ExplorerError::decode(column, format!("invalid integer {:?}: {}", s, e))
            }),
            DeclaredType::FloatingPoint => s.trim().parse::<f64>().map(Value::Float).map_err(|e| {
                ExplorerError::decode(column, format!("invalid number {:?}: {}", s, e))
            }),
            DeclaredType::Text | DeclaredType::Other => Ok(Value::Text(s)),
        }
    }
}
