//! Core abstractions shared by the engine and the storage drivers.
//!
//! - [`schema`]: table and column metadata
//! - [`value`]: the normalized value type and [`Record`]
//! - [`identifier`]: catalog-sourced identifiers and quoting
//! - [`traits`]: the [`Dialect`] and [`Storage`] seams

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use identifier::Ident;
pub use schema::{ColumnSchema, DeclaredType, TableSchema};
pub use traits::{Dialect, ExecOutcome, RawColumn, Storage};
pub use value::{record_from_json, Record, Value};
