//! # dbexplorer
//!
//! Schema-reflecting CRUD over a live MySQL/MariaDB database.
//!
//! At startup the library introspects every table and column of the
//! configured database into an immutable catalog. Afterwards any table can
//! be listed, read, created, updated and deleted through one generic engine:
//!
//! - **Catalog** of tables, column types, nullability, defaults and the
//!   auto-increment primary key
//! - **Coercion** of JSON input against declared column types, with every
//!   violation reported at once
//! - **Parameterized SQL** built only from catalog identifiers
//! - **Dispatch** of transport-neutral requests into a JSON envelope
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbexplorer::{drivers, Config, QueryEngine};
//!
//! #[tokio::main]
//! async fn main() -> dbexplorer::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let storage = drivers::connect(&config.database).await?;
//!     let engine = QueryEngine::connect(storage).await?;
//!     for record in engine.list("users", 0, 0).await? {
//!         println!("{:?}", record);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod codec;
pub mod coercion;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod drivers;
pub mod engine;
pub mod error;
pub mod query;

// Re-exports for convenient access
pub use catalog::{CatalogBuilder, SchemaCatalog};
pub use config::{Config, DatabaseConfig, ServerConfig};
pub use crate::core::{ColumnSchema, DeclaredType, Record, Storage, TableSchema, Value};
pub use dispatch::{dispatch, Operation, Request, Response};
pub use engine::{QueryEngine, DEFAULT_LIMIT};
pub use error::{ErrorKind, ExplorerError, Result, Violation};
