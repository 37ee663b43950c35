//! Storage driver implementations.
//!
//! This module provides implementations of the core traits:
//!
//! - [`mysql`]: MySQL/MariaDB driver over a SQLx pool
//! - `memory`: in-process tables for tests (requires the `testing` feature)
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/` (e.g., `drivers/postgres/`)
//! 2. Implement the `Dialect` and `Storage` traits
//! 3. Accept the new `database.type` in config validation and in [`connect`]

#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod mysql;

#[cfg(any(test, feature = "testing"))]
pub use memory::{MemoryStorage, MemoryTable};
pub use mysql::{MysqlDialect, MysqlStorage};

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::core::traits::Storage;
use crate::error::{ExplorerError, Result};

/// Open storage for the configured database type.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    match config.r#type.as_str() {
        "mysql" => Ok(Arc::new(MysqlStorage::connect(config).await?)),
        other => Err(ExplorerError::Config(format!(
            "unsupported database type '{}'",
            other
        ))),
    }
}
