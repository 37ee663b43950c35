//! MySQL/MariaDB database driver.
//!
//! - [`MysqlDialect`]: SQL syntax strategy
//! - [`MysqlStorage`]: introspection and statement execution over a SQLx pool
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod dialect;
mod storage;

pub use dialect::MysqlDialect;
pub use storage::MysqlStorage;
