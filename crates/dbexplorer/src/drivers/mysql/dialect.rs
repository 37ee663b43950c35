//! MySQL/MariaDB SQL dialect (Strategy pattern).
//!
//! Provides MySQL-specific identifier quoting and parameter placeholders.

use crate::core::identifier::{quote_mysql, Ident};
use crate::core::traits::Dialect;

/// MySQL/MariaDB dialect implementation.
///
/// Compatible with MySQL 5.7+, 8.0+, and MariaDB 10.2+.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn quote_ident(&self, ident: &Ident) -> String {
        quote_mysql(ident)
    }

    fn param_placeholder(&self, _index: usize) -> String {
        // MySQL placeholders are positional and unnumbered
        "?".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.quote_ident(&Ident::trusted("name").unwrap()), "`name`");
        assert_eq!(
            dialect.quote_ident(&Ident::trusted("table`name").unwrap()),
            "`table``name`"
        );
        assert_eq!(dialect.quote_ident(&Ident::trusted("Users").unwrap()), "`Users`");
    }

    #[test]
    fn test_param_placeholder() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.param_placeholder(1), "?");
        assert_eq!(dialect.param_placeholder(10), "?");
        assert_eq!(dialect.name(), "mysql");
    }
}
