//! Configuration validation.

use super::Config;
use crate::error::{ExplorerError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let db = &config.database;
    if db.host.is_empty() {
        return Err(ExplorerError::Config("database.host is required".into()));
    }
    if db.database.is_empty() {
        return Err(ExplorerError::Config("database.database is required".into()));
    }
    if db.user.is_empty() {
        return Err(ExplorerError::Config("database.user is required".into()));
    }
    if db.r#type != "mysql" {
        return Err(ExplorerError::Config(format!(
            "database.type must be 'mysql', got '{}'",
            db.r#type
        )));
    }
    if db.max_connections == 0 {
        return Err(ExplorerError::Config(
            "database.max_connections must be at least 1".into(),
        ));
    }

    if config.server.host.is_empty() {
        return Err(ExplorerError::Config("server.host is required".into()));
    }
    if let Some(0) = config.server.workers {
        return Err(ExplorerError::Config(
            "server.workers must be at least 1".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, ServerConfig};

    fn valid_config() -> Config {
        Config {
            database: DatabaseConfig {
                r#type: "mysql".to_string(),
                host: "localhost".to_string(),
                port: 3306,
                database: "shop".to_string(),
                user: "app".to_string(),
                password: "password".to_string(),
                ssl_mode: "disabled".to_string(),
                max_connections: 4,
                acquire_timeout_secs: 5,
            },
            server: ServerConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_database_host() {
        let mut config = valid_config();
        config.database.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_wrong_database_type() {
        let mut config = valid_config();
        config.database.r#type = "postgres".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("'postgres'"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = valid_config();
        config.server.workers = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_connections_rejected() {
        let mut config = valid_config();
        config.database.max_connections = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_database_config_debug_redacts_password() {
        let mut config = valid_config();
        config.database.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config.database);
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_password_123"),
            "Debug output should not contain actual password value"
        );
    }
}
