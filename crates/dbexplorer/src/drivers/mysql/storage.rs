//! MySQL/MariaDB storage implementation.
//!
//! Implements the `Storage` trait over a SQLx connection pool. Every call
//! borrows a pooled connection for exactly one round trip.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{
    MySql, MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow,
    MySqlSslMode,
};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::codec::{RawRow, RawValue};
use crate::config::DatabaseConfig;
use crate::core::traits::{Dialect, ExecOutcome, RawColumn, Storage};
use crate::core::value::Value;
use crate::error::{ExplorerError, Result};
use crate::query::{Query, Statement};

use super::MysqlDialect;

/// MySQL/MariaDB storage over a SQLx pool.
pub struct MysqlStorage {
    pool: MySqlPool,
    database: String,
    dialect: MysqlDialect,
}

impl MysqlStorage {
    /// Create a pool from configuration and test it.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(parse_ssl_mode(&config.ssl_mode)?);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        let storage = Self::from_pool(pool, &config.database);
        storage.ping().await?;

        info!(
            "Connected to MySQL: {}:{}/{}",
            config.host, config.port, config.database
        );
        Ok(storage)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool, database: impl Into<String>) -> Self {
        Self {
            pool,
            database: database.into(),
            dialect: MysqlDialect::new(),
        }
    }

    fn render(&self, query: &Query) -> Statement {
        let stmt = query.render(&self.dialect);
        debug!(sql = %stmt.sql, params = stmt.params.len(), "{}", self.dialect.name());
        stmt
    }

    /// Convert a MySQL row into raw cells plus driver type names.
    fn row_to_raw(row: &MySqlRow) -> RawRow {
        let mut raw = RawRow::default();
        for (idx, column) in row.columns().iter().enumerate() {
            let type_name = column.type_info().name().to_string();
            raw.values.push(Self::cell(row, idx, &type_name));
            raw.columns.push(column.name().to_string());
            raw.types.push(type_name);
        }
        raw
    }

    /// Read one cell according to its driver-reported type.
    fn cell(row: &MySqlRow, idx: usize, type_name: &str) -> RawValue {
        let is_null = row.try_get_raw(idx).map(|r| r.is_null()).unwrap_or(true);
        if is_null {
            return RawValue::Null;
        }

        let decoded = match CellKind::of(type_name) {
            CellKind::Signed => row.try_get::<i64, _>(idx).map(RawValue::Int),
            CellKind::Unsigned => row.try_get::<u64, _>(idx).map(RawValue::UInt),
            CellKind::Float => row
                .try_get::<f32, _>(idx)
                .map(|v| RawValue::Float(v as f64)),
            CellKind::Double => row.try_get::<f64, _>(idx).map(RawValue::Float),

            // Exact decimals travel as text and are parsed by the codec
            CellKind::Decimal => row
                .try_get::<rust_decimal::Decimal, _>(idx)
                .map(|d| RawValue::Text(d.to_string())),

            CellKind::Text => row.try_get::<String, _>(idx).map(RawValue::Text),
            CellKind::Bytes => row.try_get::<Vec<u8>, _>(idx).map(RawValue::Bytes),

            CellKind::Date => row
                .try_get::<chrono::NaiveDate, _>(idx)
                .map(|v| RawValue::Text(v.to_string())),
            CellKind::Time => row
                .try_get::<chrono::NaiveTime, _>(idx)
                .map(|v| RawValue::Text(v.to_string())),
            CellKind::DateTime => row
                .try_get::<chrono::NaiveDateTime, _>(idx)
                .map(|v| RawValue::Text(v.to_string())),
            CellKind::Timestamp => row
                .try_get::<chrono::DateTime<chrono::Utc>, _>(idx)
                .map(|v| RawValue::Text(v.naive_utc().to_string())),

            CellKind::Other => row
                .try_get::<String, _>(idx)
                .map(RawValue::Text)
                .or_else(|_| row.try_get::<Vec<u8>, _>(idx).map(RawValue::Bytes)),
        };

        decoded.unwrap_or_else(|_| RawValue::Unsupported(type_name.to_string()))
    }
}

/// Rust type a cell is read as, chosen from the driver type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Signed,
    Unsigned,
    Float,
    Double,
    Decimal,
    Text,
    Bytes,
    Date,
    Time,
    DateTime,
    Timestamp,
    Other,
}

impl CellKind {
    fn of(type_name: &str) -> Self {
        match type_name {
            // The driver reports tinyint(1) as BOOLEAN; the catalog declares
            // it Integer, so it must come back as an integer to round-trip.
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => Self::Signed,
            "DECIMAL" | "DECIMAL UNSIGNED" => Self::Decimal,
            t if t.ends_with("UNSIGNED") => Self::Unsigned,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
            | "SET" | "JSON" => Self::Text,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
                Self::Bytes
            }
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            _ => Self::Other,
        }
    }
}

/// Bind every parameter of a rendered statement.
fn bind_params<'q>(
    sql: &'q str,
    params: &'q [Value],
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            Value::Integer(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Bool(v) => query.bind(*v),
            Value::Null => query.bind(None::<String>),
        };
    }
    query
}

fn parse_ssl_mode(mode: &str) -> Result<MySqlSslMode> {
    match mode.to_lowercase().as_str() {
        "disabled" | "disable" => Ok(MySqlSslMode::Disabled),
        "preferred" | "prefer" => Ok(MySqlSslMode::Preferred),
        "required" | "require" => Ok(MySqlSslMode::Required),
        "verify_ca" | "verify-ca" => Ok(MySqlSslMode::VerifyCa),
        "verify_identity" | "verify-full" => Ok(MySqlSslMode::VerifyIdentity),
        other => Err(ExplorerError::Config(format!(
            "Unknown ssl_mode '{}'. Supported: disabled, preferred, required, verify_ca, verify_identity",
            other
        ))),
    }
}

#[async_trait]
impl Storage for MysqlStorage {
    async fn list_tables(&self) -> Result<Vec<String>> {
        // CAST to CHAR to handle collation differences where information_schema
        // may return VARBINARY instead of VARCHAR
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("TABLE_NAME").map_err(Into::into))
            .collect()
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<RawColumn>> {
        let query = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
                CAST(COLUMN_TYPE AS CHAR(255)) AS COLUMN_TYPE,
                CAST(IF(IS_NULLABLE = 'YES', 1, 0) AS SIGNED) AS is_nullable,
                CAST(COLUMN_DEFAULT AS CHAR) AS COLUMN_DEFAULT,
                CAST(COLUMN_KEY AS CHAR(16)) AS COLUMN_KEY,
                CAST(EXTRA AS CHAR(255)) AS EXTRA,
                CAST(ORDINAL_POSITION AS SIGNED) AS ORDINAL_POSITION
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            columns.push(RawColumn {
                name: row.try_get("COLUMN_NAME")?,
                column_type: row.try_get("COLUMN_TYPE")?,
                nullable: row.try_get::<i64, _>("is_nullable")? == 1,
                default: row.try_get::<Option<String>, _>("COLUMN_DEFAULT")?,
                key: row.try_get("COLUMN_KEY")?,
                extra: row.try_get("EXTRA")?,
                ordinal: row.try_get::<i64, _>("ORDINAL_POSITION")?.max(0) as u32,
            });
        }
        Ok(columns)
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<RawRow>> {
        let stmt = self.render(query);
        let rows = bind_params(&stmt.sql, &stmt.params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::row_to_raw).collect())
    }

    async fn execute(&self, query: &Query) -> Result<ExecOutcome> {
        let stmt = self.render(query);
        let result = bind_params(&stmt.sql, &stmt.params)
            .execute(&self.pool)
            .await?;

        let last_insert_id = match query {
            Query::Insert { .. } if result.last_insert_id() > 0 => Some(result.last_insert_id()),
            _ => None,
        };
        Ok(ExecOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id,
        })
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    fn db_type(&self) -> &str {
        "mysql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssl_mode() {
        assert!(matches!(parse_ssl_mode("disabled"), Ok(MySqlSslMode::Disabled)));
        assert!(matches!(parse_ssl_mode("Preferred"), Ok(MySqlSslMode::Preferred)));
        assert!(matches!(parse_ssl_mode("require"), Ok(MySqlSslMode::Required)));
        assert!(matches!(
            parse_ssl_mode("verify_identity"),
            Ok(MySqlSslMode::VerifyIdentity)
        ));
        assert!(parse_ssl_mode("sometimes").is_err());
    }

    #[test]
    fn test_boolean_cells_read_as_integers() {
        assert_eq!(CellKind::of("BOOLEAN"), CellKind::Signed);
        assert_eq!(CellKind::of("TINYINT"), CellKind::Signed);
        assert_eq!(CellKind::of("TINYINT UNSIGNED"), CellKind::Unsigned);
        assert_eq!(CellKind::of("BIGINT UNSIGNED"), CellKind::Unsigned);
        assert_eq!(CellKind::of("DECIMAL UNSIGNED"), CellKind::Decimal);
        assert_eq!(CellKind::of("VARCHAR"), CellKind::Text);
        assert_eq!(CellKind::of("GEOMETRY"), CellKind::Other);
    }
}
