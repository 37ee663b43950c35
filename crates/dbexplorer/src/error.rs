//! Error types for the explorer library.

use std::fmt;

use thiserror::Error;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for storage (connection/query) errors.
pub const EXIT_STORAGE_ERROR: u8 = 2;
/// Exit code for schema introspection failures at startup.
pub const EXIT_SCHEMA_ERROR: u8 = 3;
/// Exit code for request-level failures surfaced by one-shot commands.
pub const EXIT_REQUEST_ERROR: u8 = 4;
/// Exit code for IO errors (missing config file, etc.).
pub const EXIT_IO_ERROR: u8 = 7;

/// Categorical status of a failure, used by dispatchers to pick a
/// transport-level status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed table or record does not exist.
    NotFound,
    /// The caller's input was rejected.
    BadRequest,
    /// Storage, decode or process-level failure.
    Internal,
}

/// A single rejected column in a create/update payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The value's kind is not accepted by the column's declared type.
    TypeMismatch {
        column: String,
        expected: String,
        found: &'static str,
    },

    /// The primary key appeared in an update body.
    ImmutableColumn { column: String },

    /// A NOT NULL column without a default was omitted and no zero value
    /// can be synthesized for its type.
    MissingRequiredColumn { column: String },
}

impl Violation {
    /// Name of the offending column.
    pub fn column(&self) -> &str {
        match self {
            Violation::TypeMismatch { column, .. }
            | Violation::ImmutableColumn { column }
            | Violation::MissingRequiredColumn { column } => column,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::TypeMismatch {
                column,
                expected,
                found,
            } => write!(
                f,
                "field {} have invalid type: expected {}, got {}",
                column, expected, found
            ),
            Violation::ImmutableColumn { column } => {
                write!(f, "field {} is the primary key and cannot be updated", column)
            }
            Violation::MissingRequiredColumn { column } => {
                write!(f, "field {} is required", column)
            }
        }
    }
}

/// Main error type for explorer operations.
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Requested table is absent from the catalog.
    #[error("unknown table")]
    UnknownTable(String),

    /// Lookup by id found no row.
    #[error("record not found")]
    RecordNotFound { table: String, id: i64 },

    /// One or more columns of a create/update payload were rejected.
    #[error("{}", join_violations(.violations))]
    Validation {
        table: String,
        violations: Vec<Violation>,
    },

    /// Update touched zero columns or zero rows.
    #[error("nothing to update")]
    NothingToUpdate,

    /// Operation addresses a record by id but the table has no primary key.
    #[error("table {0} has no primary key")]
    NoPrimaryKey(String),

    /// Request body was not a flat JSON object.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Record id was not an integer.
    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    /// Underlying connection or query error.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Storage failure reported by a non-sqlx backend.
    #[error("storage error: {0}")]
    StorageFailure(String),

    /// A fetched value could not be classified.
    #[error("cannot decode column {column}: {message}")]
    Decode { column: String, message: String },

    /// Schema introspection failed at startup.
    #[error("schema load failed: {0}")]
    SchemaLoad(String),

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ExplorerError {
    /// Create a Decode error for a column.
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        ExplorerError::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a SchemaLoad error.
    pub fn schema_load(message: impl Into<String>) -> Self {
        ExplorerError::SchemaLoad(message.into())
    }

    /// Categorical status for dispatchers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExplorerError::UnknownTable(_) | ExplorerError::RecordNotFound { .. } => {
                ErrorKind::NotFound
            }
            ExplorerError::Validation { .. }
            | ExplorerError::NothingToUpdate
            | ExplorerError::NoPrimaryKey(_)
            | ExplorerError::InvalidBody(_)
            | ExplorerError::InvalidId(_) => ErrorKind::BadRequest,
            _ => ErrorKind::Internal,
        }
    }

    /// Rejected columns, empty for non-validation errors.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ExplorerError::Validation { violations, .. } => violations,
            _ => &[],
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExplorerError::Config(_) | ExplorerError::Yaml(_) => EXIT_CONFIG_ERROR,
            ExplorerError::Storage(_) | ExplorerError::StorageFailure(_) => EXIT_STORAGE_ERROR,
            ExplorerError::SchemaLoad(_) => EXIT_SCHEMA_ERROR,
            ExplorerError::Io(_) => EXIT_IO_ERROR,
            _ => EXIT_REQUEST_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;
