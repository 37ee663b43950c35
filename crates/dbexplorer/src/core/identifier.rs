//! Catalog-sourced SQL identifiers and their quoting.
//!
//! SQL identifiers (table names, column names) cannot be passed as bound
//! parameters; only values can. Dynamic statements therefore splice
//! identifiers into the SQL text, and this module is the only place that
//! happens.
//!
//! [`Ident`] can only be minted inside the crate, by the schema catalog,
//! from names returned by introspection. Request strings are looked up in the
//! catalog and never turned into an `Ident` directly.

use std::fmt;

use crate::error::{ExplorerError, Result};

/// Maximum identifier length (MySQL allows 64 characters; keep headroom for
/// multibyte names).
const MAX_IDENTIFIER_LENGTH: usize = 256;

/// An identifier that came from schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    /// Wrap an introspected name. Only the catalog calls this.
    pub(crate) fn trusted(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Ident(name))
    }

    /// The unquoted identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ExplorerError::schema_load("Identifier cannot be empty"));
    }

    if name.contains('\0') {
        return Err(ExplorerError::schema_load(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ExplorerError::schema_load(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier using backticks.
///
/// Escapes backticks by doubling them and wraps in backticks.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(quote_mysql(&ident("users")), "`users`");
/// assert_eq!(quote_mysql(&ident("table`name")), "`table``name`");
/// ```
pub fn quote_mysql(ident: &Ident) -> String {
    format!("`{}`", ident.as_str().replace('`', "``"))
}
