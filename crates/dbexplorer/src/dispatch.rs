//! Operation dispatch: maps an operation descriptor onto the engine and the
//! result onto the JSON envelope.
//!
//! Success bodies are `{"response": ...}` and failures `{"error": "..."}`;
//! the failure's [`ErrorKind`] picks the transport status.
//!
//! [`ErrorKind`]: crate::error::ErrorKind

use percent_encoding::percent_decode_str;
use serde_json::json;

use crate::core::value::{record_from_json, Record};
use crate::engine::QueryEngine;
use crate::error::{ExplorerError, Result};

/// Message returned for method/path combinations with no operation.
pub const UNSUPPORTED_MESSAGE: &str = "Api doesn't support";

/// What a request asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    ListTables,
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Transport-independent operation descriptor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Request {
    pub table: Option<String>,
    pub id: Option<String>,
    pub offset: u64,
    /// 0 means the engine default.
    pub limit: u64,
    pub operation: Operation,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            ..Default::default()
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Build a request from an HTTP method and path.
    ///
    /// `/` is the table list, `/{table}` the table and `/{table}/{id}` one
    /// record. Segments are percent-decoded after splitting, so `%2F` never
    /// splits a segment. Returns `None` when no operation matches the
    /// combination.
    pub fn route(method: &str, path: &str) -> Option<Self> {
        let mut segments = path
            .trim_start_matches('/')
            .splitn(3, '/')
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned());
        let table = segments.next().filter(|s| !s.is_empty());
        let id = segments.next().filter(|s| !s.is_empty());

        let operation = match (method, table.as_deref(), id.as_deref()) {
            ("GET", None, _) => Operation::ListTables,
            ("GET", Some(_), None) => Operation::List,
            ("PUT", Some(_), None) => Operation::Create,
            ("GET", Some(_), Some(_)) => Operation::Get,
            ("POST", Some(_), Some(_)) => Operation::Update,
            ("DELETE", Some(_), Some(_)) => Operation::Delete,
            _ => return None,
        };

        Some(Self {
            table,
            id,
            operation,
            ..Default::default()
        })
    }

    /// Read `offset` and `limit` from a query string. Missing or
    /// non-numeric values count as 0.
    pub fn with_query_string(mut self, query: &str) -> Self {
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let n = value.parse::<u64>().unwrap_or(0);
            match key {
                "offset" => self.offset = n,
                "limit" => self.limit = n,
                _ => {}
            }
        }
        self
    }

    /// Attach a raw request body. An empty body is no body.
    pub fn with_body_bytes(mut self, bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(self);
        }
        let body = serde_json::from_slice(bytes)
            .map_err(|e| ExplorerError::InvalidBody(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    fn require_table(&self) -> Result<&str> {
        self.table
            .as_deref()
            .ok_or_else(|| ExplorerError::UnknownTable(String::new()))
    }

    fn require_id(&self) -> Result<i64> {
        let raw = self.id.as_deref().unwrap_or_default();
        raw.parse()
            .map_err(|_| ExplorerError::InvalidId(raw.to_string()))
    }

    fn require_record(&self) -> Result<Record> {
        match &self.body {
            Some(body) => record_from_json(body.clone()),
            None => Err(ExplorerError::InvalidBody("missing body".into())),
        }
    }
}

/// Successful result of one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Tables(Vec<String>),
    Records(Vec<Record>),
    Record(Record),
    /// `key` is the primary-key column name, absent for tables without one.
    Created { key: Option<String>, id: Option<i64> },
    Updated(u64),
    Deleted(u64),
}

impl Response {
    /// Inner payload without the envelope.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Response::Tables(tables) => json!({ "tables": tables }),
            Response::Records(records) => json!({ "records": records }),
            Response::Record(record) => json!({ "record": record }),
            Response::Created { key, id } => {
                let mut map = serde_json::Map::new();
                map.insert(
                    key.clone().unwrap_or_else(|| "id".to_string()),
                    json!(id),
                );
                serde_json::Value::Object(map)
            }
            Response::Updated(n) => json!({ "updated": n }),
            Response::Deleted(n) => json!({ "deleted": n }),
        }
    }

    /// `{"response": <payload>}`
    pub fn to_json(&self) -> serde_json::Value {
        json!({ "response": self.payload() })
    }
}

/// `{"error": <message>}`
pub fn error_json(message: impl std::fmt::Display) -> serde_json::Value {
    json!({ "error": message.to_string() })
}

/// Run one request against the engine.
pub async fn dispatch(engine: &QueryEngine, request: &Request) -> Result<Response> {
    match request.operation {
        Operation::ListTables => Ok(Response::Tables(engine.table_names().to_vec())),

        Operation::List => {
            let table = request.require_table()?;
            let records = engine.list(table, request.offset, request.limit).await?;
            Ok(Response::Records(records))
        }

        Operation::Get => {
            let table = request.require_table()?;
            engine.describe(table)?;
            let record = engine.get(table, request.require_id()?).await?;
            Ok(Response::Record(record))
        }

        Operation::Create => {
            let table = request.require_table()?;
            let schema = engine.describe(table)?;
            let key = schema.primary_key().map(|pk| pk.name.as_str().to_string());
            let id = engine.create(table, &request.require_record()?).await?;
            Ok(Response::Created { key, id })
        }

        Operation::Update => {
            let table = request.require_table()?;
            engine.describe(table)?;
            let id = request.require_id()?;
            let n = engine.update(table, id, &request.require_record()?).await?;
            Ok(Response::Updated(n))
        }

        Operation::Delete => {
            let table = request.require_table()?;
            engine.describe(table)?;
            let n = engine.delete(table, request.require_id()?).await?;
            Ok(Response::Deleted(n))
        }
    }
}
