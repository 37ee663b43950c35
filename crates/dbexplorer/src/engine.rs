//! Generic CRUD over any table in the catalog.
//!
//! Every operation follows the same path: catalog lookup, coercion of the
//! input record, a structured [`Query`], one storage round trip and row
//! decoding. The engine holds no mutable state, so clones share one catalog
//! and one pool across request workers.

use std::sync::Arc;

use crate::catalog::SchemaCatalog;
use crate::codec::RowCodec;
use crate::coercion::{validate_record, WriteMode};
use crate::core::schema::{ColumnSchema, TableSchema};
use crate::core::traits::Storage;
use crate::core::value::Record;
use crate::error::{ExplorerError, Result};
use crate::query::Query;

/// Page size used when a caller asks for `limit == 0`.
pub const DEFAULT_LIMIT: u64 = 5;

/// CRUD engine over a loaded catalog.
#[derive(Clone)]
pub struct QueryEngine {
    catalog: Arc<SchemaCatalog>,
    storage: Arc<dyn Storage>,
}

impl QueryEngine {
    /// Introspect `storage` and build an engine over it.
    pub async fn connect(storage: Arc<dyn Storage>) -> Result<Self> {
        let catalog = SchemaCatalog::load(storage.as_ref()).await?;
        Ok(Self::new(Arc::new(catalog), storage))
    }

    /// Build an engine over an already loaded catalog.
    pub fn new(catalog: Arc<SchemaCatalog>, storage: Arc<dyn Storage>) -> Self {
        Self { catalog, storage }
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// All table names, in discovery order.
    pub fn table_names(&self) -> &[String] {
        self.catalog.table_names()
    }

    /// Schema of one table.
    pub fn describe(&self, table: &str) -> Result<&TableSchema> {
        self.table(table)
    }

    /// One page of `table`. A `limit` of 0 means [`DEFAULT_LIMIT`].
    pub async fn list(&self, table: &str, offset: u64, limit: u64) -> Result<Vec<Record>> {
        let schema = self.table(table)?;
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };

        let rows = self
            .storage
            .fetch(&Query::select_page(schema, offset, limit))
            .await?;
        RowCodec::decode_all(rows)
    }

    /// The record whose primary key equals `id`.
    pub async fn get(&self, table: &str, id: i64) -> Result<Record> {
        let (schema, pk) = self.table_with_pk(table)?;

        let rows = self
            .storage
            .fetch(&Query::select_by_key(schema, pk, id))
            .await?;
        match rows.into_iter().next() {
            Some(row) => RowCodec::decode_row(row),
            None => Err(ExplorerError::RecordNotFound {
                table: table.to_string(),
                id,
            }),
        }
    }

    /// Insert a record.
    ///
    /// Omitted NOT NULL columns without a default receive the zero value of
    /// their type. Returns the generated id when the table has a primary key.
    pub async fn create(&self, table: &str, record: &Record) -> Result<Option<i64>> {
        let schema = self.table(table)?;
        let cells = validate_record(schema, record, WriteMode::Create)?;

        let outcome = self
            .storage
            .execute(&Query::insert(schema, cells))
            .await?;

        if !schema.has_pk() {
            return Ok(None);
        }
        outcome
            .last_insert_id
            .map(|id| {
                i64::try_from(id).map_err(|_| {
                    ExplorerError::StorageFailure(format!("generated id {} exceeds i64", id))
                })
            })
            .transpose()
    }

    /// Update the record whose primary key equals `id`.
    ///
    /// Returns the affected row count, which is never 0: an update that
    /// touches no known column or no row is [`ExplorerError::NothingToUpdate`].
    pub async fn update(&self, table: &str, id: i64, record: &Record) -> Result<u64> {
        let (schema, pk) = self.table_with_pk(table)?;
        let cells = validate_record(schema, record, WriteMode::Update)?;
        if cells.is_empty() {
            return Err(ExplorerError::NothingToUpdate);
        }

        let outcome = self
            .storage
            .execute(&Query::update(schema, cells, pk, id))
            .await?;
        if outcome.rows_affected == 0 {
            return Err(ExplorerError::NothingToUpdate);
        }
        Ok(outcome.rows_affected)
    }

    /// Delete the record whose primary key equals `id`. Deleting a missing
    /// record affects 0 rows and is not an error.
    pub async fn delete(&self, table: &str, id: i64) -> Result<u64> {
        let (schema, pk) = self.table_with_pk(table)?;

        let outcome = self
            .storage
            .execute(&Query::delete(schema, pk, id))
            .await?;
        Ok(outcome.rows_affected)
    }

    /// Round trip to the database.
    pub async fn ping(&self) -> Result<()> {
        self.storage.ping().await
    }

    fn table(&self, table: &str) -> Result<&TableSchema> {
        self.catalog
            .columns(table)
            .ok_or_else(|| ExplorerError::UnknownTable(table.to_string()))
    }

    fn table_with_pk(&self, table: &str) -> Result<(&TableSchema, &ColumnSchema)> {
        let schema = self.table(table)?;
        let pk = schema
            .primary_key()
            .ok_or_else(|| ExplorerError::NoPrimaryKey(table.to_string()))?;
        Ok((schema, pk))
    }
}
