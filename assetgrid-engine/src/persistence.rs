//! The persistence seam.
//!
//! The engine issues every durable mutation through [`PersistenceService`];
//! the authoritative row list comes back through
//! [`TableEngine::apply_authoritative`](crate::TableEngine::apply_authoritative)
//! after the caller re-reads it. Any transport (HTTP API, local database,
//! in-memory test double) can sit behind this trait.

use crate::error::PersistenceError;
use assetgrid_types::{PropertyKey, RowId, RowPatch, TableId, Value};
use async_trait::async_trait;
use std::collections::HashMap;

/// Durable row mutations.
///
/// All calls may fail with a [`PersistenceError`]; the engine catches every
/// failure at the operator boundary and rolls back its optimistic state.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Creates a row and returns its authoritative id.
    async fn create_row(
        &self,
        table_id: TableId,
        name: &str,
        values: &HashMap<PropertyKey, Value>,
        ordering_hint: Option<i64>,
    ) -> Result<RowId, PersistenceError>;

    /// Replaces a row's name and the given property values.
    async fn update_row(
        &self,
        id: RowId,
        name: Option<&str>,
        values: &HashMap<PropertyKey, Value>,
    ) -> Result<(), PersistenceError>;

    /// Applies a batch of per-row patches in one call.
    async fn update_rows(&self, batch: &[RowPatch]) -> Result<(), PersistenceError>;

    /// Deletes one row.
    async fn delete_row(&self, id: RowId) -> Result<(), PersistenceError>;

    /// Deletes several rows in one call. Only invoked when
    /// [`supports_batch_delete`](Self::supports_batch_delete) returns true.
    async fn delete_rows(&self, ids: &[RowId]) -> Result<(), PersistenceError>;

    /// Whether the backend accepts multi-id deletes.
    fn supports_batch_delete(&self) -> bool {
        true
    }
}
