//! Shared test support: an in-memory persistence double and fixtures.
#![allow(dead_code)] // each test binary uses a different slice of this module

use assetgrid_engine::PersistenceError;
use assetgrid_engine::PersistenceService;
use assetgrid_types::{
    Property, PropertyKey, Row, RowId, RowPatch, Schema, Section, TableId, Value,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One recorded persistence call, for call-shape assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create,
    UpdateRow(RowId),
    UpdateRows(usize),
    DeleteRow(RowId),
    DeleteRows(usize),
}

/// In-memory persistence double.
///
/// Keeps an authoritative row list that tests feed back through
/// `apply_authoritative`, records every call, and injects failures on demand.
#[derive(Default)]
pub struct MockPersistence {
    rows: Mutex<Vec<Row>>,
    calls: Mutex<Vec<Call>>,
    fail_updates: AtomicBool,
    fail_creates: AtomicBool,
    fail_deletes: AtomicBool,
    /// Ids whose delete reports NotFound (already removed elsewhere).
    missing: Mutex<HashSet<RowId>>,
    /// Ids whose individual delete fails with a transport error.
    failing_ids: Mutex<HashSet<RowId>>,
    batch_delete: bool,
}

impl MockPersistence {
    pub fn new() -> Self {
        Self {
            batch_delete: true,
            ..Self::default()
        }
    }

    pub fn without_batch_delete() -> Self {
        Self {
            batch_delete: false,
            ..Self::default()
        }
    }

    /// Seeds the authoritative store.
    pub fn seed(&self, rows: Vec<Row>) {
        *self.rows.lock().unwrap() = rows;
    }

    /// The authoritative list, ordered by ordering key, as the reader
    /// delivers it.
    pub fn snapshot(&self) -> Vec<Row> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|r| r.row_index);
        rows
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn mark_missing(&self, id: RowId) {
        self.missing.lock().unwrap().insert(id);
    }

    pub fn fail_delete_of(&self, id: RowId) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PersistenceService for MockPersistence {
    async fn create_row(
        &self,
        table_id: TableId,
        name: &str,
        values: &HashMap<PropertyKey, Value>,
        ordering_hint: Option<i64>,
    ) -> Result<RowId, PersistenceError> {
        self.record(Call::Create);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(PersistenceError::Transport("create refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let row_index = ordering_hint.unwrap_or(rows.len() as i64 + 1);
        let mut row = Row::new(RowId::new(), table_id, name, row_index);
        row.values = values.clone();
        let id = row.id;
        rows.push(row);
        Ok(id)
    }

    async fn update_row(
        &self,
        id: RowId,
        name: Option<&str>,
        values: &HashMap<PropertyKey, Value>,
    ) -> Result<(), PersistenceError> {
        self.record(Call::UpdateRow(id));
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(PersistenceError::Transport("update refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PersistenceError::NotFound)?;
        if let Some(name) = name {
            row.name = name.to_string();
        }
        for (key, value) in values {
            row.values.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn update_rows(&self, batch: &[RowPatch]) -> Result<(), PersistenceError> {
        self.record(Call::UpdateRows(batch.len()));
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(PersistenceError::Transport("batch update refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        for patch in batch {
            let Some(row) = rows.iter_mut().find(|r| r.id == patch.row_id) else {
                continue;
            };
            if let Some(name) = &patch.name {
                row.name = name.clone();
            }
            for (key, value) in &patch.values {
                row.values.insert(key.clone(), value.clone());
            }
            if let Some(index) = patch.row_index {
                row.row_index = index;
            }
        }
        Ok(())
    }

    async fn delete_row(&self, id: RowId) -> Result<(), PersistenceError> {
        self.record(Call::DeleteRow(id));
        if self.missing.lock().unwrap().contains(&id) {
            return Err(PersistenceError::NotFound);
        }
        if self.fail_deletes.load(Ordering::SeqCst)
            || self.failing_ids.lock().unwrap().contains(&id)
        {
            return Err(PersistenceError::Transport("delete refused".into()));
        }
        self.rows.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn delete_rows(&self, ids: &[RowId]) -> Result<(), PersistenceError> {
        self.record(Call::DeleteRows(ids.len()));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Transport("batch delete refused".into()));
        }
        self.rows.lock().unwrap().retain(|r| !ids.contains(&r.id));
        Ok(())
    }

    fn supports_batch_delete(&self) -> bool {
        self.batch_delete
    }
}

/// An engine over a fresh in-memory sequence and the given mock.
pub fn build_engine(
    mock: std::sync::Arc<MockPersistence>,
    table_id: TableId,
) -> assetgrid_engine::TableEngine<assetgrid_crdt::LocalSequence<Row>> {
    assetgrid_engine::TableEngine::new(
        table_id,
        test_schema(),
        assetgrid_crdt::LocalSequence::new(),
        mock,
        assetgrid_engine::TableEngineConfig::default(),
    )
}

/// A schema with a text, a boolean, an integer and a float column.
pub fn test_schema() -> Schema {
    let section = Section::new("General", 0);
    Schema::new(
        vec![section.clone()],
        vec![
            Property::text("color", "Color", section.id, 0),
            Property::boolean("done", "Done", section.id, 1),
            Property::integer("count", "Count", section.id, 2),
            Property::float("price", "Price", section.id, 3),
        ],
    )
}

/// `n` persisted rows in one table, keys 1..=n.
pub fn seeded_rows(table_id: TableId, n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            Row::new(RowId::new(), table_id, format!("Asset {i}"), i as i64 + 1)
                .with_value("color", Value::Text(format!("c{i}")))
        })
        .collect()
}
