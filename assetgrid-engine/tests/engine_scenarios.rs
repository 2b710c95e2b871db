//! End-to-end scenarios across reconciliation, editing and batch operators.

mod common;

use assetgrid_engine::{CellField, Placement, ReconcileStrategy};
use assetgrid_types::{RemoteEvent, TableId, UserId, Value};
use common::{build_engine, seeded_rows, MockPersistence};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn switching_tables_replaces_but_keeps_pending_placeholder() {
    // A placeholder is pending when the client switches to a different
    // table: zero id overlap forces a full replacement, and the placeholder
    // survives at the tail.
    let table_a = TableId::new();
    let mock = Arc::new(MockPersistence::new());
    let rows_a = seeded_rows(table_a, 3);
    mock.seed(rows_a.clone());
    let mut engine = build_engine(mock.clone(), table_a);
    engine.apply_authoritative(&mock.snapshot());

    // Start an insert whose creation never lands (backend down).
    mock.fail_creates(true);
    engine.selection_mut().context_row = Some(rows_a[1].id);
    let _ = engine.insert_rows(Placement::Below, 1).await;
    // The failed creation removed its placeholder; make one that is still
    // genuinely pending instead.
    mock.fail_creates(false);
    engine.selection_mut().context_row = Some(rows_a[1].id);
    let kept = engine.insert_rows(Placement::Below, 1).await.unwrap();
    assert_eq!(kept.len(), 1);

    // The viewer switches tables before the authoritative read for the
    // creation arrives.
    let table_b = TableId::new();
    let rows_b = seeded_rows(table_b, 4);
    let outcome = engine.apply_authoritative(&rows_b);
    assert_eq!(outcome.strategy, ReconcileStrategy::Replace);

    let display = engine.display_rows();
    assert_eq!(display.len(), 5);
    for (row, expected) in display.iter().zip(&rows_b) {
        assert_eq!(row.id, expected.id);
    }
    assert_eq!(display[4].id, kept[0]);
    assert!(display[4].pending);
}

#[tokio::test]
async fn disjoint_edits_converge_regardless_of_arrival_order() {
    // One local edit and two remote events touching three different cells:
    // every arrival order ends with the same display state, equal to the
    // authoritative content for every touched cell.
    let table = TableId::new();
    let remote_user = UserId::new();

    let run = |order: Vec<usize>| {
        let mock = Arc::new(MockPersistence::new());
        let rows = seeded_rows(table, 2);
        mock.seed(rows.clone());
        async move {
            let mut engine = build_engine(mock.clone(), table);
            engine.apply_authoritative(&mock.snapshot());
            let (r0, r1) = (rows[0].id, rows[1].id);

            let events = [
                RemoteEvent::cell_update(r0, remote_user, "Grace", "count", Value::Integer(7)),
                RemoteEvent::name_update(r1, remote_user, "Grace", "Remote name"),
            ];

            for step in order {
                match step {
                    0 => engine.handle_remote(events[0].clone()),
                    1 => engine.handle_remote(events[1].clone()),
                    _ => {
                        engine
                            .begin_edit(r0, CellField::Property("color".into()))
                            .unwrap();
                        engine.set_draft("Local");
                        engine.save_cell().await.unwrap();
                    }
                }
            }

            let display = engine.display_rows();
            let row0 = display.iter().find(|r| r.id == r0).unwrap();
            let row1 = display.iter().find(|r| r.id == r1).unwrap();
            (
                row0.value(&"color".into()).cloned(),
                row0.value(&"count".into()).cloned(),
                row1.name.clone(),
            )
        }
    };

    let orders = [vec![0, 1, 2], vec![2, 0, 1], vec![1, 2, 0], vec![2, 1, 0]];
    let mut results = Vec::new();
    for order in orders {
        results.push(run(order).await);
    }
    for result in &results {
        assert_eq!(result.0, Some(Value::Text("Local".into())));
        assert_eq!(result.1, Some(Value::Integer(7)));
        assert_eq!(result.2, "Remote name");
    }
}

#[tokio::test]
async fn repeated_inserts_keep_ordering_keys_unique_and_increasing() {
    let table = TableId::new();
    let mock = Arc::new(MockPersistence::new());
    let rows = seeded_rows(table, 3);
    mock.seed(rows.clone());
    let mut engine = build_engine(mock.clone(), table);
    engine.apply_authoritative(&mock.snapshot());

    engine.selection_mut().context_row = Some(rows[1].id);
    engine.insert_rows(Placement::Above, 2).await.unwrap();
    engine.apply_authoritative(&mock.snapshot());

    let display = engine.display_rows();
    engine.selection_mut().context_row = Some(display[0].id);
    engine.insert_rows(Placement::Below, 1).await.unwrap();
    engine.apply_authoritative(&mock.snapshot());

    let keys: Vec<i64> = engine.display_rows().iter().map(|r| r.row_index).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), keys.len(), "duplicate ordering keys: {keys:?}");
    assert!(
        keys.windows(2).all(|w| w[0] < w[1]),
        "keys not increasing in display order: {keys:?}"
    );
    assert_eq!(engine.display_rows().len(), 6);
}

#[tokio::test]
async fn full_lifecycle_create_edit_delete() {
    let table = TableId::new();
    let mock = Arc::new(MockPersistence::new());
    mock.seed(seeded_rows(table, 1));
    let mut engine = build_engine(mock.clone(), table);
    engine.apply_authoritative(&mock.snapshot());

    // Create below the only row and let the read resolve it.
    engine.selection_mut().context_row = Some(engine.display_rows()[0].id);
    engine.insert_rows(Placement::Below, 1).await.unwrap();
    engine.apply_authoritative(&mock.snapshot());
    let display = engine.display_rows();
    assert_eq!(display.len(), 2);
    let new_row = display[1].clone();
    assert!(!new_row.pending);

    // Name it.
    engine.begin_edit(new_row.id, CellField::Name).unwrap();
    engine.set_draft("Fresh asset");
    engine.save_cell().await.unwrap();
    engine.apply_authoritative(&mock.snapshot());
    assert_eq!(engine.display_rows()[1].name, "Fresh asset");

    // Delete it and confirm through the read.
    engine.delete_rows(&[new_row.id]).await.unwrap();
    engine.apply_authoritative(&mock.snapshot());
    assert_eq!(engine.display_rows().len(), 1);
}
