//! Realtime events broadcast between collaborators.
//!
//! Each event describes one confirmed mutation made by another client:
//! a single-cell update, a row creation, or a row deletion. Events carry the
//! author's identity so conflicts can name who made the competing edit.

use crate::ids::{PropertyKey, RowId, UserId};
use crate::row::Row;
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The operation carried by a realtime event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum RemoteEventPayload {
    /// A single cell changed. `property_key: None` addresses the display
    /// name, which shares the cell-update path.
    CellUpdate {
        property_key: Option<PropertyKey>,
        value: Value,
    },
    /// A row was created.
    AssetCreated { row: Row },
    /// A row was deleted.
    AssetDeleted,
}

/// A confirmed mutation broadcast by another collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// The row the event applies to.
    pub row_id: RowId,
    /// Who made the change.
    pub user_id: UserId,
    /// Display name of the author, for conflict surfacing.
    pub user_name: String,
    /// When the change was made.
    pub timestamp: DateTime<Utc>,
    /// The operation.
    pub payload: RemoteEventPayload,
}

impl RemoteEvent {
    /// Creates a cell-update event for a property column.
    #[must_use]
    pub fn cell_update(
        row_id: RowId,
        user_id: UserId,
        user_name: impl Into<String>,
        property_key: impl Into<PropertyKey>,
        value: Value,
    ) -> Self {
        Self {
            row_id,
            user_id,
            user_name: user_name.into(),
            timestamp: Utc::now(),
            payload: RemoteEventPayload::CellUpdate {
                property_key: Some(property_key.into()),
                value,
            },
        }
    }

    /// Creates a cell-update event for the display name.
    #[must_use]
    pub fn name_update(
        row_id: RowId,
        user_id: UserId,
        user_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            row_id,
            user_id,
            user_name: user_name.into(),
            timestamp: Utc::now(),
            payload: RemoteEventPayload::CellUpdate {
                property_key: None,
                value: Value::Text(name.into()),
            },
        }
    }

    /// Creates an asset-created event.
    #[must_use]
    pub fn asset_created(user_id: UserId, user_name: impl Into<String>, row: Row) -> Self {
        Self {
            row_id: row.id,
            user_id,
            user_name: user_name.into(),
            timestamp: Utc::now(),
            payload: RemoteEventPayload::AssetCreated { row },
        }
    }

    /// Creates an asset-deleted event.
    #[must_use]
    pub fn asset_deleted(row_id: RowId, user_id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            row_id,
            user_id,
            user_name: user_name.into(),
            timestamp: Utc::now(),
            payload: RemoteEventPayload::AssetDeleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TableId;

    #[test]
    fn cell_update_round_trips_through_json() {
        let ev = RemoteEvent::cell_update(
            RowId::new(),
            UserId::new(),
            "Ada",
            "color",
            Value::Text("Blue".into()),
        );
        let json = serde_json::to_string(&ev).unwrap();
        let back: RemoteEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn name_update_has_no_property_key() {
        let ev = RemoteEvent::name_update(RowId::new(), UserId::new(), "Ada", "Renamed");
        match ev.payload {
            RemoteEventPayload::CellUpdate { property_key, .. } => {
                assert!(property_key.is_none());
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn asset_created_uses_row_id() {
        let row = Row::new(RowId::new(), TableId::new(), "A", 1);
        let id = row.id;
        let ev = RemoteEvent::asset_created(UserId::new(), "Ada", row);
        assert_eq!(ev.row_id, id);
    }
}
