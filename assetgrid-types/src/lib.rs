//! Core type definitions for AssetGrid.
//!
//! This crate defines the fundamental types shared by the replicated sequence
//! and the reconciliation engine:
//! - Row, table, user and property identifiers (UUID v7; v4 for placeholders)
//! - Heterogeneous cell values and the type-aware convergence comparator
//! - Rows, row patches and the placeholder lifecycle flag
//! - Schema types (properties and sections, read-only input to the engine)
//! - Realtime events broadcast between collaborators
//!
//! Rendering, transport and storage types belong to their respective layers,
//! not here.

mod event;
mod ids;
mod row;
mod schema;
mod value;

pub use event::{RemoteEvent, RemoteEventPayload};
pub use ids::{PropertyId, PropertyKey, RowId, SectionId, TableId, UserId};
pub use row::{Row, RowPatch, UNTITLED};
pub use schema::{Property, PropertyKind, Schema, Section};
pub use value::{converged, MediaDescriptor, Value};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
