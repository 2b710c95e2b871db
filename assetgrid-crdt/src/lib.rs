//! Replicated sequence primitives for AssetGrid.
//!
//! The reconciliation engine never touches a concrete replication algorithm;
//! it speaks to an ordered collection through [`ReplicatedSequence`]:
//!
//! - [`LocalSequence<T>`] — plain `Vec` implementation for single-user and
//!   test contexts
//! - [`Rga<T>`] — a state-based Replicated Growable Array whose merge is
//!   commutative, associative and idempotent, for multi-replica contexts
//!
//! Both implementations preserve insertion order under the four trait
//! operations, which is all the engine relies on.

mod rga;
mod sequence;

pub use rga::{ElementId, Rga};
pub use sequence::{LocalSequence, ReplicatedSequence};
