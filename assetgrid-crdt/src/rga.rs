//! Replicated Growable Array over arbitrary items.
//!
//! A state-based CRDT for ordered sequences. Each element records the id of
//! the element it was inserted after (its origin); document order is derived
//! deterministically from that graph, so replicas converge regardless of the
//! order in which they exchange state.
//!
//! Deletes tombstone the element rather than removing it, which keeps origin
//! anchors valid across merges.

use assetgrid_types::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for an element in the sequence.
///
/// Ordered by Lamport clock first, so an element created after another (in
/// causal terms) always compares greater; replica id and a per-replica
/// sequence number break ties deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ElementId {
    /// Lamport clock value at creation.
    pub clock: u64,
    /// The replica that created the element.
    pub replica: UserId,
    /// Per-replica creation counter.
    pub seq: u32,
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.clock, self.replica, self.seq)
    }
}

/// One slot in the sequence. `value: None` marks a tombstone.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry<T> {
    id: ElementId,
    /// The element this one was inserted after; `None` anchors at the head.
    origin: Option<ElementId>,
    value: Option<T>,
}

/// A state-based Replicated Growable Array.
///
/// `merge` is commutative, associative and idempotent; concurrent inserts at
/// the same position are ordered by element id (higher id takes the earlier
/// position), so all replicas agree on the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de> + Clone"
))]
pub struct Rga<T> {
    /// All slots in document order, tombstones included.
    entries: Vec<Entry<T>>,
    /// Lamport clock, advanced on every local insert and raised on merge.
    clock: u64,
    /// Per-replica creation counter.
    seq: u32,
    /// This replica's identity.
    replica: UserId,
}

impl<T: Clone> Rga<T> {
    /// Creates an empty sequence owned by `replica`.
    #[must_use]
    pub fn new(replica: UserId) -> Self {
        Self {
            entries: Vec::new(),
            clock: 0,
            seq: 0,
            replica,
        }
    }

    /// Returns this replica's identity.
    #[must_use]
    pub fn replica(&self) -> UserId {
        self.replica
    }

    /// Reassigns the replica identity (after loading persisted state).
    pub fn set_replica(&mut self, replica: UserId) {
        self.replica = replica;
    }

    fn next_id(&mut self) -> ElementId {
        self.clock += 1;
        self.seq += 1;
        ElementId {
            clock: self.clock,
            replica: self.replica,
            seq: self.seq,
        }
    }

    /// Entry index of the `index`-th visible element.
    fn entry_pos(&self, index: usize) -> Option<usize> {
        let mut visible = 0;
        for (pos, entry) in self.entries.iter().enumerate() {
            if entry.value.is_some() {
                if visible == index {
                    return Some(pos);
                }
                visible += 1;
            }
        }
        None
    }

    fn visible_len(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }

    /// Merges another replica's state into this one.
    ///
    /// Unknown elements are adopted, tombstones win over live values, and the
    /// document order is rebuilt from the origin graph afterwards.
    pub fn merge(&mut self, other: &Self) {
        self.clock = self.clock.max(other.clock);

        let mut known: HashMap<ElementId, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();

        let mut changed = false;
        for theirs in &other.entries {
            match known.get(&theirs.id).copied() {
                Some(i) => {
                    if theirs.value.is_none() && self.entries[i].value.is_some() {
                        self.entries[i].value = None;
                    }
                }
                None => {
                    self.entries.push(theirs.clone());
                    known.insert(theirs.id, self.entries.len() - 1);
                    changed = true;
                }
            }
        }

        if changed {
            self.rebuild_order();
        }
    }

    /// Returns a merged copy of two replicas.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    /// Recomputes document order from the origin graph.
    ///
    /// Siblings sharing an origin sort by id descending: a later (causally
    /// greater) insert at the same anchor lands earlier in the document,
    /// matching what the inserting replica observed locally.
    fn rebuild_order(&mut self) {
        let mut children: HashMap<Option<ElementId>, Vec<usize>> = HashMap::new();
        for (i, entry) in self.entries.iter().enumerate() {
            children.entry(entry.origin).or_default().push(i);
        }
        for siblings in children.values_mut() {
            siblings.sort_by(|&a, &b| self.entries[b].id.cmp(&self.entries[a].id));
        }

        let mut order = Vec::with_capacity(self.entries.len());
        let mut stack = Vec::new();
        if let Some(mut roots) = children.remove(&None) {
            roots.reverse();
            stack.extend(roots);
        }
        while let Some(i) = stack.pop() {
            order.push(i);
            if let Some(mut kids) = children.remove(&Some(self.entries[i].id)) {
                kids.reverse();
                stack.extend(kids);
            }
        }

        // State-based merge carries every origin along with its element, so
        // the traversal reaches every entry.
        let mut slots: Vec<Option<Entry<T>>> = std::mem::take(&mut self.entries)
            .into_iter()
            .map(Some)
            .collect();
        self.entries = order
            .into_iter()
            .map(|i| slots[i].take().expect("entry visited exactly once"))
            .collect();
    }
}

impl<T: Clone> super::ReplicatedSequence<T> for Rga<T> {
    fn len(&self) -> usize {
        self.visible_len()
    }

    fn to_vec(&self) -> Vec<T> {
        self.entries
            .iter()
            .filter_map(|e| e.value.clone())
            .collect()
    }

    fn insert(&mut self, index: usize, items: Vec<T>) {
        let index = index.min(self.visible_len());

        // Anchor after the visible element currently before `index`; a fresh
        // local id carries the maximal clock, so placing it directly after its
        // origin agrees with the sibling ordering every other replica computes.
        let (mut origin, mut at) = match index.checked_sub(1).and_then(|i| self.entry_pos(i)) {
            None => (None, 0),
            Some(pos) => (Some(self.entries[pos].id), pos + 1),
        };

        for item in items {
            let id = self.next_id();
            self.entries.insert(
                at,
                Entry {
                    id,
                    origin,
                    value: Some(item),
                },
            );
            origin = Some(id);
            at += 1;
        }
    }

    fn delete(&mut self, index: usize, count: usize) {
        let mut remaining = count;
        let mut visible = 0;
        for entry in self.entries.iter_mut() {
            if entry.value.is_some() {
                if visible >= index {
                    if remaining == 0 {
                        break;
                    }
                    entry.value = None;
                    remaining -= 1;
                } else {
                    visible += 1;
                }
            }
        }
    }
}
