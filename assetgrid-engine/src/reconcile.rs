//! Reconciliation of the replicated sequence against authoritative data.
//!
//! Every time the persistence layer delivers the authoritative row list, one
//! pass aligns the shared sequence with it using the cheapest safe strategy:
//! bootstrap into an empty sequence, patch row contents in place when the id
//! sets and order agree, or replace the sequence wholesale. Locally-pending
//! placeholder rows survive every strategy.

use assetgrid_crdt::ReplicatedSequence;
use assetgrid_types::{Row, RowId};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Tunables for the reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Minimum `|sequence ∩ authoritative| / |authoritative|` ratio for the
    /// incoming data to be treated as a refresh of the current data set.
    ///
    /// Below the threshold the pass replaces the sequence outright and skips
    /// placeholder pairing (the rows belong to an unrelated data set, e.g.
    /// after switching tables). This is a heuristic, not a guaranteed
    /// classifier: a legitimate partial refresh near the threshold can be
    /// misclassified, which costs a full replacement but never corrupts.
    pub overlap_threshold: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.3,
        }
    }
}

/// Which strategy a reconciliation pass applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStrategy {
    /// Sequence already matched the authoritative list.
    Noop,
    /// Empty sequence seeded with the authoritative list.
    Bootstrap,
    /// Row contents replaced in place; ids and order already agreed.
    Patch,
    /// Sequence rebuilt from the authoritative list.
    Replace,
}

/// What a reconciliation pass did.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub strategy: ReconcileStrategy,
    /// Rows whose content was replaced in place.
    pub patched: usize,
    /// Rows inserted by a bootstrap or replacement.
    pub replaced: usize,
    /// Placeholder rows resolved to authoritative rows.
    pub placeholders_resolved: usize,
    /// True if the pass was refused because another was in progress.
    pub deferred: bool,
}

impl ReconcileOutcome {
    fn deferred() -> Self {
        Self {
            strategy: ReconcileStrategy::Noop,
            patched: 0,
            replaced: 0,
            placeholders_resolved: 0,
            deferred: true,
        }
    }
}

/// Merges authoritative row lists into the replicated sequence.
#[derive(Debug, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
    in_progress: bool,
}

impl Reconciler {
    /// Creates a reconciler with the given tunables.
    #[must_use]
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            in_progress: false,
        }
    }

    /// Runs one reconciliation pass.
    ///
    /// Passes must not interleave: both patching and replacement mutate the
    /// sequence by index, so a pass that arrives while another is running is
    /// refused and reported as deferred — the caller re-runs it with fresh
    /// authoritative data.
    pub fn reconcile<S: ReplicatedSequence<Row>>(
        &mut self,
        seq: &mut S,
        authoritative: &[Row],
    ) -> ReconcileOutcome {
        if self.in_progress {
            warn!("reconcile pass already in progress, deferring");
            return ReconcileOutcome::deferred();
        }
        self.in_progress = true;
        let outcome = self.run(seq, authoritative);
        self.in_progress = false;
        info!(
            "reconcile: {:?} (patched {}, replaced {}, placeholders {})",
            outcome.strategy, outcome.patched, outcome.replaced, outcome.placeholders_resolved
        );
        outcome
    }

    fn run<S: ReplicatedSequence<Row>>(
        &mut self,
        seq: &mut S,
        authoritative: &[Row],
    ) -> ReconcileOutcome {
        let current = seq.to_vec();

        // Bootstrap: nothing local yet.
        if current.is_empty() {
            if authoritative.is_empty() {
                return ReconcileOutcome {
                    strategy: ReconcileStrategy::Noop,
                    patched: 0,
                    replaced: 0,
                    placeholders_resolved: 0,
                    deferred: false,
                };
            }
            seq.insert(0, authoritative.to_vec());
            return ReconcileOutcome {
                strategy: ReconcileStrategy::Bootstrap,
                patched: 0,
                replaced: authoritative.len(),
                placeholders_resolved: 0,
                deferred: false,
            };
        }

        let persisted_ids: HashSet<RowId> =
            current.iter().filter(|r| !r.pending).map(|r| r.id).collect();
        let auth_ids: HashSet<RowId> = authoritative.iter().map(|r| r.id).collect();

        let overlap = if authoritative.is_empty() {
            0.0
        } else {
            let shared = auth_ids.intersection(&persisted_ids).count();
            shared as f64 / authoritative.len() as f64
        };
        let related = persisted_ids.is_empty() || overlap >= self.config.overlap_threshold;

        let mut placeholders_resolved = 0;
        if related {
            placeholders_resolved = self.resolve_placeholders(seq, authoritative, &persisted_ids);
        } else {
            debug!(
                "overlap {:.2} below threshold {:.2}, treating as unrelated data set",
                overlap, self.config.overlap_threshold
            );
        }

        // Re-read after placeholder resolution.
        let current = seq.to_vec();
        let persisted: Vec<&Row> = current.iter().filter(|r| !r.pending).collect();
        let persisted_ids: HashSet<RowId> = persisted.iter().map(|r| r.id).collect();

        if related && persisted_ids == auth_ids {
            let order_matches = persisted
                .iter()
                .map(|r| r.id)
                .eq(authoritative.iter().map(|r| r.id));
            if order_matches {
                let patched = Self::patch_in_place(seq, authoritative, &current);
                let strategy = if patched == 0 {
                    ReconcileStrategy::Noop
                } else {
                    ReconcileStrategy::Patch
                };
                return ReconcileOutcome {
                    strategy,
                    patched,
                    replaced: 0,
                    placeholders_resolved,
                    deferred: false,
                };
            }
            debug!("id sets match but order differs, replacing");
        }

        let replaced = Self::replace_all(seq, authoritative, &current);
        ReconcileOutcome {
            strategy: ReconcileStrategy::Replace,
            patched: 0,
            replaced,
            placeholders_resolved,
            deferred: false,
        }
    }

    /// Pairs authoritative rows that are new to the sequence with placeholder
    /// rows, positionally, replacing each placeholder where it sits so the
    /// inserting user's visual anchor is preserved.
    fn resolve_placeholders<S: ReplicatedSequence<Row>>(
        &self,
        seq: &mut S,
        authoritative: &[Row],
        persisted_ids: &HashSet<RowId>,
    ) -> usize {
        let current = seq.to_vec();
        let placeholder_positions: Vec<usize> = current
            .iter()
            .enumerate()
            .filter(|(_, r)| r.pending)
            .map(|(i, _)| i)
            .collect();
        if placeholder_positions.is_empty() {
            return 0;
        }

        let new_rows: Vec<&Row> = authoritative
            .iter()
            .filter(|r| !persisted_ids.contains(&r.id))
            .collect();

        let paired = placeholder_positions.len().min(new_rows.len());
        for i in 0..paired {
            let pos = placeholder_positions[i];
            seq.delete(pos, 1);
            seq.insert(pos, vec![new_rows[i].clone()]);
            debug!(
                "placeholder at {} resolved to authoritative row {}",
                pos, new_rows[i].id
            );
        }
        paired
    }

    /// Replaces differing row contents in place, walking from the highest
    /// index down so earlier positions stay valid during the loop.
    fn patch_in_place<S: ReplicatedSequence<Row>>(
        seq: &mut S,
        authoritative: &[Row],
        current: &[Row],
    ) -> usize {
        let mut patched = 0;
        for auth_row in authoritative.iter().rev() {
            let Some(pos) = current.iter().position(|r| r.id == auth_row.id) else {
                continue;
            };
            if !current[pos].content_matches(auth_row) {
                seq.delete(pos, 1);
                seq.insert(pos, vec![auth_row.clone()]);
                patched += 1;
            }
        }
        patched
    }

    /// Rebuilds the sequence from the authoritative list, re-inserting
    /// placeholder rows after their prior predecessor where that row still
    /// exists, at the tail otherwise.
    fn replace_all<S: ReplicatedSequence<Row>>(
        seq: &mut S,
        authoritative: &[Row],
        current: &[Row],
    ) -> usize {
        // Remember each placeholder together with the nearest non-placeholder
        // row above it, which anchors its re-insertion.
        let mut placeholders: Vec<(Row, Option<RowId>)> = Vec::new();
        let mut last_persisted: Option<RowId> = None;
        for row in current {
            if row.pending {
                placeholders.push((row.clone(), last_persisted));
            } else {
                last_persisted = Some(row.id);
            }
        }

        seq.delete(0, seq.len());
        seq.insert(0, authoritative.to_vec());

        for (placeholder, anchor) in placeholders {
            let snapshot = seq.to_vec();
            let mut pos = anchor
                .and_then(|id| snapshot.iter().position(|r| r.id == id).map(|p| p + 1))
                .unwrap_or(snapshot.len());
            // Keep placeholders that shared an anchor in their original order.
            while pos < snapshot.len() && snapshot[pos].pending {
                pos += 1;
            }
            seq.insert(pos, vec![placeholder]);
        }

        authoritative.len()
    }
}
