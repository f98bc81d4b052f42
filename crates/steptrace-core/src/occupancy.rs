//! Run-length compression for the timeline panel.
//!
//! Occupancy is piecewise constant between snapshots, so the timeline view
//! renders one rectangle per stable interval instead of one per snapshot.
//! [`owner_runs`] does the same for which owner held the processor.
//!
//! History is kept in an arena: every block lives in one `Vec`, each slot
//! holds the arena index of its open block, and each block points back to
//! the previous block of the same slot. Updating a slot touches only its
//! open block, and no block is ever shared mutably between slots.

use steptrace_types::{OccupancyBlock, OwnerRun, Snapshot};
use tracing::debug;

/// Compress `snapshots` into contiguous occupancy blocks.
///
/// The output lists every block of slot 0 in temporal order, then slot 1,
/// and so on. The first snapshot fixes the slot count and opens one block
/// per slot starting at clock `0`. Empty input yields no blocks.
pub fn compress(snapshots: &[Snapshot]) -> Vec<OccupancyBlock> {
    let mut tracker = OccupancyTracker::new();
    for snapshot in snapshots {
        tracker.observe(snapshot);
    }
    tracker.blocks()
}

/// Group consecutive snapshots scheduled for the same owner into runs.
///
/// Snapshots that did not execute (zero effective duration) are skipped.
/// Idle snapshots group into `None` runs like any other owner. A run starts
/// when its first snapshot began executing (`clock - duration`) and ends at
/// the clock of its last snapshot.
#[allow(clippy::cast_precision_loss)]
pub fn owner_runs(snapshots: &[Snapshot]) -> Vec<OwnerRun> {
    let mut runs: Vec<OwnerRun> = Vec::new();
    for snapshot in snapshots {
        let duration = snapshot.effective_duration();
        if duration <= 0.0 {
            continue;
        }
        let clock = snapshot.clock as f64;
        match runs.last_mut() {
            Some(run) if run.owner == snapshot.owner_id => run.end = clock,
            _ => runs.push(OwnerRun {
                owner: snapshot.owner_id,
                start: clock - duration,
                end: clock,
            }),
        }
    }
    runs
}

#[derive(Debug, Clone)]
struct ArenaBlock {
    block: OccupancyBlock,
    /// Arena index of the same slot's preceding block.
    previous: Option<usize>,
}

/// Incremental occupancy history for one stream.
///
/// Feeding snapshots one by one through [`OccupancyTracker::observe`]
/// yields exactly what [`compress`] yields over the same sequence.
#[derive(Debug, Clone, Default)]
pub struct OccupancyTracker {
    arena: Vec<ArenaBlock>,
    /// Arena index of each slot's open block; length fixed by the first
    /// observed snapshot.
    open: Box<[usize]>,
    observed: usize,
    clock: u64,
}

impl OccupancyTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots tracked.
    pub fn slot_count(&self) -> usize {
        self.open.len()
    }

    /// Number of snapshots folded in so far.
    pub const fn observed(&self) -> usize {
        self.observed
    }

    /// Clock of the last folded snapshot.
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Fold one snapshot into the history.
    pub fn observe(&mut self, snapshot: &Snapshot) {
        let clock = snapshot.clock;

        if self.observed == 0 {
            self.open = snapshot
                .resource_slots
                .iter()
                .enumerate()
                .map(|(slot, &occupant)| {
                    self.arena.push(ArenaBlock {
                        block: OccupancyBlock {
                            slot,
                            occupant,
                            start: 0,
                            end: clock,
                        },
                        previous: None,
                    });
                    self.arena.len().saturating_sub(1)
                })
                .collect();
        } else {
            for (slot, open_index) in self.open.iter_mut().enumerate() {
                let occupant = snapshot.occupant(slot);
                let Some(current) = self.arena.get_mut(*open_index) else {
                    continue;
                };
                if current.block.occupant == occupant {
                    current.block.end = clock;
                    continue;
                }

                let start = current.block.end;
                let previous = *open_index;
                *open_index = self.arena.len();
                self.arena.push(ArenaBlock {
                    block: OccupancyBlock {
                        slot,
                        occupant,
                        start,
                        end: clock,
                    },
                    previous: Some(previous),
                });
            }
        }

        self.observed = self.observed.saturating_add(1);
        self.clock = clock;
    }

    /// Bring the history in line with `steps` after an ingest whose lowest
    /// changed index is `first_changed`.
    ///
    /// Snapshots appended after the tail are folded in place. A batch that
    /// landed inside the already-folded history forces a rebuild.
    pub fn sync(&mut self, steps: &[Snapshot], first_changed: Option<usize>) {
        let Some(first_changed) = first_changed else {
            return;
        };

        if first_changed < self.observed || steps.len() < self.observed {
            debug!(
                first_changed,
                observed = self.observed,
                "out-of-order batch rewrote history, rebuilding occupancy"
            );
            self.rebuild(steps);
            return;
        }

        for snapshot in steps.get(self.observed..).unwrap_or_default() {
            self.observe(snapshot);
        }
    }

    /// Discard the history and fold `steps` from scratch.
    pub fn rebuild(&mut self, steps: &[Snapshot]) {
        *self = Self::new();
        for snapshot in steps {
            self.observe(snapshot);
        }
    }

    /// All blocks, slot by slot, each slot in temporal order.
    pub fn blocks(&self) -> Vec<OccupancyBlock> {
        (0..self.slot_count())
            .flat_map(|slot| self.slot_history(slot))
            .collect()
    }

    /// Blocks of one slot in temporal order, following back-references from
    /// the open block.
    pub fn slot_history(&self, slot: usize) -> Vec<OccupancyBlock> {
        let mut history = Vec::new();
        let mut cursor = self.open.get(slot).copied();
        while let Some(index) = cursor {
            let Some(entry) = self.arena.get(index) else {
                break;
            };
            history.push(entry.block);
            cursor = entry.previous;
        }
        history.reverse();
        history
    }
}
