//! Simulator snapshot records.
//!
//! A [`Snapshot`] is one step of simulator state as delivered by the
//! backend. The engine reads a handful of typed fields from it (clock,
//! attributed duration, active owner, slot occupants, fault count) and
//! carries every other field through untouched in [`Snapshot::extra`].

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

/// Opaque identifier of whatever currently occupies a resource slot
/// (for a memory simulator: the page held by a frame).
///
/// The value `0` is the free sentinel. A JSON `null` also decodes as free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct SlotOccupant(pub u64);

impl SlotOccupant {
    /// The free sentinel.
    pub const FREE: Self = Self(0);

    /// Whether the slot is unoccupied.
    pub const fn is_free(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for SlotOccupant {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl<'de> Deserialize<'de> for SlotOccupant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map_or(Self::FREE, Self))
    }
}

/// Simulator state at one logical clock tick.
///
/// Immutable once ingested: the engine only ever derives auxiliary series
/// from a snapshot, it never rewrites one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Logical timestamp in milliseconds. Primary ordering key.
    pub clock: u64,
    /// Time attributed to this step in milliseconds. Only bucketing reads it.
    #[serde(default)]
    pub duration: f64,
    /// Process active during this step, `None` when idle.
    #[serde(default, alias = "ownerId")]
    pub owner_id: Option<u32>,
    /// Occupant of each resource slot, indexed by slot address.
    #[serde(default, alias = "resourceSlots")]
    pub resource_slots: Vec<SlotOccupant>,
    /// Fault events attributable to this step.
    #[serde(default, alias = "faultCount")]
    pub fault_count: u64,
    /// Simulator-specific fields passed through opaquely.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Snapshot {
    /// Create an idle snapshot at `clock` with no duration, slots, or faults.
    pub fn new(clock: u64) -> Self {
        Self {
            clock,
            duration: 0.0,
            owner_id: None,
            resource_slots: Vec::new(),
            fault_count: 0,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the attributed duration.
    #[must_use]
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Set the active owner.
    #[must_use]
    pub fn with_owner(mut self, owner_id: u32) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Set the slot occupants from raw identifiers.
    #[must_use]
    pub fn with_slots(mut self, slots: &[u64]) -> Self {
        self.resource_slots = slots.iter().copied().map(SlotOccupant).collect();
        self
    }

    /// Set the fault count.
    #[must_use]
    pub fn with_faults(mut self, fault_count: u64) -> Self {
        self.fault_count = fault_count;
        self
    }

    /// Duration usable for time arithmetic: negative or non-finite values
    /// count as zero.
    pub fn effective_duration(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration
        } else {
            0.0
        }
    }

    /// Occupant of `slot`, reading slots past the end as free.
    pub fn occupant(&self, slot: usize) -> SlotOccupant {
        self.resource_slots
            .get(slot)
            .copied()
            .unwrap_or(SlotOccupant::FREE)
    }

    /// Number of slots currently held by some occupant.
    pub fn occupied_slots(&self) -> usize {
        self.resource_slots.iter().filter(|s| !s.is_free()).count()
    }

    /// Whether no owner was active during this step.
    pub const fn is_idle(&self) -> bool {
        self.owner_id.is_none()
    }
}
