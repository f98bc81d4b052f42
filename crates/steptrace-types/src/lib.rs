//! Shared type definitions for the steptrace aggregation engine.
//!
//! This crate is the single source of truth for the records that flow
//! between the simulator feed, the engine, and the dashboard. Types are
//! exported to `TypeScript` via `ts-rs` so the rendering layer consumes the
//! exact shapes the engine produces.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers ([`SessionId`])
//! - [`snapshot`] -- Simulator step records ([`Snapshot`], [`SlotOccupant`])
//! - [`panels`] -- Render-ready panel outputs (buckets, occupancy blocks,
//!   owner runs, session frames)

pub mod ids;
pub mod panels;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use ids::SessionId;
pub use panels::{
    Bucket, OccupancyBlock, OwnerRun, RateSeries, SessionFrame, TimelinePanel, ValueDomain,
};
pub use snapshot::{SlotOccupant, Snapshot};
