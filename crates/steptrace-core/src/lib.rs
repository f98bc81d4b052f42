//! Step-stream aggregation for the simulator telemetry dashboard.
//!
//! Snapshots arrive in batches, land in an ordered [`StepStream`], and are
//! turned into render-ready panels: bucketed and smoothed rate series, a
//! run-length occupancy timeline, and scrub positions.
//!
//! # Modules
//!
//! - [`stream`] -- Ordered, append-only snapshot history.
//! - [`window`] -- Trailing time-window extraction.
//! - [`bucket`] -- Fixed-interval bucketing with fractional carry.
//! - [`smooth`] -- Rolling-average smoothing.
//! - [`occupancy`] -- Per-slot occupancy runs and per-owner processor runs.
//! - [`nearest`] -- Binary-search scrub lookup.
//! - [`navigate`] -- [`StepCursor`] and axis ticks.
//! - [`panel`] -- Rate panel derivation and metrics.
//! - [`session`] -- [`Session`], one live connection's state.
//! - [`feed`] -- JSON-lines feed decoding.
//! - [`config`] -- Configuration loading from `steptrace-config.yaml` into
//!   strongly-typed structs.
//!
//! [`StepStream`]: stream::StepStream
//! [`StepCursor`]: navigate::StepCursor
//! [`Session`]: session::Session

pub mod bucket;
pub mod config;
pub mod feed;
pub mod navigate;
pub mod nearest;
pub mod occupancy;
pub mod panel;
pub mod session;
pub mod smooth;
pub mod stream;
pub mod window;
