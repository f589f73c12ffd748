//! System-wide constants for the GRASP workspace.
//!
//! Single source of truth for the numeric tolerances and safety
//! defaults shared by both workspace crates.

use std::f64::consts::PI;

/// Absolute convergence tolerance for the per-cycle advance [raw units].
///
/// A joint whose commanded position is within this band of its target is
/// individually converged and does not move that cycle.
pub const CONVERGENCE_TOLERANCE: f64 = 0.001;

/// Default fraction of each joint's max velocity used during convergence.
pub const DEFAULT_PERCENT_VMAX: f64 = 0.25;

/// Default command-vs-measured divergence threshold [rad] (8°).
pub const DEFAULT_DIVERGENCE_THRESHOLD: f64 = 8.0 * PI / 180.0;

/// Default number of consecutive over-threshold cycles before the
/// supervisor intervenes.
pub const DEFAULT_TRIGGER_CYCLE_COUNT: u32 = 5;

/// Default one-shot release offset applied on intervention [rad] (2°).
pub const DEFAULT_RELEASE_OFFSET: f64 = 2.0 * PI / 180.0;

/// Synthetic close position substituted for a joint the robot model does
/// not know. The span is deliberately tiny and the joint gets zero max
/// velocity, so it stays controllable but inert.
pub const DEGENERATE_CLOSE: f64 = -0.01;

/// Synthetic open position paired with [`DEGENERATE_CLOSE`].
pub const DEGENERATE_OPEN: f64 = 0.01;

/// Default control cycle time in microseconds (5ms = 200 Hz).
pub const DEFAULT_CYCLE_TIME_US: u32 = 5000;

/// Minimum accepted cycle time [µs].
pub const CYCLE_TIME_US_MIN: u32 = 100;

/// Maximum accepted cycle time [µs].
pub const CYCLE_TIME_US_MAX: u32 = 100_000;
