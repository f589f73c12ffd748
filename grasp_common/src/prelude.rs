//! Prelude module for common re-exports.
//!
//! `use grasp_common::prelude::*;` pulls in the types every consumer of
//! the gripper control unit needs without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::SafetyConfig;

// ─── Model & limits ─────────────────────────────────────────────────
pub use crate::limits::{GripperModel, JointLimits, LimitOrientation};

// ─── Coupling ───────────────────────────────────────────────────────
pub use crate::coupling::{MimicJoint, MimicRecord};

// ─── Runtime state ──────────────────────────────────────────────────
pub use crate::state::{ActiveJoint, JointSafetyState};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::GripperError;

// ─── System constants ───────────────────────────────────────────────
pub use crate::consts::{CONVERGENCE_TOLERANCE, DEFAULT_CYCLE_TIME_US};
