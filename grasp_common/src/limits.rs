//! Joint limit records and the construction-time robot model view.
//!
//! Limits are assumed already resolved into plain numbers before the
//! control unit is constructed; description-file parsing lives outside
//! this workspace.

use serde::{Deserialize, Serialize};

/// Which physical limit maps to "close" vs. "open".
///
/// Some actuators are wired so that mechanical closing corresponds to the
/// upper joint-limit value; those construct with `Reversed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LimitOrientation {
    /// Close = lower position limit, open = upper.
    #[default]
    Normal,
    /// Close = upper position limit, open = lower.
    Reversed,
}

impl LimitOrientation {
    /// Construct from the `reverse_limits` flag.
    #[inline]
    pub const fn from_reversed(reversed: bool) -> Self {
        if reversed { Self::Reversed } else { Self::Normal }
    }

    /// Returns true for the reversed mapping.
    #[inline]
    pub const fn is_reversed(&self) -> bool {
        matches!(self, Self::Reversed)
    }
}

/// Per-joint limits as read from the robot model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Lower position limit [rad].
    pub lower_position: f64,
    /// Upper position limit [rad].
    pub upper_position: f64,
    /// Lower velocity limit [rad/s].
    pub lower_velocity: f64,
    /// Upper velocity limit [rad/s].
    pub upper_velocity: f64,
}

impl JointLimits {
    /// Resolve the (close, open) span for the given orientation.
    #[inline]
    pub fn span(&self, orientation: LimitOrientation) -> (f64, f64) {
        match orientation {
            LimitOrientation::Normal => (self.lower_position, self.upper_position),
            LimitOrientation::Reversed => (self.upper_position, self.lower_position),
        }
    }

    /// Max velocity magnitude: `min(|lower_velocity|, upper_velocity)`.
    ///
    /// The formula is kept exactly as the original controller computes
    /// it; a negative upper velocity limit is not guarded against.
    #[inline]
    pub fn max_velocity(&self) -> f64 {
        self.lower_velocity.abs().min(self.upper_velocity)
    }
}

/// Read-only view of the robot model consumed at construction.
///
/// One lookup covers both the presence check and the limit fetch: a
/// joint the model does not know returns `None`.
pub trait GripperModel {
    /// Limits for the named joint, or `None` if the model has no such
    /// joint.
    fn joint_limits(&self, name: &str) -> Option<JointLimits>;
}
