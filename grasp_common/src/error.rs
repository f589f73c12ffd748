//! Error taxonomy for gripper construction.
//!
//! Construction returns a discriminated result: callers must handle the
//! error branch before using the instance. The per-cycle path has no
//! error states: malformed numeric inputs are clamped, not rejected.

use thiserror::Error;

/// Fatal configuration errors detected while building a gripper.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GripperError {
    /// A coupling record names a source joint outside the active set.
    /// Coupling must not silently resolve to an arbitrary default.
    #[error("joint '{joint}' mimics '{source_joint}', which is not an active joint")]
    UnknownMimicSource {
        /// The dependent joint declaring the coupling.
        joint: String,
        /// The source joint the record references.
        source_joint: String,
    },

    /// Equal open and close position limits: the close→open span is used
    /// as a divisor when normalizing, so a zero span cannot be accepted.
    #[error("joint '{joint}' has equal open and close limits ({position})")]
    DegenerateLimits {
        /// The offending active joint.
        joint: String,
        /// The shared limit value.
        position: f64,
    },

    /// The seed position vector does not cover the active joint list.
    #[error("{joints} active joints but {values} seed positions")]
    JointCountMismatch {
        /// Number of active joints requested.
        joints: usize,
        /// Number of seed positions supplied.
        values: usize,
    },
}
