//! Divergence supervisor: command-vs-measured comparison and the
//! protective release trigger.
//!
//! Persistent divergence between what the controller commands and what
//! the encoders measure is interpreted as a jam. After the configured
//! number of consecutive over-threshold cycles the supervisor fires
//! once, and the controller commands a small release instead of
//! continuing to force against the obstruction.

use grasp_common::config::SafetyConfig;
use grasp_common::state::JointSafetyState;
use tracing::{error, warn};

// ─── Reporting ──────────────────────────────────────────────────────

/// Reporting callback injected at construction.
///
/// Decouples the supervisor's cause-and-effect from any specific logging
/// mechanism; hosts that want their own telemetry implement this instead
/// of scraping log output.
pub trait GripperReporter {
    /// An active joint was not found in the robot model; it received the
    /// synthetic degenerate span and stays inert. Data quality, not
    /// fatal.
    fn unknown_joint(&self, joint: &str);

    /// Sustained divergence on `joint`: the release override is being
    /// installed. Expected protective response, not a bug.
    fn safety_triggered(&self, joint: &str, measured: f64, commanded: f64);
}

/// Default reporter forwarding to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl GripperReporter for TracingReporter {
    fn unknown_joint(&self, joint: &str) {
        error!(
            joint,
            "gripper active joint is not part of the loaded robot, limits are unknown"
        );
    }

    fn safety_triggered(&self, joint: &str, measured: f64, commanded: f64) {
        warn!(joint, measured, commanded, "gripper safety triggered");
    }
}

// ─── Supervisor ─────────────────────────────────────────────────────

/// Outcome of one divergence evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceVerdict {
    /// Measured value within the threshold; episode reset.
    InBand,
    /// Over threshold, counting toward the trigger.
    Diverging,
    /// Counter reached the configured cycle count exactly this cycle.
    /// Fires once per sustained episode.
    Triggered,
}

/// Per-joint divergence bookkeeping for the active joints.
#[derive(Debug, Clone)]
pub struct SafetySupervisor {
    states: Vec<JointSafetyState>,
}

impl SafetySupervisor {
    /// Supervisor for `active_count` joints, all in-band.
    pub fn new(active_count: usize) -> Self {
        Self {
            states: vec![JointSafetyState::default(); active_count],
        }
    }

    /// Evaluate one joint's measured value against its commanded
    /// position.
    ///
    /// Below the threshold the episode resets; at or above it the
    /// counter advances, and on the cycle it equals
    /// `config.trigger_cycle_count` the verdict is `Triggered`. Past
    /// that cycle the counter keeps advancing without re-triggering
    /// until an in-band cycle resets it.
    pub fn evaluate(
        &mut self,
        joint: usize,
        measured: f64,
        commanded: f64,
        config: &SafetyConfig,
    ) -> DivergenceVerdict {
        let state = &mut self.states[joint];
        state.last_measured = measured;
        if (measured - commanded).abs() < config.divergence_threshold {
            state.reset_in_band();
            return DivergenceVerdict::InBand;
        }
        state.over_cycles = state.over_cycles.saturating_add(1);
        if state.over_cycles == config.trigger_cycle_count {
            state.triggered = true;
            DivergenceVerdict::Triggered
        } else {
            DivergenceVerdict::Diverging
        }
    }

    /// Whether the release override is currently triggered on `joint`.
    #[inline]
    pub fn is_triggered(&self, joint: usize) -> bool {
        self.states[joint].triggered
    }

    /// Whether any joint is currently triggered.
    pub fn any_triggered(&self) -> bool {
        self.states.iter().any(|s| s.triggered)
    }

    /// Last measured raw value pushed for `joint`.
    #[inline]
    pub fn last_measured(&self, joint: usize) -> f64 {
        self.states[joint].last_measured
    }

    /// Number of supervised joints.
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.states.len()
    }
}
