//! Safety configuration for the gripper control unit.
//!
//! A plain `Copy` value type: the controller keeps a live instance and a
//! saved snapshot, and save/restore are whole-value copies. Optional
//! fields use `#[serde(default = "...")]` function defaults so a partial
//! TOML table deserializes to the documented defaults.

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_DIVERGENCE_THRESHOLD, DEFAULT_PERCENT_VMAX, DEFAULT_RELEASE_OFFSET,
    DEFAULT_TRIGGER_CYCLE_COUNT,
};

/// Mutable safety parameters of one gripper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Fraction of each joint's max velocity usable during convergence,
    /// in [0, 1].
    #[serde(default = "default_percent_vmax")]
    pub percent_vmax: f64,

    /// Command-vs-measured divergence threshold [rad].
    #[serde(default = "default_divergence_threshold")]
    pub divergence_threshold: f64,

    /// Consecutive over-threshold cycles required to trigger the
    /// release.
    #[serde(default = "default_trigger_cycle_count")]
    pub trigger_cycle_count: u32,

    /// One-shot release offset magnitude applied on trigger [rad].
    #[serde(default = "default_release_offset")]
    pub release_offset: f64,
}

fn default_percent_vmax() -> f64 {
    DEFAULT_PERCENT_VMAX
}
fn default_divergence_threshold() -> f64 {
    DEFAULT_DIVERGENCE_THRESHOLD
}
fn default_trigger_cycle_count() -> u32 {
    DEFAULT_TRIGGER_CYCLE_COUNT
}
fn default_release_offset() -> f64 {
    DEFAULT_RELEASE_OFFSET
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            percent_vmax: DEFAULT_PERCENT_VMAX,
            divergence_threshold: DEFAULT_DIVERGENCE_THRESHOLD,
            trigger_cycle_count: DEFAULT_TRIGGER_CYCLE_COUNT,
            release_offset: DEFAULT_RELEASE_OFFSET,
        }
    }
}

impl SafetyConfig {
    /// Validate parameter bounds for a deserialized instance.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.percent_vmax) {
            return Err(format!(
                "percent_vmax {} out of range [0, 1]",
                self.percent_vmax
            ));
        }
        if self.divergence_threshold <= 0.0 {
            return Err(format!(
                "divergence_threshold {} must be positive",
                self.divergence_threshold
            ));
        }
        if self.trigger_cycle_count == 0 {
            return Err("trigger_cycle_count must be at least 1".to_string());
        }
        if self.release_offset < 0.0 {
            return Err(format!(
                "release_offset {} must be non-negative",
                self.release_offset
            ));
        }
        Ok(())
    }
}
