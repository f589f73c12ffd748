//! TOML configuration loader with validation.
//!
//! Two files in the manner of the rest of the system: the unit config
//! (cycle time, limit orientation, active joint list, coupling records,
//! safety table, path to the model file) and the hand model config
//! (per-joint position/velocity limits, also backing the simulator).
//! Validates parameter bounds, joint-name uniqueness, and coupling
//! references before anything is constructed.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use grasp_common::config::SafetyConfig;
use grasp_common::consts::{CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN, DEFAULT_CYCLE_TIME_US};
use grasp_common::coupling::MimicRecord;
use grasp_common::limits::{GripperModel, JointLimits};

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("config I/O error: {0}")]
    Io(String),
    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Parameter validation error.
    #[error("config validation: {0}")]
    Validation(String),
}

// ─── Unit Config ────────────────────────────────────────────────────

/// Top-level gripper unit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GripperUnitConfig {
    /// Human-readable unit name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Control cycle time [µs].
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Whether mechanical closing corresponds to the upper limit.
    #[serde(default)]
    pub reverse_limits: bool,

    /// Path to the hand model TOML.
    pub model_config_path: String,

    /// Ordered active joint names.
    pub active_joints: Vec<String>,

    /// Coupling records, already filtered to this gripper.
    #[serde(default)]
    pub mimics: Vec<MimicRecord>,

    /// Safety parameters.
    #[serde(default)]
    pub safety: SafetyConfig,
}

fn default_name() -> String {
    "gripper".to_string()
}
fn default_cycle_time_us() -> u32 {
    DEFAULT_CYCLE_TIME_US
}

impl GripperUnitConfig {
    /// Control timestep [s].
    #[inline]
    pub fn timestep(&self) -> f64 {
        self.cycle_time_us as f64 * 1e-6
    }

    /// Validate parameter bounds and internal references.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_time_us < CYCLE_TIME_US_MIN || self.cycle_time_us > CYCLE_TIME_US_MAX {
            return Err(ConfigError::Validation(format!(
                "cycle_time_us {} out of range [{}, {}]",
                self.cycle_time_us, CYCLE_TIME_US_MIN, CYCLE_TIME_US_MAX
            )));
        }
        if self.active_joints.is_empty() {
            return Err(ConfigError::Validation(
                "active_joints must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for name in &self.active_joints {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate active joint '{name}'"
                )));
            }
        }
        for mimic in &self.mimics {
            if !seen.contains(mimic.source.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "mimic '{}' references '{}', which is not an active joint",
                    mimic.joint, mimic.source
                )));
            }
            if !seen.insert(mimic.joint.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate joint name '{}'",
                    mimic.joint
                )));
            }
        }
        self.safety.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }
}

// ─── Hand Model Config ──────────────────────────────────────────────

/// One joint of the hand model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointModelEntry {
    /// Joint name.
    pub name: String,
    /// Position/velocity limits.
    #[serde(flatten)]
    pub limits: JointLimits,
    /// Initial raw position [rad], also seeding the simulator.
    #[serde(default)]
    pub initial_position: f64,
}

/// Hand model: the read-only robot-model view backing construction and
/// the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandModelConfig {
    /// Modeled joints.
    pub joints: Vec<JointModelEntry>,
}

impl HandModelConfig {
    /// Validate joint-name uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for joint in &self.joints {
            if !seen.insert(joint.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate model joint '{}'",
                    joint.name
                )));
            }
        }
        Ok(())
    }

    /// Initial raw positions for the named joints (0.0 for joints the
    /// model does not know).
    pub fn initial_positions(&self, names: &[String]) -> Vec<f64> {
        names
            .iter()
            .map(|name| {
                self.joints
                    .iter()
                    .find(|j| j.name == *name)
                    .map_or(0.0, |j| j.initial_position)
            })
            .collect()
    }
}

impl GripperModel for HandModelConfig {
    fn joint_limits(&self, name: &str) -> Option<JointLimits> {
        self.joints.iter().find(|j| j.name == name).map(|j| j.limits)
    }
}

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Complete validated configuration bundle, ready for runtime use.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub unit: GripperUnitConfig,
    pub model: HandModelConfig,
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the gripper unit configuration from TOML files.
///
/// 1. Parse `unit_config_path` → `GripperUnitConfig`
/// 2. Parse `model_config_path` (from the unit config) → `HandModelConfig`
/// 3. Run all validation rules.
pub fn load_config(unit_config_path: &Path) -> Result<LoadedConfig, ConfigError> {
    let unit_toml = std::fs::read_to_string(unit_config_path).map_err(|e| {
        ConfigError::Io(format!("failed to read {}: {e}", unit_config_path.display()))
    })?;
    let unit: GripperUnitConfig = toml::from_str(&unit_toml)
        .map_err(|e| ConfigError::Parse(format!("unit config: {e}")))?;

    let model_path = Path::new(&unit.model_config_path);
    let model_toml = std::fs::read_to_string(model_path).map_err(|e| {
        ConfigError::Io(format!("failed to read {}: {e}", model_path.display()))
    })?;

    finish_load(unit, &model_toml)
}

/// Load config from TOML strings (for testing).
pub fn load_config_from_strings(
    unit_toml: &str,
    model_toml: &str,
) -> Result<LoadedConfig, ConfigError> {
    let unit: GripperUnitConfig = toml::from_str(unit_toml)
        .map_err(|e| ConfigError::Parse(format!("unit config: {e}")))?;
    finish_load(unit, model_toml)
}

fn finish_load(unit: GripperUnitConfig, model_toml: &str) -> Result<LoadedConfig, ConfigError> {
    unit.validate()?;
    let model: HandModelConfig = toml::from_str(model_toml)
        .map_err(|e| ConfigError::Parse(format!("model config: {e}")))?;
    model.validate()?;
    Ok(LoadedConfig { unit, model })
}
