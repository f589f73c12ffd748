//! The gripper controller: normalized-opening state, velocity-bounded
//! convergence, and the supervisor intake.
//!
//! One instance is owned and driven by a single control loop calling,
//! once per fixed timestep: optionally a target command, then
//! [`Gripper::run_cycle`] to advance and read, then
//! [`Gripper::set_measured_positions`] to feed back measurement. All
//! per-joint buffers are allocated at construction; the cycle path
//! performs no heap allocation.

use grasp_common::config::SafetyConfig;
use grasp_common::consts::{CONVERGENCE_TOLERANCE, DEGENERATE_CLOSE, DEGENERATE_OPEN};
use grasp_common::coupling::{MimicJoint, MimicRecord};
use grasp_common::error::GripperError;
use grasp_common::limits::{GripperModel, LimitOrientation};
use grasp_common::state::ActiveJoint;

use crate::safety::{DivergenceVerdict, GripperReporter, SafetySupervisor, TracingReporter};

/// Safety-supervised position controller for a coupled actuator group.
///
/// Active joints own a normalized opening (0 = close limit, 1 = open
/// limit, unclamped during convergence); mimic joints are derived from
/// their source joint every cycle and carry no state of their own.
pub struct Gripper {
    /// Active joints, ordered as constructed.
    joints: Vec<ActiveJoint>,
    /// Resolved mimic joints, appended after the active set.
    mimics: Vec<MimicJoint>,
    /// Published joint values: active positions then mimic values.
    values: Vec<f64>,
    /// Pending raw-position target. Presence is the sole "has target"
    /// signal; the controller is at rest when this is `None`.
    target: Option<Vec<f64>>,
    /// Scratch buffer for the supervisor intake.
    measured_buf: Vec<f64>,
    /// Control loop timestep [s].
    timestep: f64,
    /// Close/open limit orientation; also selects the release direction.
    orientation: LimitOrientation,
    /// Live safety configuration.
    config: SafetyConfig,
    /// Saved snapshot for restore.
    saved_config: SafetyConfig,
    /// Per-joint divergence bookkeeping.
    supervisor: SafetySupervisor,
    /// Injected reporting callback.
    reporter: Box<dyn GripperReporter>,
}

impl std::fmt::Debug for Gripper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gripper")
            .field("joints", &self.joints)
            .field("mimics", &self.mimics)
            .field("values", &self.values)
            .field("target", &self.target)
            .field("measured_buf", &self.measured_buf)
            .field("timestep", &self.timestep)
            .field("orientation", &self.orientation)
            .field("config", &self.config)
            .field("saved_config", &self.saved_config)
            .field("supervisor", &self.supervisor)
            .finish_non_exhaustive()
    }
}

impl Gripper {
    /// Build a gripper from the robot model, reporting through
    /// [`TracingReporter`].
    ///
    /// See [`Gripper::with_reporter`] for the semantics.
    pub fn new(
        model: &dyn GripperModel,
        joint_names: &[String],
        mimics: &[MimicRecord],
        current_q: &[f64],
        timestep: f64,
        reverse_limits: bool,
    ) -> Result<Self, GripperError> {
        Self::with_reporter(
            model,
            joint_names,
            mimics,
            current_q,
            timestep,
            reverse_limits,
            Box::new(TracingReporter),
        )
    }

    /// Build a gripper with an injected reporting callback.
    ///
    /// For each active joint the close/open span is resolved from the
    /// model's position limits (swapped when `reverse_limits`) and the
    /// max velocity as `min(|lower|, upper)` of the velocity limits. A
    /// joint the model does not know is reported and substituted with a
    /// tiny synthetic span and zero velocity: controllable but inert.
    /// Coupling records are resolved against the active set; a record
    /// naming an unknown source is a fatal configuration error.
    pub fn with_reporter(
        model: &dyn GripperModel,
        joint_names: &[String],
        mimics: &[MimicRecord],
        current_q: &[f64],
        timestep: f64,
        reverse_limits: bool,
        reporter: Box<dyn GripperReporter>,
    ) -> Result<Self, GripperError> {
        if current_q.len() != joint_names.len() {
            return Err(GripperError::JointCountMismatch {
                joints: joint_names.len(),
                values: current_q.len(),
            });
        }

        let orientation = LimitOrientation::from_reversed(reverse_limits);
        let mut joints = Vec::with_capacity(joint_names.len());
        for name in joint_names {
            let joint = match model.joint_limits(name) {
                Some(limits) => {
                    let (close, open) = limits.span(orientation);
                    if open == close {
                        return Err(GripperError::DegenerateLimits {
                            joint: name.clone(),
                            position: open,
                        });
                    }
                    ActiveJoint {
                        name: name.clone(),
                        close,
                        open,
                        vmax: limits.max_velocity(),
                        percent_open: 0.0,
                    }
                }
                None => {
                    reporter.unknown_joint(name);
                    ActiveJoint {
                        name: name.clone(),
                        close: DEGENERATE_CLOSE,
                        open: DEGENERATE_OPEN,
                        vmax: 0.0,
                        percent_open: 0.0,
                    }
                }
            };
            joints.push(joint);
        }

        let mimics = MimicJoint::resolve(mimics, joint_names)?;

        let active = joints.len();
        let total = active + mimics.len();
        let config = SafetyConfig::default();
        let mut gripper = Self {
            joints,
            mimics,
            values: vec![0.0; total],
            target: None,
            measured_buf: Vec::with_capacity(active),
            timestep,
            orientation,
            config,
            saved_config: config,
            supervisor: SafetySupervisor::new(active),
            reporter,
        };
        gripper.set_current_positions(current_q);
        Ok(gripper)
    }

    // ─── Synchronization ────────────────────────────────────────────

    /// Reseed the normalized openings from raw joint values (the inverse
    /// of the opening model). Used at construction and whenever external
    /// raw state must be force-synchronized.
    pub fn set_current_positions(&mut self, current_q: &[f64]) {
        for (joint, &q) in self.joints.iter_mut().zip(current_q) {
            joint.set_position(q);
        }
        self.publish();
    }

    // ─── Target commands ────────────────────────────────────────────

    /// Install a raw-position target vector.
    ///
    /// Only active-joint entries drive motion; mimic entries are always
    /// recomputed, never targeted. A vector shorter than the active set
    /// holds the uncovered joints still.
    pub fn set_target_positions(&mut self, target_q: &[f64]) {
        let mut target = self.target.take().unwrap_or_default();
        target.clear();
        let covered = target_q.len().min(self.joints.len());
        target.extend_from_slice(&target_q[..covered]);
        for joint in &self.joints[covered..] {
            target.push(joint.position());
        }
        self.target = Some(target);
    }

    /// Install a normalized-opening target, clamped to [0, 1].
    ///
    /// Per joint the raw target is the current position plus
    /// `(opening − percent_open) × span`: joints with different spans
    /// converge to the same *normalized* opening, not the same raw
    /// value.
    pub fn set_target_opening(&mut self, opening: f64) {
        let opening = opening.clamp(0.0, 1.0);
        let mut target = self.target.take().unwrap_or_default();
        target.clear();
        for joint in &self.joints {
            target.push(joint.position() + (opening - joint.percent_open) * joint.span());
        }
        self.target = Some(target);
    }

    /// Fully open: `set_target_opening(1.0)`.
    pub fn open(&mut self) {
        self.set_target_opening(1.0);
    }

    /// Fully close: `set_target_opening(0.0)`.
    pub fn close(&mut self) {
        self.set_target_opening(0.0);
    }

    // ─── Per-cycle advance ──────────────────────────────────────────

    /// Advance toward the pending target and publish the joint-value
    /// vector. The controller's only state-mutating read; call once per
    /// control cycle.
    ///
    /// A joint within the convergence tolerance of its target does not
    /// move; any other joint moves toward it by at most
    /// `vmax × percent_vmax × timestep` raw units. The target is cleared
    /// on the first cycle where every active joint starts converged.
    pub fn run_cycle(&mut self) -> &[f64] {
        if let Some(target) = self.target.take() {
            let step = self.config.percent_vmax * self.timestep;
            let mut reached = true;
            for (joint, &target_q) in self.joints.iter_mut().zip(&target) {
                let error = target_q - joint.position();
                if error.abs() < CONVERGENCE_TOLERANCE {
                    continue;
                }
                reached = false;
                let bound = joint.vmax * step;
                joint.percent_open += error.clamp(-bound, bound) / joint.span();
            }
            if !reached {
                self.target = Some(target);
            }
        }
        self.publish();
        &self.values
    }

    /// Rebuild the published vector: active positions fresh from the
    /// opening model, then every mimic from its coupling formula.
    fn publish(&mut self) {
        for (value, joint) in self.values.iter_mut().zip(&self.joints) {
            *value = joint.position();
        }
        let active = self.joints.len();
        for (k, mimic) in self.mimics.iter().enumerate() {
            self.values[active + k] = mimic.value(self.values[mimic.source]);
        }
    }

    // ─── Supervisor intake ──────────────────────────────────────────

    /// Feed back the measured raw value of each active joint, once per
    /// cycle.
    ///
    /// Joints whose measurement stays at or beyond the divergence
    /// threshold for the configured number of consecutive cycles trigger
    /// the protective release: the measured value, offset away from the
    /// jam (toward open for normal orientation, the other way when
    /// reversed), replaces the pending target, including one a caller
    /// had just set.
    pub fn set_measured_positions(&mut self, measured: &[f64]) {
        let mut corrected = std::mem::take(&mut self.measured_buf);
        corrected.clear();
        let covered = measured.len().min(self.joints.len());
        corrected.extend_from_slice(&measured[..covered]);

        let release = match self.orientation {
            LimitOrientation::Reversed => self.config.release_offset,
            LimitOrientation::Normal => -self.config.release_offset,
        };

        let mut any_triggered = false;
        for i in 0..covered {
            let commanded = self.joints[i].position();
            let verdict = self
                .supervisor
                .evaluate(i, measured[i], commanded, &self.config);
            if verdict == DivergenceVerdict::Triggered {
                self.reporter
                    .safety_triggered(&self.joints[i].name, measured[i], commanded);
                corrected[i] += release;
                any_triggered = true;
            }
        }

        if any_triggered {
            self.set_target_positions(&corrected);
        }
        self.measured_buf = corrected;
    }

    // ─── Status queries ─────────────────────────────────────────────

    /// Arithmetic mean of the active joints' normalized openings.
    /// Unclamped, like the per-joint values it averages.
    pub fn opening(&self) -> f64 {
        let sum: f64 = self.joints.iter().map(|j| j.percent_open).sum();
        sum / self.joints.len() as f64
    }

    /// True iff no target is pending.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.target.is_none()
    }

    /// Published joint-value vector as of the last cycle: active
    /// positions first, mimic values appended.
    #[inline]
    pub fn joint_values(&self) -> &[f64] {
        &self.values
    }

    /// All joint names, active first, mimics appended.
    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.joints
            .iter()
            .map(|j| j.name.as_str())
            .chain(self.mimics.iter().map(|m| m.name.as_str()))
    }

    /// Number of active joints.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.joints.len()
    }

    /// Total published joint count (active + mimic).
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.values.len()
    }

    /// Whether the release override is currently triggered on an active
    /// joint.
    #[inline]
    pub fn is_triggered(&self, joint: usize) -> bool {
        self.supervisor.is_triggered(joint)
    }

    /// Last measured raw value pushed for an active joint.
    #[inline]
    pub fn measured_position(&self, joint: usize) -> f64 {
        self.supervisor.last_measured(joint)
    }

    /// Control loop timestep [s].
    #[inline]
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    // ─── Configuration management ───────────────────────────────────

    /// Fraction of max velocity usable during convergence.
    #[inline]
    pub fn percent_vmax(&self) -> f64 {
        self.config.percent_vmax
    }

    /// Set the velocity fraction, clamped to [0, 1].
    pub fn set_percent_vmax(&mut self, fraction: f64) {
        self.config.percent_vmax = fraction.clamp(0.0, 1.0);
    }

    /// Command-vs-measured divergence threshold [rad].
    #[inline]
    pub fn divergence_threshold(&self) -> f64 {
        self.config.divergence_threshold
    }

    /// Set the divergence threshold [rad].
    pub fn set_divergence_threshold(&mut self, threshold: f64) {
        self.config.divergence_threshold = threshold;
    }

    /// Consecutive over-threshold cycles required to trigger.
    #[inline]
    pub fn trigger_cycle_count(&self) -> u32 {
        self.config.trigger_cycle_count
    }

    /// Set the trigger cycle count.
    pub fn set_trigger_cycle_count(&mut self, cycles: u32) {
        self.config.trigger_cycle_count = cycles;
    }

    /// One-shot release offset magnitude [rad].
    #[inline]
    pub fn release_offset(&self) -> f64 {
        self.config.release_offset
    }

    /// Set the release offset [rad].
    pub fn set_release_offset(&mut self, offset: f64) {
        self.config.release_offset = offset;
    }

    /// Replace the live configuration wholesale.
    pub fn set_config(&mut self, config: SafetyConfig) {
        self.config = config;
    }

    /// Current live configuration.
    #[inline]
    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// Snapshot the live configuration for a later restore.
    pub fn save_config(&mut self) {
        self.saved_config = self.config;
    }

    /// Restore the snapshot taken by [`Gripper::save_config`].
    pub fn restore_config(&mut self) {
        self.config = self.saved_config;
    }

    /// Reset the live configuration to the documented defaults.
    pub fn reset_default_config(&mut self) {
        self.config = SafetyConfig::default();
    }
}
