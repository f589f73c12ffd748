//! Integration test: divergence supervisor.
//!
//! Validates the full safety lifecycle: exact trigger timing, counter
//! reset, the release-offset direction for both limit orientations, the
//! autonomous override replacing a caller's target, and an end-to-end
//! jam-and-release run against the simulated hand.

use std::sync::{Arc, Mutex};

use grasp_common::limits::JointLimits;
use grasp_control_unit::config::load_config_from_strings;
use grasp_control_unit::controller::Gripper;
use grasp_control_unit::safety::GripperReporter;
use grasp_control_unit::sim::{Obstruction, SimulatedHand};

// ── Helpers ─────────────────────────────────────────────────────────

struct OneJoint(JointLimits);

impl grasp_common::limits::GripperModel for OneJoint {
    fn joint_limits(&self, _name: &str) -> Option<JointLimits> {
        Some(self.0)
    }
}

fn wide_joint() -> OneJoint {
    OneJoint(JointLimits {
        lower_position: 0.0,
        upper_position: 1.0,
        lower_velocity: -1.0,
        upper_velocity: 1.0,
    })
}

/// Single-joint gripper with an easily reasoned-about safety setup:
/// threshold 0.1 rad, 3 cycles to trigger, release offset 0.05 rad.
fn supervised_gripper(reversed: bool) -> Gripper {
    let names = vec!["finger".to_string()];
    let seed = if reversed { 1.0 } else { 0.0 };
    let mut g = Gripper::new(&wide_joint(), &names, &[], &[seed], 0.1, reversed).unwrap();
    g.set_percent_vmax(1.0);
    g.set_divergence_threshold(0.1);
    g.set_trigger_cycle_count(3);
    g.set_release_offset(0.05);
    g
}

#[derive(Clone, Default)]
struct RecordingReporter(Arc<Mutex<Vec<String>>>);

impl RecordingReporter {
    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl GripperReporter for RecordingReporter {
    fn unknown_joint(&self, joint: &str) {
        self.0.lock().unwrap().push(format!("unknown:{joint}"));
    }

    fn safety_triggered(&self, joint: &str, _measured: f64, _commanded: f64) {
        self.0.lock().unwrap().push(format!("safety:{joint}"));
    }
}

// ── Trigger timing ──────────────────────────────────────────────────

#[test]
fn triggers_on_exactly_the_configured_cycle() {
    let mut g = supervised_gripper(false);
    // Commanded stays at 0.0 (no target); measured diverges by 0.5.
    for cycle in 1..=2 {
        g.set_measured_positions(&[0.5]);
        assert!(!g.is_triggered(0), "premature trigger on cycle {cycle}");
        assert!(g.is_complete(), "no override should exist yet");
    }
    g.set_measured_positions(&[0.5]);
    assert!(g.is_triggered(0));
    assert_eq!(g.measured_position(0), 0.5);
    // The override target is the corrected measured value.
    assert!(!g.is_complete());
}

#[test]
fn one_in_band_cycle_resets_the_count() {
    let mut g = supervised_gripper(false);
    g.set_measured_positions(&[0.5]);
    g.set_measured_positions(&[0.5]);
    // In-band cycle: episode resets.
    g.set_measured_positions(&[0.05]);
    // Two more diverging cycles are not enough for a fresh episode.
    g.set_measured_positions(&[0.5]);
    g.set_measured_positions(&[0.5]);
    assert!(!g.is_triggered(0));
    g.set_measured_positions(&[0.5]);
    assert!(g.is_triggered(0));
}

// ── Release direction ───────────────────────────────────────────────

#[test]
fn release_moves_opposite_to_the_orientation() {
    // Normal orientation: corrected = measured − offset.
    let mut g = supervised_gripper(false);
    for _ in 0..3 {
        g.set_measured_positions(&[0.5]);
    }
    while !g.is_complete() {
        g.run_cycle();
    }
    assert!((g.joint_values()[0] - (0.5 - 0.05)).abs() < 1e-3);

    // Reversed orientation: corrected = measured + offset.
    let mut g = supervised_gripper(true);
    for _ in 0..3 {
        g.set_measured_positions(&[0.5]);
    }
    while !g.is_complete() {
        g.run_cycle();
    }
    assert!((g.joint_values()[0] - (0.5 + 0.05)).abs() < 1e-3);
}

// ── Override semantics ──────────────────────────────────────────────

#[test]
fn override_replaces_a_caller_target() {
    let mut g = supervised_gripper(false);
    g.set_target_opening(1.0);
    for _ in 0..3 {
        g.set_measured_positions(&[0.5]);
    }
    // The release target wins over the full-open command.
    while !g.is_complete() {
        g.run_cycle();
    }
    assert!((g.joint_values()[0] - 0.45).abs() < 1e-3);
}

#[test]
fn untriggered_joints_are_retargeted_to_their_measurement() {
    // Two joints; only joint 0 diverges. The override vector carries
    // joint 1's measured value unchanged.
    let names = vec!["finger_1".to_string(), "finger_2".to_string()];
    let mut g = Gripper::new(&wide_joint(), &names, &[], &[0.0, 0.0], 0.1, false).unwrap();
    g.set_percent_vmax(1.0);
    g.set_divergence_threshold(0.1);
    g.set_trigger_cycle_count(2);
    g.set_release_offset(0.05);

    for _ in 0..2 {
        g.set_measured_positions(&[0.5, 0.02]);
    }
    assert!(g.is_triggered(0));
    assert!(!g.is_triggered(1));
    while !g.is_complete() {
        g.run_cycle();
    }
    assert!((g.joint_values()[0] - 0.45).abs() < 1e-3);
    assert!((g.joint_values()[1] - 0.02).abs() < 1e-3);
}

// ── End-to-end jam and release ──────────────────────────────────────

#[test]
fn jammed_close_triggers_release_and_settles() {
    let unit_toml = r#"
model_config_path = "test_hand.toml"
active_joints = ["finger_1"]
"#;
    let model_toml = r#"
[[joints]]
name = "finger_1"
lower_position = 0.0
upper_position = 0.8
lower_velocity = -1.0
upper_velocity = 1.0
initial_position = 0.8
"#;
    let loaded = load_config_from_strings(unit_toml, model_toml).unwrap();
    let reporter = RecordingReporter::default();
    let mut gripper = Gripper::with_reporter(
        &loaded.model,
        &loaded.unit.active_joints,
        &[],
        &[0.8],
        loaded.unit.timestep(),
        false,
        Box::new(reporter.clone()),
    )
    .unwrap();
    gripper.set_config(loaded.unit.safety);
    gripper.set_percent_vmax(1.0);

    // The hand cannot close past 0.4: something is in the way.
    let mut hand = SimulatedHand::from_model(&loaded.model, &loaded.unit.active_joints);
    hand.set_obstruction(Obstruction::floor(0, 0.4));

    gripper.close();
    let dt = loaded.unit.timestep();
    let mut cycles = 0u32;
    while !gripper.is_complete() {
        gripper.run_cycle();
        let measured = hand.track(gripper.joint_values(), dt);
        gripper.set_measured_positions(measured);
        cycles += 1;
        assert!(cycles < 50_000, "jam never resolved");
    }

    // Exactly one protective release, and the commanded position settled
    // on the corrected measurement instead of grinding toward 0.
    assert_eq!(reporter.events(), vec!["safety:finger_1".to_string()]);
    let released = 0.4 - gripper.release_offset();
    assert!(
        (gripper.joint_values()[0] - released).abs() < 1e-3,
        "expected {released}, got {}",
        gripper.joint_values()[0]
    );
    assert!((hand.positions()[0] - 0.4).abs() < 1e-9);
}
