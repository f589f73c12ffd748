//! Integration test: mimic coupling.
//!
//! Validates that every dependent joint's published value equals
//! multiplier × source + offset exactly, on every cycle of a whole
//! convergence run, and that coupling declarations are validated at
//! both the config and the construction layer.

use grasp_control_unit::config::load_config_from_strings;
use grasp_control_unit::controller::Gripper;

// ── Helpers ─────────────────────────────────────────────────────────

const UNIT_TOML: &str = r#"
model_config_path = "test_hand.toml"
active_joints = ["finger_1", "finger_2"]

[[mimics]]
joint = "finger_1_tip"
source = "finger_1"
multiplier = -1.0

[[mimics]]
joint = "finger_1_nail"
source = "finger_1"
multiplier = 0.5
offset = 0.1

[[mimics]]
joint = "finger_2_tip"
source = "finger_2"
multiplier = 2.0
offset = -0.05
"#;

const MODEL_TOML: &str = r#"
[[joints]]
name = "finger_1"
lower_position = 0.0
upper_position = 0.8
lower_velocity = -1.0
upper_velocity = 1.0

[[joints]]
name = "finger_2"
lower_position = -0.3
upper_position = 0.9
lower_velocity = -0.5
upper_velocity = 2.0
"#;

fn gripper() -> Gripper {
    let loaded = load_config_from_strings(UNIT_TOML, MODEL_TOML).unwrap();
    Gripper::new(
        &loaded.model,
        &loaded.unit.active_joints,
        &loaded.unit.mimics,
        &[0.0, -0.3],
        0.005,
        false,
    )
    .unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn mimics_hold_exactly_on_every_cycle() {
    let mut g = gripper();
    g.set_percent_vmax(1.0);
    g.set_target_opening(1.0);

    while !g.is_complete() {
        let q = g.run_cycle();
        // Exact equality: the published mimic value is computed from the
        // published source value by the same affine formula.
        assert_eq!(q[2], -1.0 * q[0]);
        assert_eq!(q[3], 0.5 * q[0] + 0.1);
        assert_eq!(q[4], 2.0 * q[1] + (-0.05));
    }
}

#[test]
fn mimics_are_seeded_at_construction() {
    let g = gripper();
    let q = g.joint_values();
    assert_eq!(q[2], -1.0 * q[0]);
    assert_eq!(q[3], 0.5 * q[0] + 0.1);
    assert_eq!(q[4], 2.0 * q[1] + (-0.05));
}

#[test]
fn mimics_follow_a_raw_position_target() {
    let mut g = gripper();
    g.set_percent_vmax(1.0);
    g.set_target_positions(&[0.4, 0.2]);
    while !g.is_complete() {
        let q = g.run_cycle();
        assert_eq!(q[2], -1.0 * q[0]);
    }
    let q = g.joint_values();
    assert!((q[0] - 0.4).abs() < 1e-3);
    assert_eq!(q[2], -1.0 * q[0]);
}

#[test]
fn published_order_is_active_then_mimics() {
    let g = gripper();
    let names: Vec<_> = g.joint_names().collect();
    assert_eq!(
        names,
        vec![
            "finger_1",
            "finger_2",
            "finger_1_tip",
            "finger_1_nail",
            "finger_2_tip",
        ]
    );
    assert_eq!(g.active_count(), 2);
    assert_eq!(g.joint_count(), 5);
}

#[test]
fn config_layer_rejects_chained_mimics() {
    let unit = r#"
model_config_path = "test_hand.toml"
active_joints = ["finger_1"]

[[mimics]]
joint = "tip"
source = "finger_1"

[[mimics]]
joint = "nail"
source = "tip"
"#;
    assert!(load_config_from_strings(unit, MODEL_TOML).is_err());
}
