//! # GRASP Gripper Control Unit
//!
//! Demonstration binary: loads the unit + hand model configuration,
//! builds the controller and a simulated hand, and exercises open/close
//! convergence in a fixed-timestep loop. An optional `--jam` obstruction
//! blocks one simulated joint mid-travel to show the divergence
//! supervisor commanding a protective release.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use grasp_control_unit::config::{load_config, LoadedConfig};
use grasp_control_unit::controller::Gripper;
use grasp_control_unit::sim::{Obstruction, SimulatedHand};

/// GRASP Gripper Control Unit — supervised end-effector control loop
#[derive(Parser, Debug)]
#[command(name = "grasp_control_unit")]
#[command(version)]
#[command(about = "Safety-supervised gripper control loop (simulated hand)")]
struct Args {
    /// Path to the gripper unit configuration TOML.
    #[arg(default_value = "config/gripper.toml")]
    config: PathBuf,

    /// Number of close/open repetitions to run.
    #[arg(long, default_value_t = 2)]
    repetitions: u32,

    /// Obstruct the first joint at this position while closing, to
    /// demonstrate the divergence release.
    #[arg(long)]
    jam: Option<f64>,

    /// Pace the loop in real time instead of free-running.
    #[arg(long)]
    realtime: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!(
        "GRASP Gripper Control Unit v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&args) {
        tracing::error!("FATAL: {e}");
        process::exit(1);
    }

    info!("GRASP Gripper Control Unit shutdown complete");
}

fn setup_tracing(args: &Args) {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if args.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let LoadedConfig { unit, model } = load_config(&args.config)?;
    info!(
        name = %unit.name,
        joints = unit.active_joints.len(),
        mimics = unit.mimics.len(),
        cycle_time_us = unit.cycle_time_us,
        "configuration loaded"
    );

    let seeds = model.initial_positions(&unit.active_joints);
    let mut gripper = Gripper::new(
        &model,
        &unit.active_joints,
        &unit.mimics,
        &seeds,
        unit.timestep(),
        unit.reverse_limits,
    )?;
    gripper.set_config(unit.safety);

    let mut hand = SimulatedHand::from_model(&model, &unit.active_joints);
    if let Some(position) = args.jam {
        info!(position, "obstructing joint 0 while closing");
        hand.set_obstruction(Obstruction::floor(0, position));
    }

    let dt = unit.timestep();
    let cycle_duration = Duration::from_micros(unit.cycle_time_us as u64);

    for repetition in 1..=args.repetitions {
        exercise(&mut gripper, &mut hand, 0.0, dt, cycle_duration, args.realtime);
        info!(repetition, opening = gripper.opening(), "close phase done");

        exercise(&mut gripper, &mut hand, 1.0, dt, cycle_duration, args.realtime);
        info!(repetition, opening = gripper.opening(), "open phase done");
    }
    Ok(())
}

/// Drive one convergence phase: command the opening, then cycle
/// (advance → measure → supervise) until the controller reports
/// completion or the cycle cap is hit.
fn exercise(
    gripper: &mut Gripper,
    hand: &mut SimulatedHand,
    opening: f64,
    dt: f64,
    cycle_duration: Duration,
    realtime: bool,
) {
    const MAX_CYCLES: u32 = 20_000;

    gripper.set_target_opening(opening);
    for cycle in 1..=MAX_CYCLES {
        gripper.run_cycle();
        let measured = hand.track(gripper.joint_values(), dt);
        gripper.set_measured_positions(measured);

        if gripper.is_complete() {
            info!(cycle, opening = gripper.opening(), "target reached");
            return;
        }
        if realtime {
            std::thread::sleep(cycle_duration);
        }
    }
    warn!(
        opening = gripper.opening(),
        "phase did not converge within the cycle cap"
    );
}
