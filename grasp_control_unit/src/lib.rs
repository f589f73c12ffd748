//! # GRASP Gripper Control Unit
//!
//! Safety-supervised position controller for a coupled actuator group
//! (a robotic end-effector) driven by a fixed-timestep control loop.
//! One cycle is: optionally push a target (opening fraction or raw
//! positions), call [`controller::Gripper::run_cycle`] to advance and
//! read the published joint vector, then feed the measured positions to
//! [`controller::Gripper::set_measured_positions`].
//!
//! ## Architecture
//!
//! 1. **Controller** — normalized-opening state per active joint,
//!    velocity-bounded convergence toward the pending target, mimic
//!    joints derived every cycle.
//! 2. **Safety supervisor** — command-vs-measured divergence counting;
//!    sustained divergence is treated as a jam and answered with a
//!    one-shot release override.
//! 3. **Config** — TOML unit + hand model files with validation.
//! 4. **Sim** — velocity-limited plant model for the demo binary and
//!    the integration tests.
//!
//! All per-joint buffers are pre-allocated at construction; the cycle
//! path performs zero heap allocations.

pub mod config;
pub mod controller;
pub mod safety;
pub mod sim;
