//! Simulated hand actuator.
//!
//! Tracks the commanded joint vector with velocity-limited first-order
//! motion, the same way the plant-side axis simulation of the wider
//! system behaves. An optional obstruction confines one joint to a band,
//! standing in for a grasped object or a mechanical jam; the measured
//! vector it produces feeds the supervisor in the demo binary and the
//! integration tests.

use crate::config::HandModelConfig;

/// Physical obstruction on one joint: the joint cannot leave
/// `[min, max]` no matter what is commanded.
#[derive(Debug, Clone, Copy)]
pub struct Obstruction {
    /// Index of the obstructed joint.
    pub joint: usize,
    /// Lowest reachable position.
    pub min: f64,
    /// Highest reachable position.
    pub max: f64,
}

impl Obstruction {
    /// Obstruction blocking travel above `position`.
    pub fn ceiling(joint: usize, position: f64) -> Self {
        Self {
            joint,
            min: f64::NEG_INFINITY,
            max: position,
        }
    }

    /// Obstruction blocking travel below `position`.
    pub fn floor(joint: usize, position: f64) -> Self {
        Self {
            joint,
            min: position,
            max: f64::INFINITY,
        }
    }
}

/// Velocity-limited tracking model of the physical hand.
#[derive(Debug, Clone)]
pub struct SimulatedHand {
    positions: Vec<f64>,
    vmax: Vec<f64>,
    obstruction: Option<Obstruction>,
}

impl SimulatedHand {
    /// Hand with the given initial positions and per-joint actuator
    /// speed limits [rad/s].
    pub fn new(initial: &[f64], vmax: &[f64]) -> Self {
        debug_assert_eq!(initial.len(), vmax.len());
        Self {
            positions: initial.to_vec(),
            vmax: vmax.to_vec(),
            obstruction: None,
        }
    }

    /// Hand built from the model entries for the named joints. Joints
    /// the model does not know start at zero and cannot move.
    pub fn from_model(model: &HandModelConfig, names: &[String]) -> Self {
        let initial = model.initial_positions(names);
        let vmax = names
            .iter()
            .map(|name| {
                model
                    .joints
                    .iter()
                    .find(|j| j.name == *name)
                    .map_or(0.0, |j| j.limits.max_velocity())
            })
            .collect();
        Self {
            positions: initial,
            vmax,
            obstruction: None,
        }
    }

    /// Install an obstruction (replacing any previous one).
    pub fn set_obstruction(&mut self, obstruction: Obstruction) {
        self.obstruction = Some(obstruction);
    }

    /// Remove the obstruction.
    pub fn clear_obstruction(&mut self) {
        self.obstruction = None;
    }

    /// Advance the plant one cycle toward the commanded vector and
    /// return the measured positions.
    pub fn track(&mut self, commanded: &[f64], dt: f64) -> &[f64] {
        for (i, position) in self.positions.iter_mut().enumerate() {
            let Some(&command) = commanded.get(i) else {
                continue;
            };
            let bound = self.vmax[i] * dt;
            let mut next = *position + (command - *position).clamp(-bound, bound);
            if let Some(obstruction) = self.obstruction {
                if obstruction.joint == i {
                    next = next.clamp(obstruction.min, obstruction.max);
                }
            }
            *position = next;
        }
        &self.positions
    }

    /// Current measured positions.
    #[inline]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }
}
