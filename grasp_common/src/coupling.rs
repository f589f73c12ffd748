//! Mimic joint coupling: raw records and their resolved form.
//!
//! A mimic joint's value is fully determined by an affine function of one
//! active joint's value. Records arrive already filtered to the gripper's
//! active set; resolution turns names into indices once, at construction.

use serde::{Deserialize, Serialize};

use crate::error::GripperError;

/// Raw coupling declaration, as handed over by the description layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MimicRecord {
    /// Name of the dependent joint.
    pub joint: String,
    /// Name of the active joint it mirrors.
    pub source: String,
    /// Linear multiplier.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Additive offset.
    #[serde(default)]
    pub offset: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

/// Resolved mimic joint: the source name replaced by an index into the
/// active joint list.
///
/// The source must be an active joint, never another mimic, so coupling
/// chains and cycles cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub struct MimicJoint {
    /// Name of the dependent joint.
    pub name: String,
    /// Index of the mirrored joint in the active list.
    pub source: usize,
    /// Linear multiplier.
    pub multiplier: f64,
    /// Additive offset.
    pub offset: f64,
}

impl MimicJoint {
    /// Dependent joint value for the given source value.
    #[inline]
    pub fn value(&self, source_value: f64) -> f64 {
        self.multiplier * source_value + self.offset
    }

    /// Resolve a set of records against the active joint list.
    ///
    /// Fails on the first record whose source is not an active joint;
    /// this is a configuration error, construction cannot proceed with an
    /// undefined reference.
    pub fn resolve(
        records: &[MimicRecord],
        active_joints: &[String],
    ) -> Result<Vec<MimicJoint>, GripperError> {
        records
            .iter()
            .map(|record| {
                let source = active_joints
                    .iter()
                    .position(|name| *name == record.source)
                    .ok_or_else(|| GripperError::UnknownMimicSource {
                        joint: record.joint.clone(),
                        source_joint: record.source.clone(),
                    })?;
                Ok(MimicJoint {
                    name: record.joint.clone(),
                    source,
                    multiplier: record.multiplier,
                    offset: record.offset,
                })
            })
            .collect()
    }
}
