//! Affine transforms for scene nodes.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A 4x4 affine transform.
///
/// Serialized as 16 column-major values, matching how modeling hosts
/// dump their transformation arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 16]", into = "[f64; 16]")]
pub struct Transform(DMat4);

impl Transform {
    pub const IDENTITY: Self = Self(DMat4::IDENTITY);

    pub fn from_translation(offset: [f64; 3]) -> Self {
        Self(DMat4::from_translation(DVec3::from_array(offset)))
    }

    pub fn from_scale(scale: [f64; 3]) -> Self {
        Self(DMat4::from_scale(DVec3::from_array(scale)))
    }

    /// Check if this is an identity transform.
    pub fn is_identity(&self) -> bool {
        self.0 == DMat4::IDENTITY
    }

    /// Compose a child's local transform under this one (`self × local`).
    pub fn then(&self, local: &Transform) -> Transform {
        Self(self.0 * local.0)
    }

    /// Apply the full transform, translation included.
    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        self.0.transform_point3(DVec3::from_array(p)).to_array()
    }

    /// Apply only the linear part. The result is not renormalized.
    pub fn transform_vector(&self, v: [f64; 3]) -> [f64; 3] {
        self.0.transform_vector3(DVec3::from_array(v)).to_array()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.then(&rhs)
    }
}

impl From<[f64; 16]> for Transform {
    fn from(cols: [f64; 16]) -> Self {
        Self(DMat4::from_cols_array(&cols))
    }
}

impl From<Transform> for [f64; 16] {
    fn from(t: Transform) -> Self {
        t.0.to_cols_array()
    }
}
