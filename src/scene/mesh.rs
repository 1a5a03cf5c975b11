//! Tessellated face geometry and the tessellation seam.

use crate::error::{ExportError, Result};
use crate::types::{NodeId, Transform};
use serde::{Deserialize, Serialize};

/// Which attributes a tessellation request should compute.
///
/// Positions are always included. The bit values follow the host convention:
/// 1 front UVs, 2 back UVs, 4 normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshFlags {
    pub uv_front: bool,
    pub uv_back: bool,
    pub normals: bool,
}

impl MeshFlags {
    pub const POINTS: Self = Self {
        uv_front: false,
        uv_back: false,
        normals: false,
    };

    /// Points, front UVs and normals.
    pub const FRONT: Self = Self {
        uv_front: true,
        uv_back: false,
        normals: true,
    };

    /// Points, both UV sets and normals.
    pub const ALL: Self = Self {
        uv_front: true,
        uv_back: true,
        normals: true,
    };

    pub fn from_bits(bits: u8) -> Self {
        Self {
            uv_front: bits & 1 != 0,
            uv_back: bits & 2 != 0,
            normals: bits & 4 != 0,
        }
    }

    pub fn bits(self) -> u8 {
        (self.uv_front as u8) | (self.uv_back as u8) << 1 | (self.normals as u8) << 2
    }
}

/// A triangulated face as produced by the host tessellator.
///
/// Polygon entries are 1-based point indices. A negative entry marks a
/// hidden (smoothed) edge; the point it refers to is its absolute value.
/// Attribute lists are either empty (not computed) or one entry per point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonMesh {
    pub points: Vec<[f64; 3]>,
    #[serde(default)]
    pub normals: Vec<[f64; 3]>,
    #[serde(default)]
    pub uv_front: Vec<[f64; 2]>,
    #[serde(default)]
    pub uv_back: Vec<[f64; 2]>,
    pub polygons: Vec<[i32; 3]>,
}

impl PolygonMesh {
    pub fn count_points(&self) -> usize {
        self.points.len()
    }

    pub fn count_polygons(&self) -> usize {
        self.polygons.len()
    }

    /// Convert a 1-based, sign-encoded index into a slot in the point list.
    pub fn slot(&self, index: i32) -> Option<usize> {
        let slot = (index.unsigned_abs() as usize).checked_sub(1)?;
        (slot < self.points.len()).then_some(slot)
    }

    pub fn point_at(&self, index: i32) -> Option<[f64; 3]> {
        self.slot(index).map(|s| self.points[s])
    }

    /// Normal at a point, zero when normals were not computed.
    pub fn normal_at(&self, index: i32) -> Option<[f64; 3]> {
        self.slot(index)
            .map(|s| self.normals.get(s).copied().unwrap_or_default())
    }

    /// UV at a point for one side, zero when that UV set was not computed.
    pub fn uv_at(&self, index: i32, front: bool) -> Option<[f64; 2]> {
        let uvs = if front { &self.uv_front } else { &self.uv_back };
        self.slot(index).map(|s| uvs.get(s).copied().unwrap_or_default())
    }

    /// Apply a world transform in place.
    pub fn transform(&mut self, transform: &Transform) {
        if transform.is_identity() {
            return;
        }
        for p in &mut self.points {
            *p = transform.transform_point(*p);
        }
        for n in &mut self.normals {
            *n = transform.transform_vector(*n);
        }
    }

    /// Copy of this mesh keeping only the requested attributes.
    pub fn filtered(&self, flags: MeshFlags) -> PolygonMesh {
        PolygonMesh {
            points: self.points.clone(),
            normals: if flags.normals { self.normals.clone() } else { Vec::new() },
            uv_front: if flags.uv_front { self.uv_front.clone() } else { Vec::new() },
            uv_back: if flags.uv_back { self.uv_back.clone() } else { Vec::new() },
            polygons: self.polygons.clone(),
        }
    }

    /// Check indices and attribute lengths.
    pub fn validate(&self, node: NodeId) -> Result<()> {
        let invalid = |reason: String| ExportError::InvalidMesh { node, reason };
        let n = self.points.len();
        for (name, len) in [
            ("normals", self.normals.len()),
            ("uv_front", self.uv_front.len()),
            ("uv_back", self.uv_back.len()),
        ] {
            if len != 0 && len != n {
                return Err(invalid(format!("{} has {} entries for {} points", name, len, n)));
            }
        }
        for (i, polygon) in self.polygons.iter().enumerate() {
            for &index in polygon {
                if self.slot(index).is_none() {
                    return Err(invalid(format!(
                        "polygon {} references point {} of {}",
                        i, index, n
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Source of tessellated face geometry.
pub trait Tessellator {
    /// Produce the triangulated mesh of a face, computing only the requested attributes.
    fn tessellate(&self, face: NodeId, flags: MeshFlags) -> Result<PolygonMesh>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> PolygonMesh {
        PolygonMesh {
            points: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            uv_front: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            uv_back: Vec::new(),
            polygons: vec![[1, 2, -3], [1, -3, 4]],
        }
    }

    #[test]
    fn test_mesh_flag_bits() {
        assert_eq!(MeshFlags::FRONT.bits(), 5);
        assert_eq!(MeshFlags::ALL.bits(), 7);
        assert_eq!(MeshFlags::from_bits(5), MeshFlags::FRONT);
        assert_eq!(MeshFlags::POINTS.bits(), 0);
    }

    #[test]
    fn test_sign_encoded_indices() {
        let mesh = quad();
        assert_eq!(mesh.point_at(-3), Some([1.0, 1.0, 0.0]));
        assert_eq!(mesh.point_at(0), None);
        assert_eq!(mesh.point_at(5), None);
        assert_eq!(mesh.uv_at(2, true), Some([1.0, 0.0]));
        // Back UVs were not computed.
        assert_eq!(mesh.uv_at(2, false), Some([0.0, 0.0]));
    }

    #[test]
    fn test_transform_moves_points_not_normals() {
        let mut mesh = quad();
        mesh.transform(&Transform::from_translation([0.0, 0.0, 5.0]));
        assert_eq!(mesh.points[0], [0.0, 0.0, 5.0]);
        assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut mesh = quad();
        assert!(mesh.validate(NodeId(0)).is_ok());
        mesh.polygons.push([1, 2, 9]);
        assert!(matches!(
            mesh.validate(NodeId(0)),
            Err(ExportError::InvalidMesh { .. })
        ));
    }

    #[test]
    fn test_filtered_drops_attributes() {
        let mesh = quad().filtered(MeshFlags::POINTS);
        assert!(mesh.normals.is_empty());
        assert!(mesh.uv_front.is_empty());
        assert_eq!(mesh.count_points(), 4);
        assert_eq!(mesh.count_polygons(), 2);
    }
}
