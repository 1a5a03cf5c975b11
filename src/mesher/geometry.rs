//! Mesh buffer types.

use crate::registry::DEFAULT_INDEX;

/// A vertex in an output mesh, already converted to the target frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space.
    pub position: [f64; 3],
    /// Normal vector.
    pub normal: [f64; 3],
    /// Texture coordinates.
    pub uv: [f64; 2],
}

impl Vertex {
    pub fn new(position: [f64; 3], normal: [f64; 3], uv: [f64; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Accumulated geometry of one exported mesh.
///
/// Source faces are merged one after another; triangle indices are absolute
/// within this buffer. Each triangle carries an index into the buffer's own
/// material list, whose first slot is always the fallback material.
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangles as vertex index triples.
    pub triangles: Vec<[usize; 3]>,
    /// Per-triangle index into `materials`.
    pub triangle_materials: Vec<usize>,
    /// Registry entry indices used by this mesh, in first-use order.
    pub materials: Vec<usize>,
}

impl Default for MeshBuffer {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            triangle_materials: Vec::new(),
            materials: vec![DEFAULT_INDEX],
        }
    }
}

impl MeshBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    /// Add a triangle with its local material slot.
    pub fn add_triangle(&mut self, indices: [usize; 3], material_slot: usize) {
        self.triangles.push(indices);
        self.triangle_materials.push(material_slot);
    }

    /// Local material slot for a registry entry, appending it on first use.
    pub fn material_slot(&mut self, registry_index: usize) -> usize {
        match self.materials.iter().position(|&m| m == registry_index) {
            Some(slot) => slot,
            None => {
                self.materials.push(registry_index);
                self.materials.len() - 1
            }
        }
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True when every triangle references an existing vertex.
    pub fn indices_in_range(&self) -> bool {
        let n = self.vertices.len();
        self.triangles.iter().flatten().all(|&i| i < n)
    }
}
