//! Scene snapshot.
//!
//! The host scene graph is captured once, up front, into a flat arena of
//! nodes and materials. Everything downstream addresses it through
//! [`NodeId`] and [`MaterialId`] handles and never holds on to host objects.

pub mod loader;
pub mod mesh;

pub use mesh::{MeshFlags, PolygonMesh, Tessellator};

use crate::error::{ExportError, Result};
use crate::types::{file_prefix, ContainerKind, MaterialId, NodeId, Transform};
use serde::{Deserialize, Serialize};

/// Image bound to a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    /// Source filename as recorded by the host (may be a full path).
    pub filename: String,
    /// Texture width, used to un-normalize inherited UVs.
    #[serde(default)]
    pub width: f64,
    /// Texture height, used to un-normalize inherited UVs.
    #[serde(default)]
    pub height: f64,
}

impl Texture {
    pub fn new(filename: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            filename: filename.into(),
            width,
            height,
        }
    }

    /// Divisor for mesh UVs. Falls back to 1x1 when either dimension is zero.
    pub fn uv_scale(&self) -> [f64; 2] {
        if self.width > 0.0 && self.height > 0.0 {
            [self.width, self.height]
        } else {
            [1.0, 1.0]
        }
    }
}

/// A material shared by faces and containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// RGB in 0-255.
    #[serde(default = "default_color")]
    pub color: [u8; 3],
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub texture: Option<Texture>,
}

fn default_color() -> [u8; 3] {
    [255, 255, 255]
}

fn default_alpha() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

impl Material {
    pub fn new(name: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            color,
            alpha: 1.0,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Color normalized to [0, 1].
    pub fn rgb(&self) -> [f64; 3] {
        [
            self.color[0] as f64 / 255.0,
            self.color[1] as f64 / 255.0,
            self.color[2] as f64 / 255.0,
        ]
    }

    /// Texture with a usable filename, if any.
    pub fn named_texture(&self) -> Option<&Texture> {
        self.texture.as_ref().filter(|t| !t.filename.is_empty())
    }
}

/// A face leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    #[serde(default)]
    pub material: Option<MaterialId>,
    #[serde(default)]
    pub back_material: Option<MaterialId>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub mesh: PolygonMesh,
}

impl Face {
    pub fn new(mesh: PolygonMesh) -> Self {
        Self {
            material: None,
            back_material: None,
            visible: true,
            mesh,
        }
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_back_material(mut self, material: MaterialId) -> Self {
        self.back_material = Some(material);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// The material assigned directly on one side, ignoring inheritance.
    pub fn own_material(&self, front: bool) -> Option<MaterialId> {
        if front {
            self.material
        } else {
            self.back_material
        }
    }
}

/// Shared payload of groups and component instances.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub name: String,
    /// Component definition name (component instances only).
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Override material propagated to descendants lacking their own.
    #[serde(default)]
    pub material: Option<MaterialId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

impl Container {
    pub fn new(name: impl Into<String>, children: Vec<NodeId>) -> Self {
        Self {
            name: name.into(),
            definition: None,
            transform: Transform::IDENTITY,
            visible: true,
            material: None,
            children,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A node of the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneNode {
    Face(Face),
    Group(Container),
    ComponentInstance(Container),
}

impl SceneNode {
    /// Container payload and kind, `None` for faces.
    pub fn container(&self) -> Option<(ContainerKind, &Container)> {
        match self {
            SceneNode::Face(_) => None,
            SceneNode::Group(c) => Some((ContainerKind::Group, c)),
            SceneNode::ComponentInstance(c) => Some((ContainerKind::ComponentInstance, c)),
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            SceneNode::Face(f) => f.visible,
            SceneNode::Group(c) | SceneNode::ComponentInstance(c) => c.visible,
        }
    }
}

/// A snapshot of the host model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Model file path; only its base name is used, for output names.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    /// Top-level entities of the model, in order.
    #[serde(default)]
    pub roots: Vec<NodeId>,
    /// Active selection; empty when nothing is selected.
    #[serde(default)]
    pub selection: Vec<NodeId>,
}

impl Scene {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self> {
        loader::load_from_str(json)
    }

    /// Add a material and return its handle.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Add a node and return its handle. The node is not attached anywhere.
    pub fn add_node(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Add a node and make it a top-level entity.
    pub fn add_root(&mut self, node: SceneNode) -> NodeId {
        let id = self.add_node(node);
        self.roots.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.nodes.get(id.0).ok_or(ExportError::MissingNode(id))
    }

    pub fn face(&self, id: NodeId) -> Result<&Face> {
        match self.node(id)? {
            SceneNode::Face(face) => Ok(face),
            _ => Err(ExportError::NotAFace(id)),
        }
    }

    pub fn material(&self, id: MaterialId) -> Result<&Material> {
        self.materials.get(id.0).ok_or(ExportError::MissingMaterial(id))
    }

    pub fn material_ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        (0..self.materials.len()).map(MaterialId)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn face_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, SceneNode::Face(_)))
            .count()
    }

    /// Base name of the model file up to the first `.`, empty for unsaved models.
    pub fn base_name(&self) -> &str {
        file_prefix(&self.path)
    }

    /// Check every handle and mesh in the snapshot.
    pub fn validate(&self) -> Result<()> {
        let check_node = |id: NodeId| -> Result<()> {
            if id.0 < self.nodes.len() {
                Ok(())
            } else {
                Err(ExportError::MissingNode(id))
            }
        };
        let check_material = |id: Option<MaterialId>| -> Result<()> {
            match id {
                Some(id) if id.0 >= self.materials.len() => Err(ExportError::MissingMaterial(id)),
                _ => Ok(()),
            }
        };

        for &id in self.roots.iter().chain(&self.selection) {
            check_node(id)?;
        }
        for (id, material) in self.material_ids().zip(&self.materials) {
            if !(0.0..=1.0).contains(&material.alpha) {
                return Err(ExportError::InvalidScene(format!(
                    "{} ({:?}) has alpha {} outside [0, 1]",
                    id, material.name, material.alpha
                )));
            }
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                SceneNode::Face(face) => {
                    check_material(face.material)?;
                    check_material(face.back_material)?;
                    face.mesh.validate(NodeId(index))?;
                }
                SceneNode::Group(c) | SceneNode::ComponentInstance(c) => {
                    check_material(c.material)?;
                    for &child in &c.children {
                        check_node(child)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Tessellator for Scene {
    fn tessellate(&self, face: NodeId, flags: MeshFlags) -> Result<PolygonMesh> {
        let mesh = self.face(face)?.mesh.filtered(flags);
        mesh.validate(face)
            .map_err(|e| ExportError::Tessellation {
                node: face,
                reason: e.to_string(),
            })?;
        Ok(mesh)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small scenes shared by tests across the crate.

    use super::*;

    /// A unit square in the XY plane split into two triangles.
    pub fn square_mesh() -> PolygonMesh {
        PolygonMesh {
            points: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            uv_front: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            uv_back: vec![[0.0, 0.0], [-1.0, 0.0], [-1.0, 1.0], [0.0, 1.0]],
            polygons: vec![[1, 2, -3], [1, -3, 4]],
        }
    }

    /// A single triangle.
    pub fn triangle_mesh() -> PolygonMesh {
        PolygonMesh {
            points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uv_front: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            uv_back: vec![[0.0, 0.0], [-1.0, 0.0], [0.0, 1.0]],
            polygons: vec![[1, 2, 3]],
        }
    }
}
