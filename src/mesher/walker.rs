//! Scene walking.
//!
//! Flattens the scene graph into face records carrying the composed world
//! transform and the resolved front/back materials. The walk is an explicit
//! stack over the node arena: depth-first, pre-order, children in order.

use crate::error::{ExportError, Result};
use crate::scene::{Container, Face, Scene, SceneNode};
use crate::types::{ContainerKind, MaterialId, NodeId, Transform};

/// Behavior switches distinguishing the two pipelines' walkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Skip hidden nodes and their subtrees.
    pub respect_visibility: bool,
    /// Let container override materials flow down to faces without their own.
    pub inherit_materials: bool,
    /// Resolve back materials.
    pub back_materials: bool,
}

impl WalkOptions {
    /// Java walker: no visibility filter, no inheritance, front materials only.
    pub const JAVA: Self = Self {
        respect_visibility: false,
        inherit_materials: false,
        back_materials: false,
    };

    /// DirectX walker: visibility filter, inheritance, both sides.
    pub const DIRECTX: Self = Self {
        respect_visibility: true,
        inherit_materials: true,
        back_materials: true,
    };
}

/// A face to export, with everything needed to place and shade it.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceRecord {
    pub face: NodeId,
    pub transform: Transform,
    pub front: Option<MaterialId>,
    pub back: Option<MaterialId>,
}

/// One step of a walk, in visit order.
#[derive(Debug, Clone, PartialEq)]
pub enum WalkItem {
    /// A container was entered; its faces follow.
    Enter {
        node: NodeId,
        kind: ContainerKind,
        name: String,
    },
    Face(FaceRecord),
}

/// Counts gathered during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub groups: usize,
    pub components: usize,
    pub faces: usize,
}

impl WalkStats {
    pub fn add(&mut self, other: WalkStats) {
        self.groups += other.groups;
        self.components += other.components;
        self.faces += other.faces;
    }
}

/// Result of a walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Walk {
    pub items: Vec<WalkItem>,
    pub stats: WalkStats,
}

impl Walk {
    pub fn faces(&self) -> impl Iterator<Item = &FaceRecord> {
        self.items.iter().filter_map(|item| match item {
            WalkItem::Face(record) => Some(record),
            WalkItem::Enter { .. } => None,
        })
    }

    pub fn face_count(&self) -> usize {
        self.faces().count()
    }

    /// Face records as exported.
    ///
    /// With `textured_only`, each side carrying a material becomes its own
    /// record with the other side cleared, and faces with no material on
    /// either side are dropped.
    pub fn sided_faces(&self, textured_only: bool) -> Vec<FaceRecord> {
        if !textured_only {
            return self.faces().cloned().collect();
        }
        let mut out = Vec::new();
        for record in self.faces() {
            if record.front.is_some() {
                out.push(FaceRecord {
                    back: None,
                    ..record.clone()
                });
            }
            if record.back.is_some() {
                out.push(FaceRecord {
                    front: None,
                    ..record.clone()
                });
            }
        }
        out
    }
}

struct Frame<'s> {
    children: &'s [NodeId],
    next: usize,
    transform: Transform,
    inherited: Option<MaterialId>,
    owner: Option<NodeId>,
}

/// Walks a [`Scene`] with fixed options.
pub struct SceneWalker<'s> {
    scene: &'s Scene,
    options: WalkOptions,
}

impl<'s> SceneWalker<'s> {
    pub fn new(scene: &'s Scene, options: WalkOptions) -> Self {
        Self { scene, options }
    }

    /// Flatten a single root node. A container root contributes its own
    /// transform and override material to its descendants.
    pub fn flatten(&self, root: NodeId, initial: Transform) -> Result<Vec<FaceRecord>> {
        Ok(self
            .walk(std::slice::from_ref(&root), initial, None)?
            .faces()
            .cloned()
            .collect())
    }

    /// Walk a list of sibling entries under an initial transform and
    /// inherited material.
    pub fn walk(
        &self,
        entries: &[NodeId],
        initial: Transform,
        inherited: Option<MaterialId>,
    ) -> Result<Walk> {
        let mut walk = Walk::default();
        let mut stack = vec![Frame {
            children: entries,
            next: 0,
            transform: initial,
            inherited: if self.options.inherit_materials { inherited } else { None },
            owner: None,
        }];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let Some(&id) = frame.children.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let transform = frame.transform;
            let inherited = frame.inherited;

            let node = self.scene.node(id)?;
            if self.options.respect_visibility && !node.is_visible() {
                continue;
            }

            match node {
                SceneNode::Face(face) => {
                    walk.items
                        .push(WalkItem::Face(self.resolve_face(id, face, transform, inherited)));
                    walk.stats.faces += 1;
                }
                SceneNode::Group(container) | SceneNode::ComponentInstance(container) => {
                    if stack.iter().any(|f| f.owner == Some(id)) {
                        return Err(ExportError::CyclicScene(id));
                    }
                    let kind = match node {
                        SceneNode::ComponentInstance(_) => ContainerKind::ComponentInstance,
                        _ => ContainerKind::Group,
                    };
                    match kind {
                        ContainerKind::Group => walk.stats.groups += 1,
                        ContainerKind::ComponentInstance => walk.stats.components += 1,
                    }
                    walk.items.push(WalkItem::Enter {
                        node: id,
                        kind,
                        name: container.name.clone(),
                    });
                    stack.push(self.enter(id, container, transform, inherited));
                }
            }
        }

        Ok(walk)
    }

    fn enter(
        &self,
        id: NodeId,
        container: &'s Container,
        transform: Transform,
        inherited: Option<MaterialId>,
    ) -> Frame<'s> {
        let inherited = if self.options.inherit_materials {
            container.material.or(inherited)
        } else {
            None
        };
        Frame {
            children: &container.children,
            next: 0,
            transform: transform.then(&container.transform),
            inherited,
            owner: Some(id),
        }
    }

    fn resolve_face(
        &self,
        id: NodeId,
        face: &Face,
        transform: Transform,
        inherited: Option<MaterialId>,
    ) -> FaceRecord {
        let back = if self.options.back_materials {
            face.back_material.or(inherited)
        } else {
            None
        };
        FaceRecord {
            face: id,
            transform,
            front: face.material.or(inherited),
            back,
        }
    }
}
