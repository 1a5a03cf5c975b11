//! Mesh extraction.
//!
//! Turns face records into target-ready vertex data: requests the face's
//! tessellation, applies the world transform, converts axes and units, and
//! records triangles with their material slots.

use super::geometry::{MeshBuffer, Vertex};
use super::walker::FaceRecord;
use crate::error::{ExportError, Result};
use crate::registry::{MaterialRegistry, DEFAULT_INDEX};
use crate::scene::{Face, MeshFlags, PolygonMesh, Scene, Tessellator};
use crate::types::{MaterialId, NodeId, Side};
use serde::{Deserialize, Serialize};

/// Axis convention of DirectX output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisFrame {
    /// Right-handed Z-up input remapped to left-handed Y-up: `(-y, z, x)`.
    #[default]
    LeftHanded,
    /// Axes untouched; a rotation frame is wrapped around the meshes instead.
    Blender,
}

impl AxisFrame {
    pub fn convert(self, v: [f64; 3]) -> [f64; 3] {
        match self {
            AxisFrame::LeftHanded => [-v[1], v[2], v[0]],
            AxisFrame::Blender => v,
        }
    }
}

fn negate(v: [f64; 3]) -> [f64; 3] {
    [-v[0], -v[1], -v[2]]
}

fn scale(v: [f64; 3], factor: f64) -> [f64; 3] {
    if factor == 1.0 {
        v
    } else {
        [v[0] * factor, v[1] * factor, v[2] * factor]
    }
}

/// Resolve a polygon's corners to 0-based point slots.
fn corner_slots(mesh: &PolygonMesh, face: NodeId, polygon: &[i32; 3]) -> Result<[usize; 3]> {
    let mut slots = [0; 3];
    for (slot, &index) in slots.iter_mut().zip(polygon) {
        *slot = mesh.slot(index).ok_or_else(|| ExportError::InvalidMesh {
            node: face,
            reason: format!("polygon index {} out of range", index),
        })?;
    }
    Ok(slots)
}

fn missing_point(face: NodeId, index: i32) -> ExportError {
    ExportError::InvalidMesh {
        node: face,
        reason: format!("no point {}", index),
    }
}

/// Extracts faces into a merged DirectX mesh buffer.
pub struct DirectXExtractor<'a, T: Tessellator + ?Sized> {
    scene: &'a Scene,
    tessellator: &'a T,
    frame: AxisFrame,
    textured_only: bool,
    unit_scale: f64,
}

impl<'a, T: Tessellator + ?Sized> DirectXExtractor<'a, T> {
    pub fn new(scene: &'a Scene, tessellator: &'a T) -> Self {
        Self {
            scene,
            tessellator,
            frame: AxisFrame::LeftHanded,
            textured_only: false,
            unit_scale: 1.0,
        }
    }

    pub fn with_frame(mut self, frame: AxisFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn textured_only(mut self, textured_only: bool) -> Self {
        self.textured_only = textured_only;
        self
    }

    pub fn with_unit_scale(mut self, unit_scale: f64) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    /// Append one face record to `buffer`.
    ///
    /// All-faces mode emits every point twice (front vertex, then back vertex
    /// with a negated normal) and two triangles per polygon. Textured-only
    /// mode emits the single side the record carries.
    pub fn extract(
        &self,
        record: &FaceRecord,
        buffer: &mut MeshBuffer,
        registry: &mut MaterialRegistry<'_>,
    ) -> Result<()> {
        let face = self.scene.face(record.face)?;
        let mut mesh = self.tessellator.tessellate(record.face, MeshFlags::ALL)?;
        mesh.transform(&record.transform);

        let base = buffer.vertex_count();
        let front_only = record.front.is_some();

        for p in 1..=mesh.count_points() as i32 {
            let position = mesh
                .point_at(p)
                .ok_or_else(|| missing_point(record.face, p))?;
            let position = self.frame.convert(scale(position, self.unit_scale));
            let normal = self
                .frame
                .convert(mesh.normal_at(p).unwrap_or_default());

            if self.textured_only {
                let (material, normal) = if front_only {
                    (record.front, normal)
                } else {
                    (record.back, negate(normal))
                };
                let uv = self.uv(&mesh, face, p, front_only, material)?;
                buffer.add_vertex(Vertex::new(position, normal, uv));
            } else {
                let uv = self.uv(&mesh, face, p, true, record.front)?;
                buffer.add_vertex(Vertex::new(position, normal, uv));
                let uv = self.uv(&mesh, face, p, false, record.back)?;
                buffer.add_vertex(Vertex::new(position, negate(normal), uv));
            }
        }

        if mesh.polygons.is_empty() {
            return Ok(());
        }

        let front_slot =
            self.material_slot(record.front, record.face, Side::Front, buffer, registry)?;
        let back_slot =
            self.material_slot(record.back, record.face, Side::Back, buffer, registry)?;

        for polygon in &mesh.polygons {
            let [v1, v2, v3] = corner_slots(&mesh, record.face, polygon)?;
            if self.textured_only {
                if record.front.is_some() {
                    buffer.add_triangle([base + v3, base + v2, base + v1], front_slot);
                }
                if record.back.is_some() {
                    buffer.add_triangle([base + v1, base + v2, base + v3], back_slot);
                }
            } else {
                buffer.add_triangle(
                    [base + 2 * v3, base + 2 * v2, base + 2 * v1],
                    front_slot,
                );
                buffer.add_triangle(
                    [base + 2 * v1 + 1, base + 2 * v2 + 1, base + 2 * v3 + 1],
                    back_slot,
                );
            }
        }
        Ok(())
    }

    /// UV for one side, un-normalized by the texture size when the side's
    /// material is inherited, then shifted `u + 1` and flipped `-v`.
    fn uv(
        &self,
        mesh: &PolygonMesh,
        face: &Face,
        p: i32,
        front: bool,
        material: Option<MaterialId>,
    ) -> Result<[f64; 2]> {
        let mut size = [1.0, 1.0];
        if let Some(id) = material {
            if face.own_material(front).is_none() {
                if let Some(texture) = &self.scene.material(id)?.texture {
                    size = texture.uv_scale();
                }
            }
        }
        let uv = mesh.uv_at(p, front).unwrap_or_default();
        Ok([uv[0] / size[0] + 1.0, -(uv[1] / size[1])])
    }

    fn material_slot(
        &self,
        material: Option<MaterialId>,
        face: NodeId,
        side: Side,
        buffer: &mut MeshBuffer,
        registry: &mut MaterialRegistry<'_>,
    ) -> Result<usize> {
        match material {
            Some(id) => {
                let index = registry.resolve_on(id, self.scene.material(id)?, face, side)?;
                Ok(buffer.material_slot(index))
            }
            None => Ok(buffer.material_slot(DEFAULT_INDEX)),
        }
    }
}

/// One face's worth of Java triangle data.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaStrip {
    /// Registry entry of the face's material, the fallback when it has none.
    pub material: usize,
    /// Whether the face's own material binds a texture.
    pub textured: bool,
    /// Three values per triangle corner.
    pub points: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    /// Present only for textured strips.
    pub tex_coords: Option<Vec<[f64; 2]>>,
}

/// Extracts faces into per-face Java strips.
pub struct JavaExtractor<'a, T: Tessellator + ?Sized> {
    scene: &'a Scene,
    tessellator: &'a T,
    unit_scale: f64,
}

impl<'a, T: Tessellator + ?Sized> JavaExtractor<'a, T> {
    pub fn new(scene: &'a Scene, tessellator: &'a T, unit_scale: f64) -> Self {
        Self {
            scene,
            tessellator,
            unit_scale,
        }
    }

    /// Positions are scaled by the unit factor; normals are not.
    pub fn extract(
        &self,
        record: &FaceRecord,
        registry: &mut MaterialRegistry<'_>,
    ) -> Result<JavaStrip> {
        let mut mesh = self.tessellator.tessellate(record.face, MeshFlags::FRONT)?;
        mesh.transform(&record.transform);

        let (material, textured) = match record.front {
            Some(id) => {
                let front = self.scene.material(id)?;
                (registry.resolve(id, front)?, front.named_texture().is_some())
            }
            None => (DEFAULT_INDEX, false),
        };

        let corners = mesh.polygons.len() * 3;
        let mut points = Vec::with_capacity(corners);
        let mut normals = Vec::with_capacity(corners);
        let mut tex_coords = Vec::with_capacity(if textured { corners } else { 0 });

        for polygon in &mesh.polygons {
            for &index in polygon {
                let point = mesh
                    .point_at(index)
                    .ok_or_else(|| missing_point(record.face, index))?;
                points.push(scale(point, self.unit_scale));
                normals.push(mesh.normal_at(index).unwrap_or_default());
                if textured {
                    tex_coords.push(mesh.uv_at(index, true).unwrap_or_default());
                }
            }
        }

        Ok(JavaStrip {
            material,
            textured,
            points,
            normals,
            tex_coords: textured.then_some(tex_coords),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::walker::{SceneWalker, WalkOptions};
    use crate::registry::{
        LabelStyle, MaterialKeying, RecordingTextureWriter, TextureSink,
    };
    use crate::scene::fixtures::{square_mesh, triangle_mesh};
    use crate::scene::{Container, Material, SceneNode, Texture};
    use crate::types::Transform;

    fn directx_registry<'w>() -> MaterialRegistry<'w> {
        MaterialRegistry::new(MaterialKeying::SanitizedName, LabelStyle::DirectX)
    }

    fn record(face: NodeId, front: Option<MaterialId>, back: Option<MaterialId>) -> FaceRecord {
        FaceRecord {
            face,
            transform: Transform::IDENTITY,
            front,
            back,
        }
    }

    #[test]
    fn test_axis_conversion() {
        assert_eq!(AxisFrame::LeftHanded.convert([1.0, 2.0, 3.0]), [-2.0, 3.0, 1.0]);
        assert_eq!(AxisFrame::Blender.convert([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
        // Applying the remap twice is not the identity.
        let twice = AxisFrame::LeftHanded.convert(AxisFrame::LeftHanded.convert([1.0, 2.0, 3.0]));
        assert_ne!(twice, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_all_faces_mode_doubles_vertices() {
        let mut scene = Scene::new("");
        let f = scene.add_root(SceneNode::Face(Face::new(triangle_mesh())));
        let mut buffer = MeshBuffer::new();
        let mut registry = directx_registry();

        let extractor = DirectXExtractor::new(&scene, &scene);
        extractor.extract(&record(f, None, None), &mut buffer, &mut registry).unwrap();
        extractor.extract(&record(f, None, None), &mut buffer, &mut registry).unwrap();

        assert_eq!(buffer.vertex_count(), 12);
        // First face: front (3,2,1) doubled, back (1,2,3) doubled plus one.
        assert_eq!(buffer.triangles[0], [4, 2, 0]);
        assert_eq!(buffer.triangles[1], [1, 3, 5]);
        // Second face starts after the first face's six vertices.
        assert_eq!(buffer.triangles[2], [10, 8, 6]);
        assert_eq!(buffer.triangles[3], [7, 9, 11]);
        assert_eq!(buffer.triangle_materials, vec![0, 0, 0, 0]);
        assert!(buffer.indices_in_range());

        // Normal (0,0,1) converts to (-0, 1, 0); the back copy is negated.
        assert_eq!(buffer.vertices[0].normal, [-0.0, 1.0, 0.0]);
        assert_eq!(buffer.vertices[1].normal, [0.0, -1.0, -0.0]);
        // Point (1,0,0) converts to (-0, 0, 1).
        assert_eq!(buffer.vertices[2].position, [-0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_textured_only_winding_with_offset() {
        let mut scene = Scene::new("");
        let wood = scene.add_material(Material::new("Wood", [100, 50, 0]));
        let mut mesh = PolygonMesh {
            points: (0..9).map(|i| [i as f64, 0.0, 0.0]).collect(),
            polygons: vec![[2, -5, 9]],
            ..PolygonMesh::default()
        };
        mesh.normals = vec![[0.0, 0.0, 1.0]; 9];
        let f = scene.add_root(SceneNode::Face(
            Face::new(mesh).with_material(wood).with_back_material(wood),
        ));

        let mut buffer = MeshBuffer::new();
        for _ in 0..10 {
            buffer.add_vertex(Vertex::new([0.0; 3], [0.0; 3], [0.0; 2]));
        }
        let mut registry = directx_registry();
        let extractor = DirectXExtractor::new(&scene, &scene).textured_only(true);
        extractor.extract(&record(f, Some(wood), None), &mut buffer, &mut registry).unwrap();
        assert_eq!(buffer.triangles.last(), Some(&[18, 14, 11]));

        let mut buffer = MeshBuffer::new();
        for _ in 0..10 {
            buffer.add_vertex(Vertex::new([0.0; 3], [0.0; 3], [0.0; 2]));
        }
        extractor.extract(&record(f, None, Some(wood)), &mut buffer, &mut registry).unwrap();
        assert_eq!(buffer.triangles.last(), Some(&[11, 14, 18]));
        // Back side normals are negated after conversion.
        assert_eq!(buffer.vertices[10].normal, [0.0, -1.0, -0.0]);
        assert_eq!(buffer.triangle_materials, vec![1]);
        assert_eq!(buffer.materials.len(), 2);
    }

    #[test]
    fn test_inherited_texture_unnormalizes_uv() {
        let mut scene = Scene::new("");
        let brick = scene.add_material(
            Material::new("Brick", [200, 80, 60])
                .with_texture(Texture::new("brick.jpg", 256.0, 512.0)),
        );
        let mesh = PolygonMesh {
            points: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uv_front: vec![[128.0, 256.0], [0.0, 0.0], [0.0, 0.0]],
            uv_back: vec![[128.0, 256.0], [0.0, 0.0], [0.0, 0.0]],
            polygons: vec![[1, 2, 3]],
        };
        let f = scene.add_node(SceneNode::Face(Face::new(mesh)));
        let g = scene.add_root(SceneNode::Group(
            Container::new("wall", vec![f]).with_material(brick),
        ));

        let records = SceneWalker::new(&scene, WalkOptions::DIRECTX)
            .flatten(g, Transform::IDENTITY)
            .unwrap();

        let mut recorder = RecordingTextureWriter::new();
        {
            let mut registry = directx_registry()
                .with_texture_sink(TextureSink::new(&mut recorder, "out.x"));
            let mut buffer = MeshBuffer::new();
            DirectXExtractor::new(&scene, &scene)
                .extract(&records[0], &mut buffer, &mut registry)
                .unwrap();
            assert_eq!(buffer.vertices[0].uv, [1.5, -0.5]);
            assert_eq!(buffer.vertices[1].uv, [1.5, -0.5]);
        }
        // Front and back resolve the same object: one texture write.
        assert_eq!(recorder.writes.len(), 1);
    }

    #[test]
    fn test_own_material_uvs_are_not_rescaled() {
        let mut scene = Scene::new("");
        let brick = scene.add_material(
            Material::new("Brick", [200, 80, 60])
                .with_texture(Texture::new("brick.jpg", 256.0, 512.0)),
        );
        let f = scene.add_root(SceneNode::Face(Face::new(square_mesh()).with_material(brick)));
        let mut buffer = MeshBuffer::new();
        let mut registry = directx_registry();
        DirectXExtractor::new(&scene, &scene)
            .extract(&record(f, Some(brick), None), &mut buffer, &mut registry)
            .unwrap();
        // Point 3 has front UV (1,1).
        assert_eq!(buffer.vertices[4].uv, [2.0, -1.0]);
    }

    #[test]
    fn test_unit_scale_applies_to_positions_only() {
        let mut scene = Scene::new("");
        let f = scene.add_root(SceneNode::Face(Face::new(triangle_mesh())));
        let mut buffer = MeshBuffer::new();
        DirectXExtractor::new(&scene, &scene)
            .with_frame(AxisFrame::Blender)
            .with_unit_scale(2.0)
            .extract(&record(f, None, None), &mut buffer, &mut directx_registry())
            .unwrap();
        assert_eq!(buffer.vertices[2].position, [2.0, 0.0, 0.0]);
        assert_eq!(buffer.vertices[2].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_java_strip() {
        let mut scene = Scene::new("");
        let metal = scene.add_material(
            Material::new("Metal Shiny", [193, 193, 193])
                .with_texture(Texture::new("metal.jpg", 1.0, 1.0)),
        );
        let plain = scene.add_root(SceneNode::Face(Face::new(square_mesh())));
        let textured =
            scene.add_root(SceneNode::Face(Face::new(square_mesh()).with_material(metal)));
        let translate = Transform::from_translation([100.0, 0.0, 0.0]);

        let mut registry = MaterialRegistry::new(MaterialKeying::SanitizedName, LabelStyle::Java);
        let extractor = JavaExtractor::new(&scene, &scene, 0.0254);

        let strip = extractor
            .extract(
                &FaceRecord { face: plain, transform: translate, front: None, back: None },
                &mut registry,
            )
            .unwrap();
        assert_eq!(strip.material, DEFAULT_INDEX);
        assert!(!strip.textured);
        assert!(strip.tex_coords.is_none());
        assert_eq!(strip.points.len(), 6);
        assert!((strip.points[0][0] - 2.54).abs() < 1e-12);
        assert_eq!(strip.normals[0], [0.0, 0.0, 1.0]);

        let strip = extractor
            .extract(&record(textured, Some(metal), None), &mut registry)
            .unwrap();
        assert!(strip.textured);
        assert_eq!(registry.entry(strip.material).label, "Metal_Shiny");
        let uvs = strip.tex_coords.unwrap();
        assert_eq!(uvs.len(), 6);
        assert_eq!(uvs[2], [1.0, 1.0]);
    }

    #[test]
    fn test_tessellation_failure_propagates() {
        let mut scene = Scene::new("");
        let g = scene.add_root(SceneNode::Group(Container::new("g", vec![])));
        let mut buffer = MeshBuffer::new();
        let result = DirectXExtractor::new(&scene, &scene).extract(
            &record(g, None, None),
            &mut buffer,
            &mut directx_registry(),
        );
        assert!(matches!(result, Err(ExportError::NotAFace(_))));
    }
}
