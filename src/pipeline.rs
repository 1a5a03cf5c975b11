//! Export commands.
//!
//! Each command asks for a destination, walks the scene, extracts meshes,
//! renders the whole document in memory and writes it with a single call.
//! Nothing is written when the user cancels or an error occurs.

use crate::config::{DirectXConfig, JavaConfig};
use crate::error::Result;
use crate::export::directx;
use crate::export::java::{class_name, JavaDocument};
use crate::mesher::{
    DirectXExtractor, FaceRecord, JavaExtractor, MeshBuffer, SceneWalker, Walk, WalkItem,
    WalkOptions, WalkStats,
};
use crate::registry::{
    FsTextureWriter, LabelStyle, MaterialAlias, MaterialRegistry, TextureSink, TextureWriter,
};
use crate::scene::{Scene, Tessellator};
use crate::types::{ContainerKind, NodeId, Transform};
use std::path::{Path, PathBuf};

/// Faces between two progress log lines.
const PROGRESS_INTERVAL: usize = 1000;

/// Asks the user where to write the output.
pub trait SaveDialog {
    /// `None` means the user cancelled.
    fn choose_destination(&mut self, title: &str, suggested: &str) -> Option<PathBuf>;
}

impl<F> SaveDialog for F
where
    F: FnMut(&str, &str) -> Option<PathBuf>,
{
    fn choose_destination(&mut self, title: &str, suggested: &str) -> Option<PathBuf> {
        self(title, suggested)
    }
}

/// Always answers with the same path.
#[derive(Debug, Clone)]
pub struct FixedDestination(pub PathBuf);

impl SaveDialog for FixedDestination {
    fn choose_destination(&mut self, _title: &str, _suggested: &str) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Summary of a written export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    /// Mesh blocks (DirectX) or strips (Java) emitted.
    pub meshes: usize,
    /// Face records exported.
    pub faces: usize,
    pub groups: usize,
    pub components: usize,
    /// Texture files written next to the output.
    pub textures: Vec<PathBuf>,
    /// Distinct materials that shared one emitted entry.
    pub aliases: Vec<MaterialAlias>,
}

/// How an export command ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Written(ExportReport),
    /// The save dialog was dismissed.
    Cancelled,
    /// Nothing selected or present; no dialog was shown.
    NothingToExport,
}

impl ExportOutcome {
    pub fn report(&self) -> Option<&ExportReport> {
        match self {
            ExportOutcome::Written(report) => Some(report),
            _ => None,
        }
    }
}

/// A rendered document and its statistics, not yet written anywhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedExport {
    pub text: String,
    pub meshes: usize,
    pub faces: usize,
    pub stats: WalkStats,
    pub textures: Vec<PathBuf>,
    pub aliases: Vec<MaterialAlias>,
}

impl RenderedExport {
    fn into_report(self, path: PathBuf) -> ExportReport {
        ExportReport {
            path,
            meshes: self.meshes,
            faces: self.faces,
            groups: self.stats.groups,
            components: self.stats.components,
            textures: self.textures,
            aliases: self.aliases,
        }
    }
}

/// Runs the export commands against one scene snapshot.
pub struct Exporter<'a, T: Tessellator + ?Sized = Scene> {
    scene: &'a Scene,
    tessellator: &'a T,
}

impl<'a> Exporter<'a, Scene> {
    /// Export using the meshes stored in the snapshot.
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            tessellator: scene,
        }
    }
}

impl<'a, T: Tessellator + ?Sized> Exporter<'a, T> {
    pub fn with_tessellator(scene: &'a Scene, tessellator: &'a T) -> Self {
        Self { scene, tessellator }
    }

    /// Suggested Java file name: `<base>.java`.
    pub fn java_file_name(&self) -> String {
        let base = self.scene.base_name();
        format!("{}.java", if base.is_empty() { "model" } else { base })
    }

    /// Suggested DirectX file name: `<base>[-T].x`.
    pub fn directx_file_name(&self, config: &DirectXConfig) -> String {
        let base = self.scene.base_name();
        format!(
            "{}{}.x",
            if base.is_empty() { "Untitled" } else { base },
            config.variant.file_suffix()
        )
    }

    /// Texture writer looking up images next to the scene file, or in the
    /// configured directory.
    pub fn fs_texture_writer(&self, config: &DirectXConfig) -> FsTextureWriter {
        let dir = match &config.texture_dir {
            Some(dir) => dir.clone(),
            None => Path::new(&self.scene.path)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        FsTextureWriter::new(dir)
    }

    /// Java export of the selection, or of the whole model when nothing is selected.
    pub fn export_java<D: SaveDialog + ?Sized>(
        &self,
        config: &JavaConfig,
        dialog: &mut D,
    ) -> Result<ExportOutcome> {
        let walk = self.java_walk()?;
        if walk.face_count() == 0 {
            log::info!("Nothing to export");
            return Ok(ExportOutcome::NothingToExport);
        }

        let suggested = self.java_file_name();
        let Some(path) = dialog.choose_destination("Java file location", &suggested) else {
            log::info!("Java export cancelled");
            return Ok(ExportOutcome::Cancelled);
        };

        let rendered = self.java_document(&walk, config)?;
        log::info!("Saving to : {}", path.display());
        std::fs::write(&path, &rendered.text)?;
        Ok(ExportOutcome::Written(rendered.into_report(path)))
    }

    /// Render the Java source without writing it. `None` when there are no faces.
    pub fn render_java(&self, config: &JavaConfig) -> Result<Option<RenderedExport>> {
        let walk = self.java_walk()?;
        if walk.face_count() == 0 {
            return Ok(None);
        }
        self.java_document(&walk, config).map(Some)
    }

    fn java_walk(&self) -> Result<Walk> {
        let entries: &[NodeId] = if self.scene.selection.is_empty() {
            &self.scene.roots
        } else {
            &self.scene.selection
        };
        SceneWalker::new(self.scene, WalkOptions::JAVA).walk(entries, Transform::IDENTITY, None)
    }

    fn java_document(&self, walk: &Walk, config: &JavaConfig) -> Result<RenderedExport> {
        log::info!(
            "{} group(s), {} component(s), {} faces.",
            walk.stats.groups,
            walk.stats.components,
            walk.stats.faces
        );

        let mut registry = MaterialRegistry::new(config.material_keying, LabelStyle::Java);
        let mut doc = JavaDocument::new(&class_name(self.scene.base_name()));
        doc.materials(self.scene, &mut registry, &config.texture_resource_call)?;
        doc.open_strips();

        let extractor = JavaExtractor::new(self.scene, self.tessellator, config.unit_scale);
        let mut faces = 0;
        for item in &walk.items {
            match item {
                WalkItem::Enter { kind, name, .. } => doc.container(*kind, name),
                WalkItem::Face(record) => {
                    let strip = extractor.extract(record, &mut registry)?;
                    doc.strip(&strip, &registry)?;
                    faces += 1;
                    log_progress(faces, walk.stats.faces);
                }
            }
        }

        Ok(RenderedExport {
            text: doc.finish(),
            meshes: faces,
            faces,
            stats: walk.stats,
            textures: Vec::new(),
            aliases: registry.aliases().to_vec(),
        })
    }

    /// DirectX export of every visible top-level entity.
    ///
    /// Each top-level group or component becomes one mesh; the remaining
    /// top-level faces form a final mesh. The header is written even when
    /// no mesh has geometry.
    pub fn export_directx<D, W>(
        &self,
        config: &DirectXConfig,
        dialog: &mut D,
        texture_writer: W,
    ) -> Result<ExportOutcome>
    where
        D: SaveDialog + ?Sized,
        W: TextureWriter,
    {
        let suggested = self.directx_file_name(config);
        let Some(path) = dialog.choose_destination(config.variant.title(), &suggested) else {
            log::info!("DirectX export cancelled");
            return Ok(ExportOutcome::Cancelled);
        };

        let rendered = self.render_directx(config, &path.to_string_lossy(), texture_writer)?;
        log::info!("Saving to : {}", path.display());
        std::fs::write(&path, &rendered.text)?;
        Ok(ExportOutcome::Written(rendered.into_report(path)))
    }

    /// Render the DirectX document without writing it. Textures are still
    /// handed to `texture_writer`, named after `output_path`.
    pub fn render_directx<W: TextureWriter>(
        &self,
        config: &DirectXConfig,
        output_path: &str,
        texture_writer: W,
    ) -> Result<RenderedExport> {
        let textured_only = config.variant.textured_only();
        let mut registry = MaterialRegistry::new(config.material_keying, LabelStyle::DirectX)
            .with_texture_sink(TextureSink::new(texture_writer, output_path));
        let walker = SceneWalker::new(self.scene, WalkOptions::DIRECTX);
        let extractor = DirectXExtractor::new(self.scene, self.tessellator)
            .with_frame(config.variant.axis_frame())
            .textured_only(textured_only)
            .with_unit_scale(config.unit_scale);

        let mut meshes = Vec::new();
        let mut stats = WalkStats::default();
        let mut faces = 0;
        let mut loose = Vec::new();

        for &root in &self.scene.roots {
            let node = self.scene.node(root)?;
            if !node.is_visible() {
                continue;
            }
            let Some((kind, container)) = node.container() else {
                loose.push(root);
                continue;
            };
            match kind {
                ContainerKind::Group => stats.groups += 1,
                ContainerKind::ComponentInstance => stats.components += 1,
            }
            let name = match container.definition.as_deref() {
                _ if !container.name.is_empty() => container.name.clone(),
                Some(definition) if !definition.is_empty() => definition.to_string(),
                _ => format!("mesh_{}", meshes.len()),
            };
            log::debug!("{:?}: {}", kind, name);

            let walk = walker.walk(&container.children, container.transform, container.material)?;
            stats.add(walk.stats);
            let records = walk.sided_faces(textured_only);
            let text = self.directx_mesh(&name, &records, &extractor, &mut registry, &mut faces)?;
            if !text.is_empty() {
                meshes.push(text);
            }
        }

        if !loose.is_empty() {
            let name = format!("mesh_{}", meshes.len());
            let walk = walker.walk(&loose, Transform::IDENTITY, None)?;
            stats.add(walk.stats);
            let records = walk.sided_faces(textured_only);
            let text = self.directx_mesh(&name, &records, &extractor, &mut registry, &mut faces)?;
            if !text.is_empty() {
                meshes.push(text);
            }
        }

        log::info!(
            "{} group(s), {} component(s), {} faces.",
            stats.groups,
            stats.components,
            faces
        );

        let materials = directx::materials_block(&registry, self.scene, output_path)?;
        Ok(RenderedExport {
            text: directx::document(&materials, &meshes, config.variant.rotated()),
            meshes: meshes.len(),
            faces,
            stats,
            textures: registry.written_textures().to_vec(),
            aliases: registry.aliases().to_vec(),
        })
    }

    fn directx_mesh(
        &self,
        name: &str,
        records: &[FaceRecord],
        extractor: &DirectXExtractor<'_, T>,
        registry: &mut MaterialRegistry<'_>,
        faces: &mut usize,
    ) -> Result<String> {
        let mut buffer = MeshBuffer::new();
        for record in records {
            extractor.extract(record, &mut buffer, registry)?;
            debug_assert!(buffer.indices_in_range());
            *faces += 1;
            if *faces % PROGRESS_INTERVAL == 0 {
                log::debug!("{} faces..", faces);
            }
        }
        log::debug!(
            "Mesh {}: {} vertices, {} triangles",
            name,
            buffer.vertex_count(),
            buffer.triangle_count()
        );
        directx::mesh_block(name, &buffer, registry)
    }
}

fn log_progress(done: usize, total: usize) {
    if done % PROGRESS_INTERVAL == 0 {
        log::debug!("{} / {} faces..", done, total);
    }
}
