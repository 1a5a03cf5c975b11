//! WASM bindings for scene-exporter.
//!
//! String in, string out. Texture files cannot be written from the browser,
//! so their would-be destinations are returned for the caller to handle.

use crate::config::{DirectXConfig, DirectXVariant, JavaConfig};
use crate::pipeline::{Exporter, RenderedExport};
use crate::registry::RecordingTextureWriter;
use crate::scene::Scene;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Rendered export text plus statistics.
#[wasm_bindgen]
pub struct ExportResult {
    text: String,
    textures: Vec<String>,
    meshes: usize,
    faces: usize,
    aliases: usize,
}

impl ExportResult {
    fn from_rendered(rendered: RenderedExport) -> Self {
        Self {
            textures: rendered
                .textures
                .iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect(),
            meshes: rendered.meshes,
            faces: rendered.faces,
            aliases: rendered.aliases.len(),
            text: rendered.text,
        }
    }
}

#[wasm_bindgen]
impl ExportResult {
    /// Get the output document.
    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.text.clone()
    }

    /// Texture destinations, in write order.
    #[wasm_bindgen(getter)]
    pub fn textures(&self) -> js_sys::Array {
        self.textures.iter().map(|t| JsValue::from_str(t)).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn mesh_count(&self) -> usize {
        self.meshes
    }

    #[wasm_bindgen(getter)]
    pub fn face_count(&self) -> usize {
        self.faces
    }

    /// Number of materials that collapsed onto another's entry.
    #[wasm_bindgen(getter)]
    pub fn alias_count(&self) -> usize {
        self.aliases
    }
}

fn parse_scene(scene_json: &str) -> Result<Scene, JsError> {
    Scene::from_json_str(scene_json).map_err(|e| JsError::new(&format!("Invalid scene: {}", e)))
}

/// Export a scene snapshot as Java/OpenGL source.
#[wasm_bindgen]
pub fn export_java(scene_json: &str) -> Result<ExportResult, JsError> {
    let scene = parse_scene(scene_json)?;
    let rendered = Exporter::new(&scene)
        .render_java(&JavaConfig::default())
        .map_err(|e| JsError::new(&e.to_string()))?
        .ok_or_else(|| JsError::new("Nothing to export"))?;
    Ok(ExportResult::from_rendered(rendered))
}

/// Export a scene snapshot as DirectX text.
///
/// `variant` is one of `all`, `textured` or `blender`.
#[wasm_bindgen]
pub fn export_directx(
    scene_json: &str,
    output_name: &str,
    variant: Option<String>,
) -> Result<ExportResult, JsError> {
    let variant = match variant.as_deref() {
        Some(name) => name
            .parse::<DirectXVariant>()
            .map_err(|e| JsError::new(&e.to_string()))?,
        None => DirectXVariant::All,
    };
    let scene = parse_scene(scene_json)?;
    let rendered = Exporter::new(&scene)
        .render_directx(
            &DirectXConfig::new(variant),
            output_name,
            RecordingTextureWriter::new(),
        )
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(ExportResult::from_rendered(rendered))
}
