//! # Scene Exporter
//!
//! A Rust library for flattening a 3D modeling scene graph into Java/OpenGL
//! source or DirectX `.x` text.
//!
//! ## Overview
//!
//! The host scene is captured as a [`Scene`] snapshot (a node arena with
//! groups, component instances and pre-tessellated faces). An [`Exporter`]
//! walks it, composes transforms, resolves inherited materials, extracts
//! per-face triangles, deduplicates materials, and renders the target format.
//!
//! ## Quick Start
//!
//! ```ignore
//! use scene_exporter::{load_scene, DirectXConfig, Exporter, FixedDestination};
//!
//! let scene = load_scene("truck.json")?;
//! let exporter = Exporter::new(&scene);
//!
//! let config = DirectXConfig::default();
//! let writer = exporter.fs_texture_writer(&config);
//! let outcome = exporter.export_directx(
//!     &config,
//!     &mut FixedDestination("truck.x".into()),
//!     writer,
//! )?;
//! ```
//!
//! ## Host Integration
//!
//! Hosts that tessellate on demand implement [`Tessellator`] and pass it with
//! [`Exporter::with_tessellator`]; the snapshot then only needs the graph and
//! materials. Texture files go through the [`TextureWriter`] seam.

pub mod config;
pub mod error;
pub mod export;
pub mod mesher;
pub mod pipeline;
pub mod registry;
pub mod scene;
pub mod types;

// Re-export main types for convenience
pub use config::{DirectXConfig, DirectXVariant, JavaConfig};
pub use error::{ExportError, Result};
pub use mesher::{AxisFrame, FaceRecord, MeshBuffer, SceneWalker, Vertex, WalkOptions};
pub use pipeline::{
    ExportOutcome, ExportReport, Exporter, FixedDestination, RenderedExport, SaveDialog,
};
pub use registry::{
    FsTextureWriter, MaterialAlias, MaterialKeying, MaterialRegistry, RecordingTextureWriter,
    TextureWriter,
};
pub use scene::{
    Container, Face, Material, MeshFlags, PolygonMesh, Scene, SceneNode, Tessellator, Texture,
};
pub use types::{ContainerKind, MaterialId, NodeId, Side, Transform};

/// Load a scene snapshot from a JSON file.
pub fn load_scene<P: AsRef<std::path::Path>>(path: P) -> Result<Scene> {
    scene::loader::load_from_path(path)
}

/// Load a scene snapshot from JSON bytes (for WASM compatibility).
pub fn load_scene_from_bytes(data: &[u8]) -> Result<Scene> {
    scene::loader::load_from_bytes(data)
}

#[cfg(feature = "wasm")]
pub mod wasm;
