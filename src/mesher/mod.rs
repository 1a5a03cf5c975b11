//! Scene flattening and mesh extraction.
//!
//! The walker turns the scene graph into face records; the extractors turn
//! face records into per-format vertex data.

pub mod extract;
pub mod geometry;
pub mod walker;

pub use extract::{AxisFrame, DirectXExtractor, JavaExtractor, JavaStrip};
pub use geometry::{MeshBuffer, Vertex};
pub use walker::{FaceRecord, SceneWalker, Walk, WalkItem, WalkOptions, WalkStats};
