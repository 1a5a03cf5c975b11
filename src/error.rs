//! Error types for the scene exporter.

use crate::types::{MaterialId, NodeId};
use thiserror::Error;

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or write a texture image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Formatting the output document failed.
    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A node reference points outside the scene arena.
    #[error("Scene node not found: {0}")]
    MissingNode(NodeId),

    /// A material reference points outside the scene's material table.
    #[error("Material not found: {0}")]
    MissingMaterial(MaterialId),

    /// A face was expected but the node is a group or component.
    #[error("Node {0} is not a face")]
    NotAFace(NodeId),

    /// Polygon mesh data is inconsistent (bad index, mismatched attribute lengths).
    #[error("Invalid mesh on {node}: {reason}")]
    InvalidMesh { node: NodeId, reason: String },

    /// A container is reachable from itself.
    #[error("Cyclic scene graph: {0} contains itself")]
    CyclicScene(NodeId),

    /// The snapshot is structurally invalid.
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// A DirectX variant name was not recognized.
    #[error("Unknown DirectX variant: {0}")]
    UnknownVariant(String),

    /// The tessellator could not produce a mesh for a face.
    #[error("Tessellation failed for {node}: {reason}")]
    Tessellation { node: NodeId, reason: String },
}
