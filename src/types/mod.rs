//! Shared types used throughout the library.

mod transform;

pub use transform::Transform;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Handle to a material in the scene's material table.
///
/// Two handles are equal only if they name the same material object, which
/// makes this the identity used for texture export deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub usize);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// Which side of a face a material or UV set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
}

/// Kind of container node entered during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Group,
    ComponentInstance,
}

/// Base name of a path, accepting both `/` and `\` separators.
///
/// Texture filenames recorded by modeling hosts frequently carry
/// Windows-style absolute paths even on other platforms.
pub fn file_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// File stem up to the first `.` of the base name.
pub fn file_prefix(path: &str) -> &str {
    let base = file_basename(path);
    base.split('.').next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_basename() {
        assert_eq!(file_basename("C:\\textures\\brick.jpg"), "brick.jpg");
        assert_eq!(file_basename("/tmp/out/model.x"), "model.x");
        assert_eq!(file_basename("plain.png"), "plain.png");
        assert_eq!(file_basename(""), "");
    }

    #[test]
    fn test_file_prefix() {
        assert_eq!(file_prefix("/models/truck.cab.skp"), "truck");
        assert_eq!(file_prefix(""), "");
    }
}
