//! Scene snapshot loading from JSON files and strings.

use super::Scene;
use crate::error::Result;
use std::path::Path;

/// Load a scene snapshot from a JSON file.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let scene = load_from_str(&contents)?;
    log::debug!(
        "Loaded scene from {:?}: {} nodes, {} materials, {} roots",
        path,
        scene.node_count(),
        scene.materials.len(),
        scene.roots.len()
    );
    Ok(scene)
}

/// Parse and validate a scene snapshot from JSON text.
pub fn load_from_str(json: &str) -> Result<Scene> {
    let scene: Scene = serde_json::from_str(json)?;
    scene.validate()?;
    Ok(scene)
}

/// Parse and validate a scene snapshot from JSON bytes (for WASM compatibility).
pub fn load_from_bytes(data: &[u8]) -> Result<Scene> {
    let scene: Scene = serde_json::from_slice(data)?;
    scene.validate()?;
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::scene::SceneNode;
    use crate::types::NodeId;

    const SCENE: &str = r#"{
        "path": "C:\\models\\cab.skp",
        "materials": [
            { "name": "Metal [Shiny]", "color": [193, 193, 193],
              "texture": { "filename": "C:\\tex\\metal.jpg", "width": 64, "height": 32 } },
            { "name": "Glass", "color": [126, 138, 183], "alpha": 0.5 }
        ],
        "nodes": [
            { "type": "face", "material": 0,
              "mesh": { "points": [[0,0,0],[1,0,0],[0,1,0]], "polygons": [[1,2,-3]] } },
            { "type": "component_instance", "name": "", "definition": "Door",
              "material": 1, "children": [0] }
        ],
        "roots": [1]
    }"#;

    #[test]
    fn test_load_from_str() {
        let scene = load_from_str(SCENE).unwrap();
        assert_eq!(scene.base_name(), "cab");
        assert_eq!(scene.materials.len(), 2);
        assert_eq!(scene.materials[1].alpha, 0.5);
        assert_eq!(scene.materials[0].alpha, 1.0);
        let (_, component) = scene.node(NodeId(1)).unwrap().container().unwrap();
        assert_eq!(component.definition.as_deref(), Some("Door"));
        assert!(component.visible);
        assert!(component.transform.is_identity());
        assert!(matches!(scene.node(NodeId(0)).unwrap(), SceneNode::Face(_)));
    }

    #[test]
    fn test_load_rejects_dangling_child() {
        let json = r#"{ "nodes": [ { "type": "group", "children": [4] } ], "roots": [0] }"#;
        assert!(matches!(load_from_str(json), Err(ExportError::MissingNode(NodeId(4)))));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, SCENE).unwrap();
        let scene = load_from_path(&path).unwrap();
        assert_eq!(scene.node_count(), 2);
        assert!(load_from_path(dir.path().join("missing.json")).is_err());
    }
}
