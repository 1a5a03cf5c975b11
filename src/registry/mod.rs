//! Material and texture registry.
//!
//! The registry assigns each distinct material a stable index for one export
//! run, keeps the human-readable label emitted for it, and triggers the
//! texture file export the first time a textured material object is seen.

pub mod texture;

pub use texture::{FsTextureWriter, RecordingTextureWriter, TextureWrite, TextureWriter};

use crate::error::Result;
use crate::scene::{Material, Texture};
use crate::types::{file_basename, MaterialId, NodeId, Side};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Index of the built-in fallback material. Always present.
pub const DEFAULT_INDEX: usize = 0;

/// Name of the fallback material in DirectX output.
pub const DEFAULT_MATERIAL_NAME: &str = "Default_Material";

/// RGBA of the fallback material in Java output.
pub const DEFAULT_COLOR: [f64; 4] = [0.7, 0.7, 0.7, 1.0];

/// How materials are deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKeying {
    /// Key on the name with non-alphanumerics stripped. Distinct materials
    /// whose names sanitize alike share one entry; each such alias is recorded.
    #[default]
    SanitizedName,
    /// Key on material identity. Labels are made unique with a numeric suffix.
    Identity,
}

/// Label convention of the target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Every non-alphanumeric character becomes `_`.
    DirectX,
    /// Spaces become `_`, then non-word characters are dropped.
    Java,
}

impl LabelStyle {
    pub fn label(self, name: &str) -> String {
        match self {
            LabelStyle::DirectX => underscore_name(name),
            LabelStyle::Java => javify_name(name),
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            LabelStyle::DirectX => DEFAULT_MATERIAL_NAME,
            LabelStyle::Java => "default",
        }
    }
}

/// Dedup key for a material name: every non-alphanumeric character removed.
pub fn sanitize_key(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Replace every non-alphanumeric character with `_`.
pub fn underscore_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Java identifier body: spaces to `_`, then only word characters kept.
pub fn javify_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// One emitted material record.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub label: String,
    /// First material registered under this entry; `None` for the fallback.
    pub material: Option<MaterialId>,
    /// First material under this entry that binds a named texture.
    pub textured: Option<MaterialId>,
}

impl RegistryEntry {
    pub fn is_default(&self) -> bool {
        self.material.is_none()
    }
}

/// Two distinct materials that collapsed onto one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialAlias {
    pub key: String,
    pub kept: MaterialId,
    pub aliased: MaterialId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RegistryKey {
    Name(String),
    Identity(MaterialId),
}

/// Writes texture images next to the output file.
pub struct TextureSink<'w> {
    writer: Box<dyn TextureWriter + 'w>,
    prefix: String,
    written: Vec<PathBuf>,
}

impl<'w> TextureSink<'w> {
    /// `prefix` is the output path; texture files are named by appending the
    /// texture's base filename to it.
    pub fn new<W: TextureWriter + 'w>(writer: W, prefix: impl Into<String>) -> Self {
        Self {
            writer: Box::new(writer),
            prefix: prefix.into(),
            written: Vec::new(),
        }
    }

    pub fn destination(&self, texture: &Texture) -> PathBuf {
        PathBuf::from(format!("{}{}", self.prefix, file_basename(&texture.filename)))
    }

    fn write(&mut self, face: NodeId, side: Side, texture: &Texture) -> Result<()> {
        let destination = self.destination(texture);
        self.writer.write_texture(face, side, texture, &destination)?;
        log::info!("<material={}>", destination.display());
        self.written.push(destination);
        Ok(())
    }
}

/// Per-export material registry.
pub struct MaterialRegistry<'w> {
    keying: MaterialKeying,
    style: LabelStyle,
    entries: Vec<RegistryEntry>,
    by_key: HashMap<RegistryKey, usize>,
    by_identity: HashMap<MaterialId, usize>,
    labels: HashSet<String>,
    aliases: Vec<MaterialAlias>,
    textures: Option<TextureSink<'w>>,
}

impl<'w> MaterialRegistry<'w> {
    /// Create a registry pre-seeded with the fallback material.
    pub fn new(keying: MaterialKeying, style: LabelStyle) -> Self {
        let default_label = style.default_label().to_string();
        let mut labels = HashSet::new();
        labels.insert(default_label.clone());
        Self {
            keying,
            style,
            entries: vec![RegistryEntry {
                label: default_label,
                material: None,
                textured: None,
            }],
            by_key: HashMap::new(),
            by_identity: HashMap::new(),
            labels,
            aliases: Vec::new(),
            textures: None,
        }
    }

    /// Enable texture export as a side effect of [`resolve_on`](Self::resolve_on).
    pub fn with_texture_sink(mut self, sink: TextureSink<'w>) -> Self {
        self.textures = Some(sink);
        self
    }

    /// Resolve a material to its entry index without exporting textures.
    pub fn resolve(&mut self, id: MaterialId, material: &Material) -> Result<usize> {
        self.register(id, material, None)
    }

    /// Resolve a material seen on one side of a face.
    ///
    /// The first time a textured material object is resolved, its texture is
    /// written through the sink, if one is installed.
    pub fn resolve_on(
        &mut self,
        id: MaterialId,
        material: &Material,
        face: NodeId,
        side: Side,
    ) -> Result<usize> {
        self.register(id, material, Some((face, side)))
    }

    fn register(
        &mut self,
        id: MaterialId,
        material: &Material,
        origin: Option<(NodeId, Side)>,
    ) -> Result<usize> {
        if let Some(&index) = self.by_identity.get(&id) {
            return Ok(index);
        }

        let key = match self.keying {
            MaterialKeying::SanitizedName => RegistryKey::Name(sanitize_key(&material.name)),
            MaterialKeying::Identity => RegistryKey::Identity(id),
        };

        let index = match self.by_key.get(&key) {
            Some(&index) => {
                let kept = self.entries[index].material;
                if let (RegistryKey::Name(name), Some(kept)) = (&key, kept) {
                    log::warn!(
                        "Material {:?} ({}) aliases {} under key {:?}",
                        material.name,
                        id,
                        kept,
                        name
                    );
                    self.aliases.push(MaterialAlias {
                        key: name.clone(),
                        kept,
                        aliased: id,
                    });
                }
                index
            }
            None => {
                let label = self.unique_label(self.style.label(&material.name));
                self.entries.push(RegistryEntry {
                    label,
                    material: Some(id),
                    textured: None,
                });
                let index = self.entries.len() - 1;
                self.by_key.insert(key, index);
                index
            }
        };
        self.by_identity.insert(id, index);
        let entry = &mut self.entries[index];
        if entry.textured.is_none() && material.named_texture().is_some() {
            entry.textured = Some(id);
        }

        if let (Some(sink), Some((face, side))) = (self.textures.as_mut(), origin) {
            if let Some(texture) = material.named_texture() {
                sink.write(face, side, texture)?;
            }
        }
        Ok(index)
    }

    fn unique_label(&mut self, base: String) -> String {
        let base = if base.is_empty() { "unnamed".to_string() } else { base };
        let mut label = base.clone();
        let mut n = 2;
        while self.labels.contains(&label) {
            label = format!("{}_{}", base, n);
            n += 1;
        }
        self.labels.insert(label.clone());
        label
    }

    pub fn entry(&self, index: usize) -> &RegistryEntry {
        &self.entries[index]
    }

    /// Registered entries other than the fallback, in registration order.
    pub fn materials(&self) -> impl Iterator<Item = (usize, &RegistryEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_default())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn aliases(&self) -> &[MaterialAlias] {
        &self.aliases
    }

    pub fn has_aliases(&self) -> bool {
        !self.aliases.is_empty()
    }

    /// Texture files written so far.
    pub fn written_textures(&self) -> &[PathBuf] {
        self.textures
            .as_ref()
            .map(|sink| sink.written.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(name: &str, file: &str) -> Material {
        Material::new(name, [10, 20, 30]).with_texture(Texture::new(file, 64.0, 64.0))
    }

    #[test]
    fn test_sanitizers() {
        assert_eq!(sanitize_key("Wood#1"), "Wood1");
        assert_eq!(sanitize_key("Wood!1"), "Wood1");
        assert_eq!(underscore_name("[Metal] Shiny"), "_Metal__Shiny");
        assert_eq!(javify_name("Burnt Umber1"), "Burnt_Umber1");
        assert_eq!(javify_name("Translucent Glass (Sky)"), "Translucent_Glass_Sky");
    }

    #[test]
    fn test_default_is_preseeded() {
        let registry = MaterialRegistry::new(MaterialKeying::SanitizedName, LabelStyle::DirectX);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_empty());
        assert_eq!(registry.entry(DEFAULT_INDEX).label, DEFAULT_MATERIAL_NAME);
        assert!(registry.entry(DEFAULT_INDEX).is_default());
        assert_eq!(registry.materials().count(), 0);
    }

    #[test]
    fn test_distinct_keys_get_distinct_indices() {
        let mut registry =
            MaterialRegistry::new(MaterialKeying::SanitizedName, LabelStyle::DirectX);
        let a = registry.resolve(MaterialId(0), &Material::new("Brick", [1, 2, 3])).unwrap();
        let b = registry.resolve(MaterialId(1), &Material::new("Stone", [1, 2, 3])).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, DEFAULT_INDEX);
        // Idempotent for the same object.
        let again = registry.resolve(MaterialId(0), &Material::new("Brick", [1, 2, 3])).unwrap();
        assert_eq!(a, again);
        assert!(!registry.has_aliases());
    }

    #[test]
    fn test_sanitized_aliasing_is_detected() {
        let mut registry =
            MaterialRegistry::new(MaterialKeying::SanitizedName, LabelStyle::DirectX);
        let a = registry.resolve(MaterialId(0), &Material::new("Wood#1", [1, 2, 3])).unwrap();
        let b = registry.resolve(MaterialId(1), &Material::new("Wood!1", [9, 9, 9])).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.materials().count(), 1);
        assert_eq!(
            registry.aliases(),
            &[MaterialAlias {
                key: "Wood1".to_string(),
                kept: MaterialId(0),
                aliased: MaterialId(1),
            }]
        );
        // Re-resolving the aliased object does not record a second alias.
        registry.resolve(MaterialId(1), &Material::new("Wood!1", [9, 9, 9])).unwrap();
        assert_eq!(registry.aliases().len(), 1);
    }

    #[test]
    fn test_entry_tracks_first_textured_alias() {
        let mut registry =
            MaterialRegistry::new(MaterialKeying::SanitizedName, LabelStyle::Java);
        let a = registry.resolve(MaterialId(0), &Material::new("Wood 1", [1, 2, 3])).unwrap();
        assert_eq!(registry.entry(a).textured, None);
        let b = registry.resolve(MaterialId(1), &textured("Wood#1", "oak.jpg")).unwrap();
        let c = registry.resolve(MaterialId(2), &textured("Wood-1", "pine.jpg")).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(registry.entry(a).material, Some(MaterialId(0)));
        assert_eq!(registry.entry(a).textured, Some(MaterialId(1)));
    }

    #[test]
    fn test_identity_keying_keeps_aliases_apart() {
        let mut registry = MaterialRegistry::new(MaterialKeying::Identity, LabelStyle::DirectX);
        let a = registry.resolve(MaterialId(0), &Material::new("Wood#1", [1, 2, 3])).unwrap();
        let b = registry.resolve(MaterialId(1), &Material::new("Wood!1", [9, 9, 9])).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.entry(a).label, "Wood_1");
        assert_eq!(registry.entry(b).label, "Wood_1_2");
        assert!(!registry.has_aliases());
    }

    #[test]
    fn test_java_labels() {
        let mut registry = MaterialRegistry::new(MaterialKeying::SanitizedName, LabelStyle::Java);
        assert_eq!(registry.entry(DEFAULT_INDEX).label, "default");
        let i = registry.resolve(MaterialId(0), &Material::new("Metal Steel", [0, 0, 0])).unwrap();
        assert_eq!(registry.entry(i).label, "Metal_Steel");
    }

    #[test]
    fn test_texture_written_once_per_material_object() {
        let mut recorder = RecordingTextureWriter::new();
        {
            let sink = TextureSink::new(&mut recorder, "/out/model.x");
            let mut registry = MaterialRegistry::new(
                MaterialKeying::SanitizedName,
                LabelStyle::DirectX,
            )
            .with_texture_sink(sink);

            let wood_a = textured("Wood#1", "C:\\tex\\oak.jpg");
            let wood_b = textured("Wood!1", "C:\\tex\\pine.jpg");
            let plain = Material::new("Plain", [0, 0, 0]);

            registry.resolve_on(MaterialId(0), &wood_a, NodeId(4), Side::Front).unwrap();
            registry.resolve_on(MaterialId(0), &wood_a, NodeId(5), Side::Back).unwrap();
            registry.resolve_on(MaterialId(1), &wood_b, NodeId(6), Side::Back).unwrap();
            registry.resolve_on(MaterialId(2), &plain, NodeId(6), Side::Front).unwrap();

            assert_eq!(
                registry.written_textures(),
                &[
                    PathBuf::from("/out/model.xoak.jpg"),
                    PathBuf::from("/out/model.xpine.jpg"),
                ]
            );
        }
        assert_eq!(recorder.writes.len(), 2);
        assert_eq!(recorder.writes[0].face, NodeId(4));
        assert_eq!(recorder.writes[1].side, Side::Back);
    }

    #[test]
    fn test_resolve_without_origin_skips_textures() {
        let mut recorder = RecordingTextureWriter::new();
        {
            let mut registry = MaterialRegistry::new(
                MaterialKeying::SanitizedName,
                LabelStyle::DirectX,
            )
            .with_texture_sink(TextureSink::new(&mut recorder, "out"));
            registry.resolve(MaterialId(0), &textured("Oak", "oak.jpg")).unwrap();
            assert!(registry.written_textures().is_empty());
        }
        assert!(recorder.writes.is_empty());
    }
}
