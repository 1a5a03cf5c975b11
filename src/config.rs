//! Export configuration.

use crate::error::{ExportError, Result};
use crate::mesher::AxisFrame;
use crate::registry::MaterialKeying;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Inches to meters.
pub const JAVA_UNIT_SCALE: f64 = 0.0254;

/// Texture loader expression used by the Java materials block.
pub const DEFAULT_TEXTURE_RESOURCE_CALL: &str = "WPBDApp.getApplication().getTextureResource";

/// Java/GL export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JavaConfig {
    /// Position scale factor. Normals are never scaled.
    pub unit_scale: f64,
    pub material_keying: MaterialKeying,
    /// Call emitted for texture constants, before the argument list.
    pub texture_resource_call: String,
}

impl Default for JavaConfig {
    fn default() -> Self {
        Self {
            unit_scale: JAVA_UNIT_SCALE,
            material_keying: MaterialKeying::default(),
            texture_resource_call: DEFAULT_TEXTURE_RESOURCE_CALL.to_string(),
        }
    }
}

impl JavaConfig {
    pub fn with_unit_scale(mut self, unit_scale: f64) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    pub fn with_material_keying(mut self, keying: MaterialKeying) -> Self {
        self.material_keying = keying;
        self
    }

    pub fn with_texture_resource_call(mut self, call: impl Into<String>) -> Self {
        self.texture_resource_call = call.into();
        self
    }
}

/// The three DirectX export commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectXVariant {
    /// Every face, both sides.
    #[default]
    All,
    /// Only the sides that carry a material.
    TexturedOnly,
    /// Every face, axes untouched, wrapped in a rotation frame.
    Blender,
}

impl DirectXVariant {
    pub fn textured_only(self) -> bool {
        matches!(self, DirectXVariant::TexturedOnly)
    }

    pub fn rotated(self) -> bool {
        matches!(self, DirectXVariant::Blender)
    }

    pub fn axis_frame(self) -> AxisFrame {
        if self.rotated() {
            AxisFrame::Blender
        } else {
            AxisFrame::LeftHanded
        }
    }

    /// Suffix appended to the suggested file name.
    pub fn file_suffix(self) -> &'static str {
        match self {
            DirectXVariant::TexturedOnly => "-T",
            DirectXVariant::All | DirectXVariant::Blender => "",
        }
    }

    /// Save dialog title.
    pub fn title(self) -> &'static str {
        match self {
            DirectXVariant::All => "Export DirectX",
            DirectXVariant::TexturedOnly => "Export textured faces to DirectX",
            DirectXVariant::Blender => "Export DirectX for Blender",
        }
    }

}

impl FromStr for DirectXVariant {
    type Err = ExportError;

    /// Parse a CLI-style variant name.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(DirectXVariant::All),
            "textured" | "textured_only" | "textured-only" => Ok(DirectXVariant::TexturedOnly),
            "blender" | "rotated" => Ok(DirectXVariant::Blender),
            _ => Err(ExportError::UnknownVariant(s.to_string())),
        }
    }
}

/// DirectX export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectXConfig {
    pub variant: DirectXVariant,
    /// Position scale factor. Host units pass through unscaled by default.
    pub unit_scale: f64,
    pub material_keying: MaterialKeying,
    /// Directory searched by base name for textures whose recorded path is gone.
    pub texture_dir: Option<PathBuf>,
}

impl Default for DirectXConfig {
    fn default() -> Self {
        Self {
            variant: DirectXVariant::All,
            unit_scale: 1.0,
            material_keying: MaterialKeying::default(),
            texture_dir: None,
        }
    }
}

impl DirectXConfig {
    pub fn new(variant: DirectXVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn with_variant(mut self, variant: DirectXVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_unit_scale(mut self, unit_scale: f64) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    pub fn with_material_keying(mut self, keying: MaterialKeying) -> Self {
        self.material_keying = keying;
        self
    }

    pub fn with_texture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.texture_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_scale_asymmetry() {
        assert_eq!(JavaConfig::default().unit_scale, 0.0254);
        assert_eq!(DirectXConfig::default().unit_scale, 1.0);
        assert_eq!(DirectXConfig::default().material_keying, MaterialKeying::SanitizedName);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "variant": "textured_only", "material_keying": "identity" }"#;
        let config: DirectXConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.variant, DirectXVariant::TexturedOnly);
        assert_eq!(config.material_keying, MaterialKeying::Identity);
        assert_eq!(config.unit_scale, 1.0);
        assert!(config.texture_dir.is_none());

        let config: JavaConfig = serde_json::from_str(r#"{ "unit_scale": 1.0 }"#).unwrap();
        assert_eq!(config.unit_scale, 1.0);
        assert_eq!(config.texture_resource_call, DEFAULT_TEXTURE_RESOURCE_CALL);
    }

    #[test]
    fn test_variant_properties() {
        assert_eq!("Blender".parse::<DirectXVariant>().unwrap(), DirectXVariant::Blender);
        assert_eq!("textured".parse::<DirectXVariant>().unwrap(), DirectXVariant::TexturedOnly);
        assert!(matches!(
            "nope".parse::<DirectXVariant>(),
            Err(ExportError::UnknownVariant(name)) if name == "nope"
        ));
        assert_eq!(DirectXVariant::TexturedOnly.file_suffix(), "-T");
        assert_eq!(DirectXVariant::Blender.axis_frame(), AxisFrame::Blender);
        assert_eq!(DirectXVariant::All.axis_frame(), AxisFrame::LeftHanded);
        assert!(!DirectXVariant::Blender.textured_only());
    }

    #[test]
    fn test_builders() {
        let config = DirectXConfig::new(DirectXVariant::Blender)
            .with_unit_scale(0.5)
            .with_texture_dir("/tmp/tex");
        assert!(config.variant.rotated());
        assert_eq!(config.unit_scale, 0.5);
        assert_eq!(config.texture_dir, Some(PathBuf::from("/tmp/tex")));

        let config = JavaConfig::default()
            .with_material_keying(MaterialKeying::Identity)
            .with_texture_resource_call("loadTexture");
        assert_eq!(config.texture_resource_call, "loadTexture");
    }
}
