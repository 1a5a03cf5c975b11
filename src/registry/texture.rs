//! Texture file export.
//!
//! Every unique textured material gets its image re-serialized next to the
//! output file. Writers are a seam so tests and the WASM bindings can record
//! requests instead of touching disk.

use crate::error::Result;
use crate::scene::Texture;
use crate::types::{file_basename, NodeId, Side};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// Destination for texture images bound to exported materials.
pub trait TextureWriter {
    /// Write the texture bound to `side` of `face` to `destination`.
    fn write_texture(
        &mut self,
        face: NodeId,
        side: Side,
        texture: &Texture,
        destination: &Path,
    ) -> Result<()>;
}

/// Re-serializes texture images from a source directory.
#[derive(Debug, Clone)]
pub struct FsTextureWriter {
    source_dir: PathBuf,
}

impl FsTextureWriter {
    /// Textures whose recorded path does not exist are looked up by base
    /// name inside `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    fn locate(&self, texture: &Texture) -> PathBuf {
        let recorded = Path::new(&texture.filename);
        if recorded.is_file() {
            recorded.to_path_buf()
        } else {
            self.source_dir.join(file_basename(&texture.filename))
        }
    }
}

impl TextureWriter for FsTextureWriter {
    fn write_texture(
        &mut self,
        _face: NodeId,
        _side: Side,
        texture: &Texture,
        destination: &Path,
    ) -> Result<()> {
        let source = self.locate(texture);
        match ImageFormat::from_path(destination) {
            Ok(format) if format.writing_enabled() => {
                let img = image::open(&source)?;
                img.save_with_format(destination, format)?;
            }
            _ => {
                std::fs::copy(&source, destination)?;
            }
        }
        log::debug!("Wrote texture {:?} -> {:?}", source, destination);
        Ok(())
    }
}

/// A texture write request captured by [`RecordingTextureWriter`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextureWrite {
    pub face: NodeId,
    pub side: Side,
    pub filename: String,
    pub destination: PathBuf,
}

/// Records texture writes without performing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingTextureWriter {
    pub writes: Vec<TextureWrite>,
}

impl RecordingTextureWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextureWriter for RecordingTextureWriter {
    fn write_texture(
        &mut self,
        face: NodeId,
        side: Side,
        texture: &Texture,
        destination: &Path,
    ) -> Result<()> {
        self.writes.push(TextureWrite {
            face,
            side,
            filename: texture.filename.clone(),
            destination: destination.to_path_buf(),
        });
        Ok(())
    }
}

impl<W: TextureWriter + ?Sized> TextureWriter for &mut W {
    fn write_texture(
        &mut self,
        face: NodeId,
        side: Side,
        texture: &Texture,
        destination: &Path,
    ) -> Result<()> {
        (**self).write_texture(face, side, texture, destination)
    }
}
