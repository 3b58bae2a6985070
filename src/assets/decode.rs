use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{foundation::core::SourceImage, foundation::error::TileResult};

/// A decoded raster with its dimensions.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    /// Dimensions used by the layout engines.
    pub source: SourceImage,
    /// Straight-alpha RGBA8 pixels.
    pub pixels: Arc<image::RgbaImage>,
    /// Encoded size on disk, when loaded from a file.
    pub file_bytes: Option<u64>,
}

/// Decode encoded image bytes into RGBA8.
pub fn decode_image(bytes: &[u8]) -> TileResult<LoadedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    from_rgba(dyn_img.to_rgba8(), None)
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> TileResult<LoadedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let dyn_img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded image");
    from_rgba(dyn_img.to_rgba8(), Some(bytes.len() as u64))
}

fn from_rgba(rgba: image::RgbaImage, file_bytes: Option<u64>) -> TileResult<LoadedImage> {
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage {
        source: SourceImage::new(width, height)?,
        pixels: Arc::new(rgba),
        file_bytes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
