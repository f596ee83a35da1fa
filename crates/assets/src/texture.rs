use crate::AssetError;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::Path;

/// A decoded texture, always stored as 8-bit RGBA regardless of how many
/// channels the source file had.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub label: String,
    image: RgbaImage,
}

impl TextureImage {
    pub fn from_rgba(label: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            label: label.into(),
            image,
        }
    }

    /// Read and decode an image file. With `flip_vertical` the rows are
    /// reversed so the first row is the bottom of the image.
    pub fn load(path: impl AsRef<Path>, flip_vertical: bool) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| AssetError::io(path, e))?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            "decoded {} ({}x{}, {:?})",
            path.display(),
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        let mut image = decoded.to_rgba8();
        if flip_vertical {
            imageops::flip_vertical_in_place(&mut image);
        }
        Ok(Self {
            label: path.display().to_string(),
            image,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Number of levels in a full mip chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        let largest = self.width().max(self.height()).max(1);
        u32::BITS - largest.leading_zeros()
    }

    /// Full mip chain, level 0 first. Each level halves both axes (never
    /// below one pixel) using a triangle filter.
    pub fn mip_chain(&self) -> Vec<RgbaImage> {
        let count = self.mip_level_count() as usize;
        let mut levels = Vec::with_capacity(count);
        levels.push(self.image.clone());
        for _ in 1..count {
            let prev = levels.last().unwrap_or(&self.image);
            let width = (prev.width() / 2).max(1);
            let height = (prev.height() / 2).max(1);
            let next = imageops::resize(prev, width, height, FilterType::Triangle);
            levels.push(next);
        }
        levels
    }
}
