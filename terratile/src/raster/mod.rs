//! Pixel extraction from fetched tile images.
//!
//! Mirrors a canvas-style draw/read-back cycle: the decoded image is drawn
//! into a reusable surface at the target tile size, the RGBA samples are
//! copied out, and the surface is cleared and returned to its pool.

mod pool;

pub use pool::{Pool, PoolGuard};

use image::imageops::FilterType;
use thiserror::Error;

/// Idle surfaces kept per extractor.
const SURFACE_POOL_CAPACITY: usize = 8;

/// Raw RGBA samples for one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// `tile_size² × 4` bytes, row-major RGBA.
    pub data: Vec<u8>,
    /// Edge length in pixels.
    pub tile_size: u32,
}

/// Errors raised while turning image bytes into pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// The fetched bytes could not be decoded as an image.
    #[error("Image decode failed: {0}")]
    Decode(String),
}

/// Reads tile images into RGBA pixel buffers through pooled surfaces.
pub struct PixelExtractor {
    tile_size: u32,
    surfaces: Pool<Vec<u8>>,
}

impl PixelExtractor {
    /// Creates an extractor producing `tile_size × tile_size` buffers.
    pub fn new(tile_size: u32) -> Self {
        let surface_len = (tile_size * tile_size * 4) as usize;
        Self {
            tile_size,
            surfaces: Pool::new(SURFACE_POOL_CAPACITY, move || vec![0u8; surface_len]),
        }
    }

    /// Edge length of the buffers this extractor produces.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Decodes `bytes` and reads back a `tile_size²` RGBA buffer.
    ///
    /// Sources at a different resolution are resampled to the tile size.
    pub fn extract(&self, bytes: &[u8]) -> Result<PixelBuffer, RasterError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| RasterError::Decode(e.to_string()))?;
        let rgba = decoded.into_rgba8();
        let rgba = if rgba.width() == self.tile_size && rgba.height() == self.tile_size {
            rgba
        } else {
            image::imageops::resize(&rgba, self.tile_size, self.tile_size, FilterType::Triangle)
        };

        let mut surface = self.surfaces.acquire();
        surface.copy_from_slice(rgba.as_raw());
        let data = surface.clone();
        surface.fill(0);

        Ok(PixelBuffer {
            data,
            tile_size: self.tile_size,
        })
    }
}
