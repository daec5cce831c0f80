//! Flat fallback tiles.

/// A regular-grid heightmap tile.
///
/// Used as the degraded substitute when a tile cannot be fetched or
/// decoded; the renderer can always display it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightmapData {
    /// Samples per row.
    pub width: u32,
    /// Sample rows.
    pub height: u32,
    /// Row-major height samples, in metres.
    pub heights: Vec<f32>,
}

impl HeightmapData {
    /// A flat sea-level tile of `samples × samples` posts.
    pub fn empty(samples: u32) -> Self {
        Self {
            width: samples,
            height: samples,
            heights: vec![0.0; (samples * samples) as usize],
        }
    }
}

/// Fallback resolution for a failed tile, coarser with depth.
pub fn fallback_resolution(z: u8) -> u32 {
    (32 - 4 * i32::from(z)).max(4) as u32
}
