//! Terrain-RGB elevation grids.

use super::MeshError;

/// Divisor of the packed 24-bit value (decimetre resolution).
const ELEVATION_DIVISOR: f64 = 10.0;

/// Offset subtracted after scaling, in metres.
const ELEVATION_OFFSET: f64 = 10_000.0;

/// Decodes RGBA pixels into a `(tile_size + 1)²` elevation grid.
///
/// Each pixel packs its elevation into the 24-bit integer formed by the
/// red, green and blue channels. The source image has `tile_size` rows, so
/// the grid's final row and column are backfilled from their neighbours to
/// cover the tile edges.
pub(crate) fn terrain_grid(pixels: &[u8], tile_size: usize) -> Result<Vec<f32>, MeshError> {
    let expected = tile_size * tile_size * 4;
    if pixels.len() != expected {
        return Err(MeshError::BufferSize {
            expected,
            actual: pixels.len(),
        });
    }

    let grid_size = tile_size + 1;
    let mut terrain = vec![0.0f32; grid_size * grid_size];
    for y in 0..tile_size {
        for x in 0..tile_size {
            let k = (y * tile_size + x) * 4;
            let r = f64::from(pixels[k]);
            let g = f64::from(pixels[k + 1]);
            let b = f64::from(pixels[k + 2]);
            terrain[y * grid_size + x] =
                ((r * 65_536.0 + g * 256.0 + b) / ELEVATION_DIVISOR - ELEVATION_OFFSET) as f32;
        }
    }

    // backfill the bottom and right borders
    for x in 0..grid_size - 1 {
        terrain[grid_size * (grid_size - 1) + x] = terrain[grid_size * (grid_size - 2) + x];
    }
    for y in 0..grid_size {
        terrain[grid_size * y + grid_size - 1] = terrain[grid_size * y + grid_size - 2];
    }

    Ok(terrain)
}
