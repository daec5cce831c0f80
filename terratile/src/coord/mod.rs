//! Tile addressing and the Web Mercator tiling scheme.
//!
//! Tiles are addressed XYZ-style (`y` grows southward); sources that serve
//! TMS layouts are reconciled through [`TileCoord::reverse_y`]. The tiling
//! scheme maps tile addresses to geographic rectangles with a single tile
//! covering the world at level zero.

mod types;

pub use types::{CoordError, TileCoord, MAX_ZOOM, MIN_ZOOM};

use crate::geo::Rectangle;
use std::f64::consts::PI;

/// Web Mercator tiling scheme with one tile at level zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercatorTilingScheme;

impl WebMercatorTilingScheme {
    /// Number of tiles along each axis at `level`.
    pub fn tiles_at_level(&self, level: u8) -> u32 {
        1u32 << level
    }

    /// Geographic rectangle covered by a tile, bounds in radians.
    ///
    /// Longitude is linear in the Mercator x axis; latitude comes from the
    /// inverse Mercator projection of the tile's row bounds.
    pub fn tile_rectangle(&self, coord: TileCoord) -> Rectangle {
        let tile_span = 2.0 * PI / f64::from(self.tiles_at_level(coord.z));
        let west = -PI + f64::from(coord.x) * tile_span;
        let east = west + tile_span;
        let mercator_north = PI - f64::from(coord.y) * tile_span;
        let mercator_south = mercator_north - tile_span;
        Rectangle::new(
            west,
            mercator_to_latitude(mercator_south),
            east,
            mercator_to_latitude(mercator_north),
        )
    }
}

/// Inverse Mercator projection on the unit sphere.
fn mercator_to_latitude(y: f64) -> f64 {
    2.0 * y.exp().atan() - PI / 2.0
}
