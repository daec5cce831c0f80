//! Ellipsoid geometry and culling volumes.
//!
//! Everything the tile orchestrator needs to place a tile on the globe:
//! cartographic-to-cartesian conversion, per-tile bounding volumes, the
//! horizon-occlusion point used by renderer-side culling, and the geometric
//! error budget for a zoom level.

mod bounds;
mod ellipsoid;
mod rectangle;

pub use bounds::{BoundingSphere, OrientedBoundingBox, GLOBE_BOUNDING_RADIUS};
pub use ellipsoid::Ellipsoid;
pub use rectangle::Rectangle;

use glam::DVec3;
use std::f64::consts::PI;

/// Sample width of the heightmap the level-zero error estimate assumes.
const HEIGHTMAP_ESTIMATE_WIDTH: f64 = 65.0;

/// Empirical quality factor of heightmap-derived terrain.
const HEIGHTMAP_TERRAIN_QUALITY: f64 = 0.25;

/// Estimated maximum geometric error at tiling-scheme level zero, in
/// metres, for a 65-sample heightmap tile.
pub fn level_zero_geometric_error(ellipsoid: &Ellipsoid, tiles_at_level_zero: u32) -> f64 {
    ellipsoid.maximum_radius() * 2.0 * PI * HEIGHTMAP_TERRAIN_QUALITY
        / (HEIGHTMAP_ESTIMATE_WIDTH * f64::from(tiles_at_level_zero))
}

/// Point against which the renderer tests horizon occlusion for a tile.
///
/// Built from the tile centre in ellipsoid-scaled space with the maximum
/// terrain height corrected by the cosine of the half tile width, so the
/// whole tile is hidden only when every part of it is below the horizon.
pub fn horizon_occlusion_point(
    ellipsoid: &Ellipsoid,
    rectangle: &Rectangle,
    tile_center: DVec3,
    maximum_height: f64,
) -> DVec3 {
    let scaled = ellipsoid.transform_position_to_scaled_space(tile_center);
    let ellipsoid_height = maximum_height / ellipsoid.maximum_radius();
    let occlusion_height = (1.0 + ellipsoid_height) / (rectangle.width() / 2.0).cos();
    DVec3::new(scaled.x, scaled.y, occlusion_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_zero_error_for_single_root_tile() {
        let error = level_zero_geometric_error(&Ellipsoid::WGS84, 1);
        // 2π · 6378137 · 0.25 / 65
        assert!((error - 154_134.68).abs() < 0.1);
    }

    #[test]
    fn test_level_zero_error_scales_with_tile_count() {
        let one = level_zero_geometric_error(&Ellipsoid::WGS84, 1);
        let two = level_zero_geometric_error(&Ellipsoid::WGS84, 2);
        assert!((one / two - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_occlusion_point_above_unit_sphere() {
        let ellipsoid = Ellipsoid::WGS84;
        let rect = Rectangle::new(0.0, 0.0, 0.01, 0.01);
        let (lon, lat) = rect.center();
        let center = ellipsoid.cartographic_to_cartesian(lon, lat, 0.0);
        let point = horizon_occlusion_point(&ellipsoid, &rect, center, 1000.0);
        // taller terrain pushes the z component further out
        assert!(point.z > 1.0);
        let lower = horizon_occlusion_point(&ellipsoid, &rect, center, 0.0);
        assert!(point.z > lower.z);
    }
}
