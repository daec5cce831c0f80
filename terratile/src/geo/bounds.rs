//! Culling volumes for terrain tiles.

use glam::{DMat3, DVec3};

use super::ellipsoid::Ellipsoid;
use super::rectangle::Rectangle;

/// Radius of the sphere used when a tile is too wide for a useful oriented
/// bounding box (covers the whole globe including the highest terrain).
pub const GLOBE_BOUNDING_RADIUS: f64 = 6_379_792.481_506_292;

/// A box with arbitrary orientation, described by its centre and half-axes.
///
/// The columns of `half_axes` point from the centre to the middle of each
/// face pair; their lengths are the half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBoundingBox {
    pub center: DVec3,
    pub half_axes: DMat3,
}

impl OrientedBoundingBox {
    /// Computes a bounding box for the terrain between `minimum_height` and
    /// `maximum_height` over a geographic rectangle.
    ///
    /// The box is aligned to the east-north-up frame at the rectangle's
    /// centre; corner and edge-midpoint samples at both height bounds fix
    /// the extents. Only meaningful for rectangles narrower than a right
    /// angle.
    pub fn from_rectangle(
        rectangle: &Rectangle,
        minimum_height: f64,
        maximum_height: f64,
        ellipsoid: &Ellipsoid,
    ) -> Self {
        let (center_lon, center_lat) = rectangle.center();
        let origin = ellipsoid.cartographic_to_cartesian(center_lon, center_lat, 0.0);
        let up = ellipsoid.geodetic_surface_normal(center_lon, center_lat);
        let east = DVec3::new(-center_lon.sin(), center_lon.cos(), 0.0);
        let north = up.cross(east).normalize();

        let longitudes = [rectangle.west, center_lon, rectangle.east];
        let latitudes = [rectangle.south, center_lat, rectangle.north];

        let mut low = DVec3::splat(f64::INFINITY);
        let mut high = DVec3::splat(f64::NEG_INFINITY);
        for height in [minimum_height, maximum_height] {
            for longitude in longitudes {
                for latitude in latitudes {
                    let sample = ellipsoid.cartographic_to_cartesian(longitude, latitude, height)
                        - origin;
                    let local = DVec3::new(east.dot(sample), north.dot(sample), up.dot(sample));
                    low = low.min(local);
                    high = high.max(local);
                }
            }
        }

        let mid = (low + high) * 0.5;
        let half = (high - low) * 0.5;
        let center = origin + east * mid.x + north * mid.y + up * mid.z;
        let half_axes = DMat3::from_cols(east * half.x, north * half.y, up * half.z);
        Self { center, half_axes }
    }
}

/// A sphere described by its centre and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    /// The tightest sphere enclosing an oriented bounding box.
    pub fn from_oriented_bounding_box(obb: &OrientedBoundingBox) -> Self {
        let u = obb.half_axes.col(0);
        let v = obb.half_axes.col(1);
        let w = obb.half_axes.col(2);
        Self {
            center: obb.center,
            radius: (u + v + w).length(),
        }
    }

    /// A sphere covering the entire globe, for near-global tiles.
    pub fn whole_globe() -> Self {
        Self {
            center: DVec3::ZERO,
            radius: GLOBE_BOUNDING_RADIUS,
        }
    }
}
