//! Reference ellipsoid math.
//!
//! Positions are Earth-centred, Earth-fixed cartesian coordinates in
//! metres. Cartographic inputs are geodetic longitude/latitude in radians.

use glam::DVec3;

/// An ellipsoid of revolution centred at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    radii: DVec3,
    radii_squared: DVec3,
    one_over_radii: DVec3,
}

impl Ellipsoid {
    /// The WGS84 reference ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid {
        radii: DVec3::new(6_378_137.0, 6_378_137.0, 6_356_752.314_245_179),
        radii_squared: DVec3::new(
            40_680_631_590_769.0,
            40_680_631_590_769.0,
            40_408_299_984_661.445,
        ),
        one_over_radii: DVec3::new(
            1.567_855_942_887_398e-7,
            1.567_855_942_887_398e-7,
            1.573_130_351_105_623e-7,
        ),
    };

    /// Returns the largest of the three radii, in metres.
    pub fn maximum_radius(&self) -> f64 {
        self.radii.x.max(self.radii.y).max(self.radii.z)
    }

    /// Returns the outward unit normal of the surface below a cartographic
    /// position.
    pub fn geodetic_surface_normal(&self, longitude: f64, latitude: f64) -> DVec3 {
        let cos_latitude = latitude.cos();
        DVec3::new(
            cos_latitude * longitude.cos(),
            cos_latitude * longitude.sin(),
            latitude.sin(),
        )
    }

    /// Converts a cartographic position (radians, metres) to cartesian.
    pub fn cartographic_to_cartesian(&self, longitude: f64, latitude: f64, height: f64) -> DVec3 {
        let normal = self.geodetic_surface_normal(longitude, latitude);
        let k = self.radii_squared * normal;
        let gamma = normal.dot(k).sqrt();
        k / gamma + normal * height
    }

    /// Scales a cartesian position into the unit-sphere space of this
    /// ellipsoid (componentwise division by the radii).
    pub fn transform_position_to_scaled_space(&self, position: DVec3) -> DVec3 {
        position * self.one_over_radii
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_maximum_radius_is_equatorial() {
        assert_eq!(Ellipsoid::WGS84.maximum_radius(), 6_378_137.0);
    }

    #[test]
    fn test_surface_point_on_equator() {
        let p = Ellipsoid::WGS84.cartographic_to_cartesian(0.0, 0.0, 0.0);
        assert!((p.x - 6_378_137.0).abs() < EPSILON);
        assert!(p.y.abs() < EPSILON);
        assert!(p.z.abs() < EPSILON);
    }

    #[test]
    fn test_surface_point_at_pole() {
        let p = Ellipsoid::WGS84.cartographic_to_cartesian(0.0, std::f64::consts::FRAC_PI_2, 0.0);
        assert!(p.x.abs() < 1e-3);
        assert!((p.z - 6_356_752.314_245_179).abs() < 1e-3);
    }

    #[test]
    fn test_height_moves_along_normal() {
        let ellipsoid = Ellipsoid::WGS84;
        let surface = ellipsoid.cartographic_to_cartesian(0.5, 0.5, 0.0);
        let raised = ellipsoid.cartographic_to_cartesian(0.5, 0.5, 1000.0);
        assert!(((raised - surface).length() - 1000.0).abs() < EPSILON);
    }

    #[test]
    fn test_scaled_space_maps_surface_to_unit_sphere() {
        let ellipsoid = Ellipsoid::WGS84;
        let p = ellipsoid.cartographic_to_cartesian(1.2, -0.7, 0.0);
        let scaled = ellipsoid.transform_position_to_scaled_space(p);
        assert!((scaled.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_surface_normal_is_unit_length() {
        let n = Ellipsoid::WGS84.geodetic_surface_normal(2.1, -1.0);
        assert!((n.length() - 1.0).abs() < 1e-12);
    }
}
