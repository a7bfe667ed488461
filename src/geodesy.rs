/// Great-circle distance on a spherical Earth
///
/// `a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)`
/// `d = 2R · atan2(√a, √(1 − a))`

use geo::Point;

/// Earth radius used by the cleaner unless configured otherwise (meters).
pub const DEFAULT_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two points given in decimal degrees
/// (x = longitude, y = latitude).
pub fn haversine_distance(a: Point<f64>, b: Point<f64>, earth_radius_m: f64) -> f64 {
    let phi1 = a.y().to_radians();
    let phi2 = b.y().to_radians();
    let delta_phi = (b.y() - a.y()).to_radians();
    let delta_lambda = (b.x() - a.x()).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);

    // Rounding can push h a hair past 1.0 for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * earth_radius_m * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use geo::{point, HaversineDistance};

    #[test]
    fn test_identical_points() {
        let p = point!(x: 32.271152, y: 48.480512);
        assert_eq!(haversine_distance(p, p, DEFAULT_EARTH_RADIUS_M), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = point!(x: 0.0, y: 0.0);
        let b = point!(x: 0.0, y: 1.0);
        let expected = DEFAULT_EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        assert_approx_eq!(haversine_distance(a, b, DEFAULT_EARTH_RADIUS_M), expected, 1e-6);
    }

    #[test]
    fn test_antipodal_points() {
        let a = point!(x: 0.0, y: 0.0);
        let b = point!(x: 180.0, y: 0.0);
        let expected = DEFAULT_EARTH_RADIUS_M * std::f64::consts::PI;
        assert_approx_eq!(haversine_distance(a, b, DEFAULT_EARTH_RADIUS_M), expected, 1e-3);

        let north = point!(x: 10.0, y: 90.0);
        let south = point!(x: -170.0, y: -90.0);
        assert_approx_eq!(haversine_distance(north, south, DEFAULT_EARTH_RADIUS_M), expected, 1e-3);
    }

    #[test]
    fn test_symmetric() {
        let a = point!(x: 32.271152, y: 48.480512);
        let b = point!(x: 37.181908, y: 49.425864);
        assert_eq!(
            haversine_distance(a, b, DEFAULT_EARTH_RADIUS_M),
            haversine_distance(b, a, DEFAULT_EARTH_RADIUS_M)
        );
    }

    #[test]
    fn test_scales_with_radius() {
        let a = point!(x: 1.0, y: 1.0);
        let b = point!(x: 2.0, y: 3.0);
        let d1 = haversine_distance(a, b, 1000.0);
        let d2 = haversine_distance(a, b, 2000.0);
        assert_approx_eq!(d2, 2.0 * d1, 1e-9);
    }

    #[test]
    fn test_agrees_with_geo_crate() {
        // geo uses the mean radius 6371008.8 m
        let a = point!(x: 32.271152, y: 48.480512);
        let b = point!(x: 32.272446, y: 48.488948);
        let ours = haversine_distance(a, b, 6_371_008.8);
        let theirs = a.haversine_distance(&b);
        assert_approx_eq!(ours, theirs, 1e-6);
    }
}
