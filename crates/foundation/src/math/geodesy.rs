use crate::bounds::GeoBounds;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;

/// Ground resolution of a 256 px web mercator tile at the equator, zoom 0 (meters per pixel).
pub const EQUATOR_GROUND_RESOLUTION_M: f64 = 156_543.04;

/// Half-width, in degrees, of the box used to pick non-point features around a click.
pub const CLICK_BBOX_HALF_WIDTH_DEG: f64 = 0.005;

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `[lon, lat]`, the axis order geometry payloads use.
    pub fn lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Approximate ground-pixel scale (meters per pixel) at `lat_deg` and `zoom`.
///
/// Halves with every zoom level. Latitudes at or beyond the poles are the caller's
/// problem; the result there is zero or negative.
pub fn ground_resolution(lat_deg: f64, zoom: u8) -> f64 {
    EQUATOR_GROUND_RESOLUTION_M * lat_deg.to_radians().cos() / 2f64.powi(i32::from(zoom))
}

/// Square box of `half_width_deg` around `center`.
pub fn bbox_around(center: LatLon, half_width_deg: f64) -> GeoBounds {
    GeoBounds::new(
        [center.lon - half_width_deg, center.lat - half_width_deg],
        [center.lon + half_width_deg, center.lat + half_width_deg],
    )
}

#[cfg(test)]
mod tests {
    use super::{
        CLICK_BBOX_HALF_WIDTH_DEG, EQUATOR_GROUND_RESOLUTION_M, LatLon, WGS84_A, bbox_around,
        ground_resolution,
    };

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn equator_zoom_zero() {
        assert_close(ground_resolution(0.0, 0), 156_543.04, 1e-9);
    }

    #[test]
    fn constant_matches_wgs84_circumference() {
        let derived = 2.0 * std::f64::consts::PI * WGS84_A / 256.0;
        assert_close(EQUATOR_GROUND_RESOLUTION_M, derived, 0.01);
    }

    #[test]
    fn sixty_degrees_is_half_the_equator() {
        assert_close(ground_resolution(60.0, 3), ground_resolution(0.0, 3) * 0.5, 1e-9);
    }

    #[test]
    fn scale_at_zoom_ten_mid_latitude() {
        // 156543.04 * cos(37deg) / 1024
        assert_close(ground_resolution(37.0, 10), 122.0907, 1e-3);
    }

    #[test]
    fn click_box_is_centered() {
        let c = LatLon::new(37.0, -122.0);
        let b = bbox_around(c, CLICK_BBOX_HALF_WIDTH_DEG);
        assert_close(b.min[0], -122.005, 1e-12);
        assert_close(b.max[1], 37.005, 1e-12);
        assert!(b.contains(c));
        assert!(!b.contains(LatLon::new(37.0, -121.99)));
    }

    mod property_tests {
        use super::super::ground_resolution;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn halves_per_zoom_level(lat in -89.9..89.9_f64, zoom in 0u8..=28) {
                let here = ground_resolution(lat, zoom);
                let next = ground_resolution(lat, zoom + 1);
                prop_assert!((here - next * 2.0).abs() <= here.abs() * 1e-12 + 1e-12);
                prop_assert!(next <= here);
            }
        }
    }
}
