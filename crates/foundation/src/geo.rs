/// Geographic position in degrees.
///
/// Latitude first, matching the map widget's camera API. GeoJSON positions
/// arrive as `[lon, lat]`; the conversion happens at the bounds fold.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub lat_deg: f64,
    pub lng_deg: f64,
}

impl LatLng {
    pub const fn new(lat_deg: f64, lng_deg: f64) -> Self {
        Self { lat_deg, lng_deg }
    }
}

/// Wraps a longitude into [-180, 180).
pub fn wrap_lon_deg(mut lon: f64) -> f64 {
    lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
    lon
}

#[cfg(test)]
mod tests {
    use super::{LatLng, wrap_lon_deg};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn wrap_keeps_in_range_values() {
        assert_close(wrap_lon_deg(113.5), 113.5, 1e-12);
        assert_close(wrap_lon_deg(-8.2), -8.2, 1e-12);
        assert_close(wrap_lon_deg(-180.0), -180.0, 1e-12);
    }

    #[test]
    fn wrap_folds_out_of_range_values() {
        assert_close(wrap_lon_deg(190.0), -170.0, 1e-12);
        assert_close(wrap_lon_deg(-190.0), 170.0, 1e-12);
        assert_close(wrap_lon_deg(540.0), 180.0 - 360.0, 1e-12);
    }

    #[test]
    fn latlng_is_lat_first() {
        let p = LatLng::new(-8.16666648, 113.50000106);
        assert_close(p.lat_deg, -8.16666648, 1e-12);
        assert_close(p.lng_deg, 113.50000106, 1e-12);
    }
}
