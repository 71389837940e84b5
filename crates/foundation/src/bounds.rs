use crate::geo::LatLng;

/// Geographic axis-aligned bounding box in degrees.
///
/// Longitude grows east, latitude grows north. `center()` is the arithmetic
/// midpoint of the extremes, matching the map widget's bounds center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    pub fn of_point(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            min_lon: lon_deg,
            max_lon: lon_deg,
            min_lat: lat_deg,
            max_lat: lat_deg,
        }
    }

    /// Grows the box to include the position.
    pub fn extend(&mut self, lon_deg: f64, lat_deg: f64) {
        self.min_lon = self.min_lon.min(lon_deg);
        self.max_lon = self.max_lon.max(lon_deg);
        self.min_lat = self.min_lat.min(lat_deg);
        self.max_lat = self.max_lat.max(lat_deg);
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) * 0.5,
            (self.min_lon + self.max_lon) * 0.5,
        )
    }

    pub fn span_lon(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn span_lat(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Folds a position into an optional running box.
///
/// Non-finite coordinates are skipped so one broken vertex cannot poison the
/// whole fold.
pub fn extend_bounds(acc: &mut Option<GeoBounds>, lon_deg: f64, lat_deg: f64) {
    if !lon_deg.is_finite() || !lat_deg.is_finite() {
        return;
    }
    match acc {
        Some(b) => b.extend(lon_deg, lat_deg),
        None => *acc = Some(GeoBounds::of_point(lon_deg, lat_deg)),
    }
}
