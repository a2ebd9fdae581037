use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Shift by the given number of degrees on each axis.
    pub fn offset(&self, d_latitude: f64, d_longitude: f64) -> Self {
        Self::new(self.latitude + d_latitude, self.longitude + d_longitude)
    }

    /// Haversine distance in kilometers between two points.
    pub fn distance_km(&self, other: &GeoLocation) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }
}

/// Visible map area: a center plus the span shown on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: GeoLocation,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub const DEFAULT_DELTA: f64 = 0.01;

    pub fn around(center: GeoLocation) -> Self {
        Self {
            center,
            latitude_delta: Self::DEFAULT_DELTA,
            longitude_delta: Self::DEFAULT_DELTA,
        }
    }

    pub fn contains(&self, point: &GeoLocation) -> bool {
        (point.latitude - self.center.latitude).abs() <= self.latitude_delta / 2.0
            && (point.longitude - self.center.longitude).abs() <= self.longitude_delta / 2.0
    }
}
