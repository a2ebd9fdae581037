use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::location::GeoLocation;

/// Scooters placed around the user when the map opens.
pub const DEFAULT_FLEET_SIZE: u32 = 6;

/// Maximum offset, in degrees per axis, of a simulated scooter from the user.
pub const MAX_JITTER_DEG: f64 = 0.002;

/// A simulated scooter marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scooter {
    pub id: u32,
    pub location: GeoLocation,
    pub battery_percent: u8,
}

impl Scooter {
    pub fn label(&self) -> String {
        format!("Scooter #{}", self.id)
    }
}

/// Scatter `count` scooters around `center`, ids starting at 1.
pub fn spawn_fleet<R: Rng>(center: GeoLocation, count: u32, rng: &mut R) -> Vec<Scooter> {
    (1..=count)
        .map(|id| Scooter {
            id,
            location: center.offset(
                rng.gen_range(-MAX_JITTER_DEG..=MAX_JITTER_DEG),
                rng.gen_range(-MAX_JITTER_DEG..=MAX_JITTER_DEG),
            ),
            battery_percent: rng.gen_range(50..=99),
        })
        .collect()
}

/// Fleet sorted by distance from `from`, closest first, each paired with its distance in km.
pub fn nearest_first<'a>(fleet: &'a [Scooter], from: &GeoLocation) -> Vec<(&'a Scooter, f64)> {
    let mut ranked: Vec<_> = fleet
        .iter()
        .map(|s| (s, from.distance_km(&s.location)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}
