/// Offline reverse geocoder
///
/// Looks up the nearest known place in a table loaded from a JSON file:
///
/// ```json
/// [
///   { "latitude": 41.3874, "longitude": 2.1686,
///     "locality": "Barcelona", "admin_area": "Catalonia", "country": "Spain" }
/// ]
/// ```
///
/// A position farther than `max_distance_km` from every place has no match.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::task;

use super::{Address, Geocoder, Position};
use crate::error::LocationError;

/// Mean Earth radius used by the haversine formula
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Default search radius around a position
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 25.0;

/// One row of the place table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub address: Address,
}

impl Place {
    fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone)]
pub struct PlaceTable {
    places: Arc<Vec<Place>>,
    max_distance_km: f64,
}

impl PlaceTable {
    pub fn new(places: Vec<Place>, max_distance_km: f64) -> Self {
        Self {
            places: Arc::new(places),
            max_distance_km,
        }
    }

    /// A table that never matches, so every lookup falls back to coordinates
    pub fn empty() -> Self {
        Self::new(Vec::new(), DEFAULT_MAX_DISTANCE_KM)
    }

    /// Load a place table from a JSON file
    pub fn load(path: &Path, max_distance_km: f64) -> Result<Self, LocationError> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::new(serde_json::from_str(&json)?, max_distance_km);

        info!("🗺️  Loaded {} places from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Nearest place within the search radius
    pub fn nearest(&self, position: Position) -> Option<&Place> {
        self.places
            .iter()
            .map(|place| (haversine_km(position, place.position()), place))
            .filter(|(distance, _)| *distance <= self.max_distance_km)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, place)| place)
    }
}

#[async_trait]
impl Geocoder for PlaceTable {
    async fn reverse(&self, position: Position) -> Result<Option<Address>, LocationError> {
        // Cloning shares the places; the linear scan stays off the UI executor
        let table = self.clone();
        task::spawn_blocking(move || table.nearest(position).map(|place| place.address.clone()))
        .await
        .map_err(|e| LocationError::Geocoder(format!("Task join error: {}", e)))
    }
}

/// Great-circle distance between two positions
fn haversine_km(a: Position, b: Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
