/// Location lookup module
///
/// Best-effort translation of the device's last known position into a
/// human-readable place for the Preview screen:
/// - Position source (provider.rs)
/// - Offline reverse geocoding (geocoder.rs)
///
/// Nothing here ever fails loudly. No fix means no result; a fix without
/// a matching place falls back to raw coordinates.

pub mod geocoder;
pub mod provider;

pub use geocoder::PlaceTable;
pub use provider::FixedLocation;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::LocationError;

/// A position fix in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Fallback text when no place matches, e.g. "40.4168, -3.7038".
    /// Whole degrees keep their decimal point ("10.0").
    pub fn coordinate_text(&self) -> String {
        format!("{:?}, {:?}", self.latitude, self.longitude)
    }
}

/// Address-like result of reverse geocoding
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub locality: Option<String>,
    pub admin_area: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// "City, Region, Country" with placeholders for the missing parts
    pub fn place_text(&self) -> String {
        format!(
            "{}, {}, {}",
            self.locality.as_deref().unwrap_or("Unknown locality"),
            self.admin_area.as_deref().unwrap_or("Unknown region"),
            self.country.as_deref().unwrap_or("Unknown country"),
        )
    }
}

/// Last-known-location provider
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn last_known(&self) -> Result<Option<Position>, LocationError>;
}

/// Reverse geocoding service: zero or one address per position
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, position: Position) -> Result<Option<Address>, LocationError>;
}

/// Glue between the position provider and the geocoder
#[derive(Clone)]
pub struct LocationLookup {
    provider: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationLookup {
    pub fn new(provider: Arc<dyn LocationProvider>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { provider, geocoder }
    }

    /// Resolve the last known position to display text.
    /// Returns None only when there is no position at all.
    pub async fn resolve_place(&self) -> Option<String> {
        let fix = match self.provider.last_known().await {
            Ok(Some(fix)) => fix,
            Ok(None) => {
                debug!("No last known position");
                return None;
            }
            Err(err) => {
                warn!("⚠️  Position unavailable: {}", err);
                return None;
            }
        };

        match self.geocoder.reverse(fix).await {
            Ok(Some(address)) => Some(address.place_text()),
            Ok(None) => {
                debug!("No place near {}", fix.coordinate_text());
                Some(fix.coordinate_text())
            }
            Err(err) => {
                warn!("⚠️  Reverse geocoding failed: {}", err);
                Some(fix.coordinate_text())
            }
        }
    }
}
