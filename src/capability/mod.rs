/// Capability coordination module
///
/// This module bridges UI intent ("take a photo", "pick from the gallery",
/// "enable location") to platform permission and capture primitives:
/// - Platform seams as traits (platform.rs)
/// - The per-kind request state machine (coordinator.rs)
/// - Desktop implementations of the seams (desktop.rs)

pub mod coordinator;
pub mod desktop;
pub mod platform;

#[cfg(test)]
pub(crate) mod fakes;

pub use coordinator::Coordinator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of capability a user action can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Camera,
    Gallery,
    LocationPermission,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapabilityKind::Camera => "camera",
            CapabilityKind::Gallery => "gallery",
            CapabilityKind::LocationPermission => "location",
        };
        f.write_str(name)
    }
}

/// Runtime permissions known to the permission system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Camera,
    FineLocation,
    CoarseLocation,
}

/// Current answer of the permission system for one permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    NotDetermined,
}

/// Where a capability request currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    PermissionCheck,
    ShowingRationale,
    RequestingPermission,
    Launching,
}

/// Precision of a successful location permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationGrant {
    /// Fine location was granted (coarse may or may not have been)
    Fine,
    /// Only coarse location was granted
    Coarse,
}
