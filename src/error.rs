//! Error types
//!
//! None of these are ever shown to the user. Capability errors end a flow
//! silently, location errors degrade to fallback text, and configuration
//! errors fall back to defaults.

use thiserror::Error;

use crate::capability::CapabilityKind;

/// Why a capability request ended without delivering a result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The user declined the permission prompt
    #[error("{0} permission denied")]
    PermissionDenied(CapabilityKind),

    /// The user cancelled the rationale dialog
    #[error("{0} rationale dismissed")]
    RationaleDismissed(CapabilityKind),

    /// The user backed out of the capture or picker surface
    #[error("{0} cancelled")]
    Cancelled(CapabilityKind),

    /// A request of the same kind is still in flight
    #[error("a {0} request is already in progress")]
    Busy(CapabilityKind),

    /// The platform surface failed for reasons outside the user's control
    #[error("platform failure: {0}")]
    Platform(String),
}

/// Failures while resolving the device position to a place
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("geocoder failed: {0}")]
    Geocoder(String),
}

/// Failures while loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine the user configuration directory")]
    NoConfigDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_error_messages() {
        assert_eq!(
            CapabilityError::PermissionDenied(CapabilityKind::Camera).to_string(),
            "camera permission denied"
        );
        assert_eq!(
            CapabilityError::Busy(CapabilityKind::Gallery).to_string(),
            "a gallery request is already in progress"
        );
    }
}
