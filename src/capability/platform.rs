/// Platform seams consumed by the coordinator
///
/// Each trait stands for one opaque platform surface. The coordinator only
/// ever talks to these, so tests can swap in scripted fakes and the desktop
/// build plugs in native dialogs and an external capture command.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::{Permission, PermissionStatus};
use crate::error::CapabilityError;
use crate::state::data::MediaRef;

/// Runtime permission system
#[async_trait]
pub trait PermissionSystem: Send + Sync {
    /// Current status of a single permission
    fn status(&self, permission: Permission) -> PermissionStatus;

    /// Whether an explanation should be shown before asking again
    fn should_show_rationale(&self, permission: Permission) -> bool;

    /// Show the platform prompt for a set of permissions.
    /// Returns granted/denied per requested permission.
    async fn request(&self, permissions: &[Permission]) -> HashMap<Permission, bool>;
}

/// Explanatory prompt shown before re-asking for a declined permission
#[async_trait]
pub trait RationalePrompt: Send + Sync {
    /// Returns true when the user accepts
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Camera capture surface
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Capture a single image into `destination`
    async fn capture(&self, destination: &Path) -> Result<(), CapabilityError>;
}

/// Content (gallery) picker surface
#[async_trait]
pub trait ContentPicker: Send + Sync {
    /// Returns the chosen item, or None when the user cancels
    async fn pick(&self, filter: &ContentFilter) -> Option<MediaRef>;
}

/// Content-type filter handed to the picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentFilter {
    /// Human-readable label shown in the picker
    pub label: String,
    /// MIME pattern, e.g. "image/*"
    pub mime: String,
    /// File extensions matching the MIME pattern (lowercase, no dot)
    pub extensions: Vec<String>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self {
            label: "Images".to_string(),
            mime: "image/*".to_string(),
            extensions: ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl ContentFilter {
    /// Check whether a path carries one of the filter's extensions
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }
}

/// Texts used by the rationale dialogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RationaleText {
    pub title: String,
    pub camera: String,
    pub location: String,
}

impl Default for RationaleText {
    fn default() -> Self {
        Self {
            title: "Permission required".to_string(),
            camera: "The app needs access to the camera to take photos.".to_string(),
            location: "The app needs access to your location to tag where photos were taken."
                .to_string(),
        }
    }
}

/// Bundle of platform surfaces handed to the coordinator at startup
#[derive(Clone)]
pub struct Platform {
    pub permissions: Arc<dyn PermissionSystem>,
    pub rationale: Arc<dyn RationalePrompt>,
    pub camera: Arc<dyn CameraDevice>,
    pub picker: Arc<dyn ContentPicker>,
}
