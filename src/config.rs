/// Application configuration
///
/// Read once at startup from a JSON file. Every field has a default, so a
/// missing file, a missing field or an empty object all give a working app.
///
/// The file lives at `$PHOTO_GALLERY_CONFIG` if set, otherwise:
/// - Linux: ~/.config/photo-gallery/config.json
/// - macOS: ~/Library/Application Support/photo-gallery/config.json
/// - Windows: %APPDATA%\photo-gallery\config.json

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capability::platform::{ContentFilter, RationaleText};
use crate::capability::Permission;
use crate::error::ConfigError;
use crate::location::geocoder::DEFAULT_MAX_DISTANCE_KM;
use crate::location::Position;

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV: &str = "PHOTO_GALLERY_CONFIG";

/// Placeholder in the camera command replaced by the destination path
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Where captured photos are written (None = user cache directory)
    pub capture_dir: Option<PathBuf>,

    /// Program and arguments that capture one still image.
    /// `{output}` is replaced by the destination file path.
    pub camera_command: Vec<String>,

    /// What the gallery picker offers
    pub picker: ContentFilter,

    /// Texts shown before re-asking for a declined permission
    pub rationale: RationaleText,

    /// Permissions treated as already granted at startup
    pub granted_permissions: Vec<Permission>,

    pub location: LocationConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    /// Last known position of this machine, if any
    pub last_known: Option<Position>,

    /// JSON place table for offline reverse geocoding
    pub places_file: Option<PathBuf>,

    /// Search radius around the position, in kilometres
    pub max_distance_km: f64,

    /// Grant coarse location only, even when fine is requested
    pub approximate_only: bool,

    /// Re-run the place lookup after location access is granted from Preview
    pub retry_lookup_after_grant: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capture_dir: None,
            camera_command: vec![
                "fswebcam".to_string(),
                "--no-banner".to_string(),
                OUTPUT_PLACEHOLDER.to_string(),
            ],
            picker: ContentFilter::default(),
            rationale: RationaleText::default(),
            granted_permissions: Vec::new(),
            location: LocationConfig::default(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            last_known: None,
            places_file: None,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            approximate_only: false,
            retry_lookup_after_grant: false,
        }
    }
}

impl AppConfig {
    /// Load the configuration from its standard location.
    /// A missing file is not an error and yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load the configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!("⚙️  Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the path where the configuration file should be
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("photo-gallery");
        path.push("config.json");
        Ok(path)
    }

    /// Directory for camera captures
    /// Returns ~/.cache/photo-gallery/captures on Linux unless configured
    pub fn capture_dir(&self) -> PathBuf {
        if let Some(dir) = &self.capture_dir {
            return dir.clone();
        }

        let mut path = dirs_next::cache_dir()
            .or_else(dirs_next::home_dir)
            .unwrap_or_else(std::env::temp_dir);
        path.push("photo-gallery");
        path.push("captures");
        path
    }

    /// Convert to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
