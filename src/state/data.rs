/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the capability layer, the screen flow and the UI layer.

use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque reference to platform-owned image bytes.
/// The app never reads or copies the bytes itself, only hands the
/// reference to whatever renders it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRef(PathBuf);

impl MediaRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Represents a single saved photo
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRecord {
    /// Unique, timestamp-derived id (milliseconds since the epoch)
    pub id: String,
    /// Where the image bytes live
    pub source: MediaRef,
    /// Free-form description typed by the user
    pub description: String,
    /// Human-readable place or raw "lat, lon" text
    pub location: String,
}
