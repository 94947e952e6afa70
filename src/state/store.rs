use chrono::Utc;
use log::info;

use super::data::PhotoRecord;

/// The PhotoStore holds every saved photo for the lifetime of the process.
/// Nothing is written to disk; records are gone on restart.
///
/// Only the UI event sequence touches the store, so it needs no locking.
#[derive(Default)]
pub struct PhotoStore {
    photos: Vec<PhotoRecord>,
    /// Last id handed out, in milliseconds since the epoch
    last_id: i64,
}

impl PhotoStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new record id from the current time.
    /// Two calls within the same millisecond still get distinct ids.
    pub fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }

    /// Append a record to the collection
    pub fn add_photo(&mut self, record: PhotoRecord) {
        debug_assert!(
            self.photos.iter().all(|p| p.id != record.id),
            "duplicate photo id {}",
            record.id
        );

        info!(
            "💾 Saved photo {} ({}) from {}",
            record.id, record.description, record.source
        );
        self.photos.push(record);
    }

    /// Get all photos in the order they were added
    pub fn get_all_photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    /// Get a count of photos in the store
    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

// Implement Debug without dumping every record
impl std::fmt::Debug for PhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoStore")
            .field("photo_count", &self.photos.len())
            .field("last_id", &self.last_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::MediaRef;
    use std::collections::HashSet;

    fn record(store: &mut PhotoStore, n: usize) -> PhotoRecord {
        PhotoRecord {
            id: store.next_id(),
            source: MediaRef::from_path(format!("/photos/{}.jpg", n)),
            description: format!("photo {}", n),
            location: String::new(),
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = PhotoStore::new();
        assert!(store.is_empty());
        assert!(store.get_all_photos().is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = PhotoStore::new();
        let added: Vec<PhotoRecord> = (0..50).map(|n| record(&mut store, n)).collect();

        for photo in &added {
            store.add_photo(photo.clone());
        }

        assert_eq!(store.photo_count(), 50);
        assert_eq!(store.get_all_photos(), added.as_slice());
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut store = PhotoStore::new();
        let ids: Vec<String> = (0..1000).map(|_| store.next_id()).collect();
        let unique: HashSet<&String> = ids.iter().collect();

        assert_eq!(unique.len(), ids.len());
        let numeric: Vec<i64> = ids.iter().map(|id| id.parse().unwrap()).collect();
        assert!(numeric.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_read_view_is_a_snapshot() {
        let mut store = PhotoStore::new();
        let first = record(&mut store, 1);
        store.add_photo(first);

        let before = store.get_all_photos().to_vec();
        let second = record(&mut store, 2);
        store.add_photo(second);

        assert_eq!(before.len(), 1);
        assert_eq!(store.get_all_photos().len(), 2);
    }
}
