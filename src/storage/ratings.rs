//! Per-title star ratings.
//!
//! Stored as `{ "<title>": [5, 3, ...] }`. Every submission is appended; the
//! same title may be rated any number of times.

use std::collections::BTreeMap;
use tracing::{info, warn};

use super::{KeyValueStore, RATINGS_KEY};
use crate::errors::{error_logging, AppError, AppResult};
use crate::observability;

pub type RatingsMap = BTreeMap<String, Vec<u8>>;

/// Rating aggregation over a key-value store
#[derive(Debug, Clone)]
pub struct RatingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> RatingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All ratings; a missing or unreadable document reads as empty
    pub fn get_ratings(&self) -> RatingsMap {
        let raw = match self.store.get(RATINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RatingsMap::new(),
            Err(e) => {
                error_logging::log_storage_error(&e, "get_ratings", RATINGS_KEY);
                return RatingsMap::new();
            }
        };

        match serde_json::from_str::<RatingsMap>(&raw) {
            Ok(ratings) => ratings,
            Err(e) => {
                warn!(error = %e, "Stored ratings are corrupt; reading as empty");
                RatingsMap::new()
            }
        }
    }

    /// Append one rating (1 to 5) for `title`
    pub fn save_rating(&self, title: &str, rating: u8) -> AppResult<()> {
        if !(1..=5).contains(&rating) {
            let err = AppError::Validation(format!("Rating must be between 1 and 5, got {}", rating));
            error_logging::log_validation_error(&err, "save_rating", "rating", Some(&rating.to_string()));
            return Err(err);
        }

        let mut ratings = self.get_ratings();
        ratings.entry(title.to_string()).or_default().push(rating);
        self.store.set(RATINGS_KEY, &serde_json::to_string(&ratings)?)?;

        observability::record_rating(rating);
        info!(title, rating, "Rating saved");
        Ok(())
    }

    /// Mean rating rounded to one decimal, `None` when unrated
    pub fn average_rating(&self, title: &str) -> Option<f64> {
        let ratings = self.get_ratings();
        let list = ratings.get(title).filter(|list| !list.is_empty())?;
        let sum: u32 = list.iter().map(|&r| u32::from(r)).sum();
        let average = f64::from(sum) / list.len() as f64;
        Some((average * 10.0).round() / 10.0)
    }

    pub fn rating_count(&self, title: &str) -> usize {
        self.get_ratings().get(title).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_average_and_count() {
        let ratings = RatingsStore::new(MemoryStore::new());
        assert_eq!(ratings.average_rating("Soup"), None);
        assert_eq!(ratings.rating_count("Soup"), 0);

        ratings.save_rating("Soup", 5).unwrap();
        ratings.save_rating("Soup", 3).unwrap();
        assert_eq!(ratings.average_rating("Soup"), Some(4.0));
        assert_eq!(ratings.rating_count("Soup"), 2);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let ratings = RatingsStore::new(MemoryStore::new());
        for r in [5, 4, 4] {
            ratings.save_rating("Pie", r).unwrap();
        }
        assert_eq!(ratings.average_rating("Pie"), Some(4.3));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let ratings = RatingsStore::new(MemoryStore::new());
        assert!(matches!(ratings.save_rating("Soup", 0), Err(AppError::Validation(_))));
        assert!(ratings.save_rating("Soup", 6).is_err());
        assert!(ratings.get_ratings().is_empty());
    }

    #[test]
    fn test_corrupt_document_reads_empty() {
        let store = MemoryStore::new().with_entry(RATINGS_KEY, "{not json");
        let ratings = RatingsStore::new(store);
        assert!(ratings.get_ratings().is_empty());

        // The next save overwrites the corrupt document
        ratings.save_rating("Soup", 4).unwrap();
        assert_eq!(ratings.rating_count("Soup"), 1);
    }
}
