//! Local key-value persistence for ratings and saved recipes.
//!
//! Two independent documents live under fixed keys and are rewritten whole on
//! every mutation (read-modify-write). The backing store only needs to map a
//! key to a string.

pub mod favorites;
pub mod file;
pub mod memory;
pub mod ratings;

use crate::errors::AppResult;

pub use favorites::SavedRecipes;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use ratings::RatingsStore;

/// Key of the title -> ratings document
pub const RATINGS_KEY: &str = "chefsnap_ratings";
/// Key of the saved recipes document
pub const FAVORITES_KEY: &str = "chefsnap_favorites";

/// A string-valued key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        (**self).set(key, value)
    }
}
