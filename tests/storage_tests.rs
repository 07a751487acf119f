mod test_helpers;

use chef_snap::storage::{JsonFileStore, KeyValueStore, RatingsStore, SavedRecipes, FAVORITES_KEY, RATINGS_KEY};
use std::fs;
use tempfile::TempDir;
use test_helpers::sample_recipe;

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::open(dir.path().join("data")).expect("Failed to open store")
    }

    #[test]
    fn test_file_store_roundtrip_and_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        assert_eq!(store.get("nothing_here").unwrap(), None);
        store.set("greeting", "\"hello\"").unwrap();
        assert_eq!(store.get("greeting").unwrap().as_deref(), Some("\"hello\""));
        assert!(store.dir().join("greeting.json").exists());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert!(store.set("../escape", "{}").is_err());
        assert!(store.get("").is_err());
    }

    /// Ratings survive reopening the store
    #[test]
    fn test_ratings_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let ratings = RatingsStore::new(open_store(&dir));
            ratings.save_rating("Spinach Omelette", 5).unwrap();
            ratings.save_rating("Spinach Omelette", 3).unwrap();
        }

        let ratings = RatingsStore::new(open_store(&dir));
        assert_eq!(ratings.average_rating("Spinach Omelette"), Some(4.0));
        assert_eq!(ratings.rating_count("Spinach Omelette"), 2);
        assert_eq!(ratings.average_rating("Green Shakshuka"), None);
    }

    #[test]
    fn test_corrupt_ratings_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        fs::write(dir.path().join("data").join(format!("{}.json", RATINGS_KEY)), "[[[").unwrap();

        let ratings = RatingsStore::new(store);
        assert!(ratings.get_ratings().is_empty());
        assert_eq!(ratings.rating_count("Anything"), 0);
    }

    /// Toggling the same recipe twice restores the original collection
    #[test]
    fn test_toggle_twice_restores() {
        let dir = TempDir::new().unwrap();
        let favorites = SavedRecipes::new(open_store(&dir));
        let first = sample_recipe("r1", "Spinach Omelette", 3, &[]);
        let second = sample_recipe("r2", "Green Shakshuka", 2, &["Feta"]);

        favorites.toggle_saved_recipe(&first).unwrap();
        let before = favorites.get_saved_recipes();

        let saved = favorites.toggle_saved_recipe(&second).unwrap();
        assert_eq!(saved[0].id, "r2");
        assert!(favorites.is_saved("r2"));

        let after = favorites.toggle_saved_recipe(&second).unwrap();
        assert_eq!(after, before);
        assert_eq!(favorites.saved_ids(), vec!["r1".to_string()]);
    }

    /// Entries written by older versions, with plain string ingredients, still load
    #[test]
    fn test_legacy_favorites_are_migrated() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let legacy = r#"[{
            "id": "old-1",
            "title": "Tomato Soup",
            "ingredients": ["Tomatoes", "Basil"],
            "steps": ["Simmer", "Blend"]
        }]"#;
        store.set(FAVORITES_KEY, legacy).unwrap();

        let favorites = SavedRecipes::new(store);
        let saved = favorites.get_saved_recipes();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].ingredients[0].name, "Tomatoes");
        assert_eq!(saved[0].ingredients[0].quantity, "");
        assert!(saved[0].missing_ingredients.is_empty());
    }

    #[test]
    fn test_update_saved_snapshot() {
        let dir = TempDir::new().unwrap();
        let favorites = SavedRecipes::new(open_store(&dir));
        let mut recipe = sample_recipe("r1", "Spinach Omelette", 3, &[]);

        assert!(!favorites.update_saved_recipe(&recipe).unwrap());
        favorites.toggle_saved_recipe(&recipe).unwrap();

        recipe.image_url = Some("data:image/png;base64,AAAA".to_string());
        assert!(favorites.update_saved_recipe(&recipe).unwrap());
        assert!(favorites.get_saved_recipes()[0].has_image());
    }
}
