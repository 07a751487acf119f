//! Saved (favorite) recipes: full snapshots, newest first, keyed by id.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{KeyValueStore, FAVORITES_KEY};
use crate::errors::{error_logging, AppResult};
use crate::models::Recipe;
use crate::observability;

#[derive(Debug, Clone)]
pub struct SavedRecipes<S> {
    store: S,
}

impl<S: KeyValueStore> SavedRecipes<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Saved recipes, migrated to the current shape.
    ///
    /// A missing or corrupt document reads as empty; individual entries that
    /// cannot be migrated are skipped.
    pub fn get_saved_recipes(&self) -> Vec<Recipe> {
        let raw = match self.store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error_logging::log_storage_error(&e, "get_saved_recipes", FAVORITES_KEY);
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!("Saved recipes document is not a list; reading as empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "Saved recipes are corrupt; reading as empty");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(migrate_entry(entry)) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable saved recipe");
                    None
                }
            })
            .collect()
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.get_saved_recipes().iter().any(|r| r.id == id)
    }

    pub fn saved_ids(&self) -> Vec<String> {
        self.get_saved_recipes().into_iter().map(|r| r.id).collect()
    }

    /// Remove the recipe if a recipe with its id is saved, otherwise save it
    /// at the front. Returns the new collection.
    pub fn toggle_saved_recipe(&self, recipe: &Recipe) -> AppResult<Vec<Recipe>> {
        let mut saved = self.get_saved_recipes();
        let was_saved = saved.iter().any(|r| r.id == recipe.id);

        if was_saved {
            saved.retain(|r| r.id != recipe.id);
        } else {
            saved.insert(0, recipe.clone());
        }

        self.store.set(FAVORITES_KEY, &serde_json::to_string(&saved)?)?;
        observability::record_favorite_toggle(!was_saved);
        info!(id = %recipe.id, saved = !was_saved, "Saved recipes toggled");
        Ok(saved)
    }

    /// Replace the stored snapshot of a saved recipe, e.g. once its image exists.
    /// Does nothing when the recipe is not saved.
    pub fn update_saved_recipe(&self, recipe: &Recipe) -> AppResult<bool> {
        let mut saved = self.get_saved_recipes();
        let Some(slot) = saved.iter_mut().find(|r| r.id == recipe.id) else {
            return Ok(false);
        };
        *slot = recipe.clone();
        self.store.set(FAVORITES_KEY, &serde_json::to_string(&saved)?)?;
        debug!(id = %recipe.id, "Saved recipe snapshot updated");
        Ok(true)
    }
}

/// Bring a stored entry up to the current shape: bare-string ingredients
/// become `{name, quantity: ""}` and a missing missing-ingredients list becomes empty.
fn migrate_entry(mut entry: Value) -> Value {
    if let Value::Object(fields) = &mut entry {
        for key in ["ingredients", "missingIngredients"] {
            let migrated = match fields.remove(key) {
                Some(Value::Array(items)) => Value::Array(items.into_iter().map(migrate_ingredient).collect()),
                _ => Value::Array(Vec::new()),
            };
            fields.insert(key.to_string(), migrated);
        }
    }
    entry
}

fn migrate_ingredient(item: Value) -> Value {
    match item {
        Value::String(name) => serde_json::json!({ "name": name, "quantity": "" }),
        other => other,
    }
}
