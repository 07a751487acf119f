//! What the user has on hand: freshly detected ingredients plus pantry staples.
//!
//! Used to enforce that a recipe's missing list never names something the user
//! already has, and that every ingredient they don't have is listed.

use std::collections::HashSet;

use crate::models::{IngredientItem, Recipe};

/// Size, freshness and preparation words that do not change what an
/// ingredient is: "2 large eggs" is still "eggs".
const QUALIFIERS: &[&str] = &[
    "large", "small", "medium", "fresh", "freshly", "ripe", "raw", "organic", "whole", "extra",
    "virgin", "chopped", "diced", "minced", "sliced", "grated", "shredded", "crushed", "ground",
    "dried", "sea", "kosher", "of", "a", "some",
];

/// Detected ingredients and pantry staples, matched by normalized name
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    available: HashSet<String>,
}

impl Inventory {
    pub fn new<S: AsRef<str>>(detected: &[S], pantry: &[S]) -> Self {
        let available = detected
            .iter()
            .chain(pantry.iter())
            .map(|name| normalize(name.as_ref()))
            .filter(|key| !key.is_empty())
            .collect();
        Self { available }
    }

    /// An ingredient is available when its whole normalized name equals an
    /// inventory entry. "Eggs" covers "2 large eggs" and "Olive Oil" covers
    /// "extra virgin olive oil", but "Butter" does not cover "peanut butter".
    pub fn has(&self, ingredient: &str) -> bool {
        let key = normalize(ingredient);
        !key.is_empty() && self.available.contains(&key)
    }

    /// Recompute `missing_ingredients` from `ingredients`.
    ///
    /// Entries the generator listed as missing keep their order and quantity
    /// unless the user actually has them; unavailable ingredients it forgot are
    /// appended. Returns how many entries changed.
    pub fn reconcile(&self, recipe: &mut Recipe) -> usize {
        let before = recipe.missing_ingredients.len();
        recipe.missing_ingredients.retain(|item| !self.has(&item.name));
        let mut changed = before - recipe.missing_ingredients.len();

        let mut listed: HashSet<String> = recipe
            .missing_ingredients
            .iter()
            .map(|item| normalize(&item.name))
            .collect();

        let forgotten: Vec<IngredientItem> = recipe
            .ingredients
            .iter()
            .filter(|item| !self.has(&item.name))
            .filter(|item| listed.insert(normalize(&item.name)))
            .cloned()
            .collect();

        changed += forgotten.len();
        recipe.missing_ingredients.extend(forgotten);
        changed
    }
}

/// Lowercased singular words, without numbers or qualifiers, joined by spaces
fn normalize(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !w.chars().all(|c| c.is_ascii_digit()))
        .map(|w| singular(&w.to_lowercase()))
        .filter(|w| !QUALIFIERS.contains(&w.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn singular(word: &str) -> String {
    if word.len() > 3 && word.ends_with("oes") {
        word[..word.len() - 2].to_string()
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}
