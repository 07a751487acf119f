//! Recipe browsing: search, card summaries, share text and lazy dish photos.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashSet;

use crate::gateway::ImagePayload;
use crate::localization::LocalizationManager;
use crate::models::Recipe;

/// Free-text search over titles/tags plus an ingredient-name filter.
/// Empty terms match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseQuery {
    pub search: String,
    pub ingredient: String,
}

impl BrowseQuery {
    pub fn new(search: impl Into<String>, ingredient: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ingredient: ingredient.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.ingredient.trim().is_empty()
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        let search = self.search.trim().to_lowercase();
        let ingredient = self.ingredient.trim().to_lowercase();

        let matches_search = search.is_empty()
            || recipe.title.to_lowercase().contains(&search)
            || recipe.tags.iter().any(|tag| tag.to_lowercase().contains(&search));

        let matches_ingredient = ingredient.is_empty()
            || recipe
                .ingredients
                .iter()
                .any(|item| item.name.to_lowercase().contains(&ingredient));

        matches_search && matches_ingredient
    }

    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        recipes.iter().filter(|recipe| self.matches(recipe)).collect()
    }
}

/// What the card says about missing ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSummary {
    HaveEverything,
    ItemsNeeded(usize),
}

impl MissingSummary {
    pub fn for_recipe(recipe: &Recipe) -> Self {
        match recipe.missing_ingredients.len() {
            0 => MissingSummary::HaveEverything,
            n => MissingSummary::ItemsNeeded(n),
        }
    }

    pub fn render(&self, localization: &LocalizationManager, language: Option<&str>) -> String {
        match self {
            MissingSummary::HaveEverything => localization.t_lang("have-everything", language),
            MissingSummary::ItemsNeeded(n) => {
                let count = n.to_string();
                localization.t_args_lang("items-needed", &[("count", count.as_str())], language)
            }
        }
    }
}

/// Text handed to the share sheet or clipboard
pub fn share_text(recipe: &Recipe, localization: &LocalizationManager, language: Option<&str>) -> String {
    let not_available = localization.t_lang("share-not-available", language);
    let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| not_available.clone());
    let protein = or_na(&recipe.protein);
    let carbs = or_na(&recipe.carbohydrates);
    let fat = or_na(&recipe.fat);

    let mut text = format!(
        "{}\n\n{}\n\n{}\n{}\n{}\n{}\n\n{}",
        localization.t_args_lang("share-intro", &[("title", recipe.title.as_str())], language),
        recipe.description,
        localization.t_args_lang("share-difficulty", &[("value", recipe.difficulty.label())], language),
        localization.t_args_lang("share-time", &[("value", recipe.prep_time.as_str())], language),
        localization.t_args_lang("share-calories", &[("value", recipe.calories.as_str())], language),
        localization.t_args_lang(
            "share-macros",
            &[("protein", protein.as_str()), ("carbs", carbs.as_str()), ("fat", fat.as_str())],
            language
        ),
        localization.t_lang("share-footer", language),
    );

    if let Some(url) = &recipe.source_url {
        text.push_str("\n\n");
        text.push_str(&localization.t_args_lang("share-source", &[("url", url.as_str())], language));
    }
    text
}

/// Image shown on a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardImage<'a> {
    Ready(&'a str),
    Loading,
    /// Synthesis failed or produced nothing; show the difficulty-tinted placeholder
    Placeholder,
}

/// Tracks which recipes have had a dish photo requested, so each is asked for at most once
#[derive(Debug, Clone, Default)]
pub struct ImageRequests {
    requested: HashSet<String>,
    failed: HashSet<String>,
}

impl ImageRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recipes that still need a photo, marking them as requested
    pub fn take_pending(&mut self, recipes: &[Recipe]) -> Vec<Recipe> {
        recipes
            .iter()
            .filter(|recipe| !recipe.has_image())
            .filter(|recipe| self.requested.insert(recipe.id.clone()))
            .cloned()
            .collect()
    }

    pub fn mark_failed(&mut self, id: &str) {
        self.failed.insert(id.to_string());
    }

    pub fn card_image<'a>(&self, recipe: &'a Recipe) -> CardImage<'a> {
        match recipe.image_url.as_deref() {
            Some(url) => CardImage::Ready(url),
            None if self.failed.contains(&recipe.id) => CardImage::Placeholder,
            None => CardImage::Loading,
        }
    }
}

/// Inline the synthesized photo as a data URL
pub fn image_data_url(image: &ImagePayload) -> String {
    format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.bytes))
}

/// Set the image on every copy of the recipe with this id. Returns how many were patched.
pub fn patch_recipe_image<'a>(
    recipes: impl IntoIterator<Item = &'a mut Recipe>,
    id: &str,
    image_url: &str,
) -> usize {
    let mut patched = 0;
    for recipe in recipes {
        if recipe.id == id {
            recipe.image_url = Some(image_url.to_string());
            patched += 1;
        }
    }
    patched
}
