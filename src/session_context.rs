//! Session context: the current view, filters, detected ingredients and the
//! generated recipe list. All updates go through the dispatcher in `app`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::browse::patch_recipe_image;
use crate::filters::{DietaryFilter, FilterChange, FilterState};
use crate::gateway::{GeneratedRecipes, GenerationRequest};
use crate::gateway_errors::GatewayError;
use crate::models::Recipe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppView {
    #[default]
    Home,
    Recipes,
    Cooking,
    Shopping,
    Saved,
    Profile,
}

impl AppView {
    pub const ALL: [AppView; 6] = [
        AppView::Home,
        AppView::Recipes,
        AppView::Cooking,
        AppView::Shopping,
        AppView::Saved,
        AppView::Profile,
    ];

    /// Localization key of the view title
    pub fn message_key(&self) -> &'static str {
        match self {
            AppView::Home => "view-home",
            AppView::Recipes => "view-recipes",
            AppView::Cooking => "view-cooking",
            AppView::Shopping => "view-shopping",
            AppView::Saved => "view-saved",
            AppView::Profile => "view-profile",
        }
    }
}

/// Which flow started the generation in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOrigin {
    /// Photo captured and analyzed
    Capture,
    /// A filter changed while browsing
    Regeneration,
}

/// How a generation round ended
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Ready { count: usize },
    /// Alert shown and the user is sent back home
    CaptureFailed(GatewayError),
    /// Notice shown; the list stays empty in the browsing view
    RegenerationFailed(GatewayError),
    /// No generation was in flight
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    view: AppView,
    /// View to return to when the cooking session closes
    cooking_return: AppView,
    filters: FilterState,
    detected_ingredients: Vec<String>,
    generated: Vec<Recipe>,
    intro_text: String,
    selected: Option<Recipe>,
    analyzing: bool,
    in_flight: Option<GenerationOrigin>,
    ratings_version: u64,
    global_voice: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn filters(&self) -> FilterState {
        self.filters
    }

    pub fn detected_ingredients(&self) -> &[String] {
        &self.detected_ingredients
    }

    pub fn generated(&self) -> &[Recipe] {
        &self.generated
    }

    pub fn generated_mut(&mut self) -> &mut Vec<Recipe> {
        &mut self.generated
    }

    pub fn intro_text(&self) -> &str {
        &self.intro_text
    }

    pub fn selected(&self) -> Option<&Recipe> {
        self.selected.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn ratings_version(&self) -> u64 {
        self.ratings_version
    }

    pub fn global_voice_enabled(&self) -> bool {
        self.global_voice
    }

    /// Global recognition runs only when enabled and never during cooking
    pub fn global_voice_should_run(&self) -> bool {
        self.global_voice && self.view != AppView::Cooking
    }

    pub fn toggle_global_voice(&mut self) -> bool {
        self.global_voice = !self.global_voice;
        self.global_voice
    }

    pub fn disable_global_voice(&mut self) {
        self.global_voice = false;
    }

    pub fn navigate(&mut self, view: AppView) {
        debug!(from = ?self.view, to = ?view, "Navigate");
        self.view = view;
    }

    /// A profile's dietary preference replaces the current dietary filter
    pub fn seed_dietary(&mut self, dietary: DietaryFilter) {
        self.filters.dietary = dietary;
    }

    // Capture → analysis → generation

    pub fn begin_analysis(&mut self) {
        self.analyzing = true;
    }

    /// Ingredients are in; switch to browsing and build the first generation request
    pub fn analysis_complete(&mut self, ingredients: Vec<String>, pantry: Vec<String>) -> GenerationRequest {
        info!(count = ingredients.len(), "Ingredients detected");
        self.detected_ingredients = ingredients;
        self.generated.clear();
        self.intro_text.clear();
        self.in_flight = Some(GenerationOrigin::Capture);
        self.view = AppView::Recipes;
        self.request(pantry)
    }

    pub fn analysis_failed(&mut self) {
        self.analyzing = false;
        self.in_flight = None;
        self.view = AppView::Home;
    }

    fn request(&self, pantry: Vec<String>) -> GenerationRequest {
        GenerationRequest {
            ingredients: self.detected_ingredients.clone(),
            pantry,
            filters: self.filters,
        }
    }

    /// Update one filter. While browsing with detected ingredients the list is
    /// cleared and a regeneration request is returned.
    pub fn apply_filter(&mut self, change: FilterChange, pantry: Vec<String>) -> Option<GenerationRequest> {
        self.filters = self.filters.with(change);

        if self.view != AppView::Recipes || self.detected_ingredients.is_empty() {
            return None;
        }

        info!(change = ?change, "Regenerating recipes for new filters");
        self.generated.clear();
        self.in_flight = Some(GenerationOrigin::Regeneration);
        Some(self.request(pantry))
    }

    pub fn finish_generation(&mut self, result: Result<GeneratedRecipes, GatewayError>) -> GenerationOutcome {
        let Some(origin) = self.in_flight.take() else {
            return GenerationOutcome::Ignored;
        };
        self.analyzing = false;

        match (result, origin) {
            (Ok(generated), _) => {
                let count = generated.recipes.len();
                self.generated = generated.recipes;
                self.intro_text = generated.intro_text;
                GenerationOutcome::Ready { count }
            }
            (Err(e), GenerationOrigin::Capture) => {
                self.view = AppView::Home;
                GenerationOutcome::CaptureFailed(e)
            }
            (Err(e), GenerationOrigin::Regeneration) => {
                self.generated.clear();
                GenerationOutcome::RegenerationFailed(e)
            }
        }
    }

    // Cooking

    pub fn select_recipe(&mut self, recipe: Recipe) {
        self.cooking_return = match self.view {
            AppView::Saved => AppView::Saved,
            _ => AppView::Recipes,
        };
        self.selected = Some(recipe);
        self.view = AppView::Cooking;
    }

    pub fn close_cooking(&mut self) {
        if self.view == AppView::Cooking {
            self.view = self.cooking_return;
        }
    }

    pub fn bump_ratings_version(&mut self) -> u64 {
        self.ratings_version += 1;
        self.ratings_version
    }

    /// Patch the image into the generated list and the selected recipe
    pub fn patch_image(&mut self, id: &str, image_url: &str) -> usize {
        patch_recipe_image(
            self.generated.iter_mut().chain(self.selected.iter_mut()),
            id,
            image_url,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::DifficultyFilter;

    #[test]
    fn test_filter_outside_browsing_only_updates_state() {
        let mut context = SessionContext::new();
        let request = context.apply_filter(FilterChange::Dietary(DietaryFilter::Vegan), vec![]);
        assert!(request.is_none());
        assert_eq!(context.filters().dietary, DietaryFilter::Vegan);
        assert!(!context.is_generating());
    }

    #[test]
    fn test_filter_while_browsing_without_ingredients() {
        let mut context = SessionContext::new();
        context.navigate(AppView::Recipes);
        assert!(context
            .apply_filter(FilterChange::Difficulty(DifficultyFilter::Easy), vec![])
            .is_none());
    }

    #[test]
    fn test_finish_without_request_is_ignored() {
        let mut context = SessionContext::new();
        assert_eq!(
            context.finish_generation(Ok(GeneratedRecipes::default())),
            GenerationOutcome::Ignored
        );
    }

    #[test]
    fn test_close_cooking_returns_to_origin() {
        let mut context = SessionContext::new();
        context.navigate(AppView::Saved);
        context.select_recipe(Recipe {
            id: "1".to_string(),
            title: "Soup".to_string(),
            description: String::new(),
            source_url: None,
            difficulty: Default::default(),
            prep_time: String::new(),
            cook_time: String::new(),
            calories: String::new(),
            protein: None,
            carbohydrates: None,
            fat: None,
            ingredients: vec![],
            missing_ingredients: vec![],
            steps: vec!["Boil".to_string()],
            tags: vec![],
            image_url: None,
            visual_prompt: None,
        });
        assert_eq!(context.view(), AppView::Cooking);
        assert!(!context.global_voice_should_run());
        context.close_cooking();
        assert_eq!(context.view(), AppView::Saved);
    }
}
