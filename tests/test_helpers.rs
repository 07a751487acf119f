//! # Test Helper Library
//!
//! Shared fixtures for the integration tests: sample recipes, a scripted
//! gateway standing in for the AI service, and a fully wired [`App`].

#![allow(dead_code)]

use async_trait::async_trait;
use chef_snap::app::{App, AppServices, SpeechFactory};
use chef_snap::capture::NoCamera;
use chef_snap::gateway::{GeneratedRecipes, GenerationRequest, ImagePayload, RecipeGateway};
use chef_snap::gateway_errors::GatewayError;
use chef_snap::localization::create_localization_manager;
use chef_snap::models::{Difficulty, IngredientItem, Recipe};
use chef_snap::profile::{LocalIdentityProvider, MemoryProfileStore, ProfileService};
use chef_snap::speech::{RecordingSpeech, SpeechCapability};
use chef_snap::storage::{KeyValueStore, MemoryStore};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A recipe with `steps` numbered steps and the given missing ingredients
pub fn sample_recipe(id: &str, title: &str, steps: usize, missing: &[&str]) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("A quick {}", title.to_lowercase()),
        source_url: None,
        difficulty: Difficulty::Easy,
        prep_time: "10 mins".to_string(),
        cook_time: "15 mins".to_string(),
        calories: "350 kcal".to_string(),
        protein: None,
        carbohydrates: None,
        fat: None,
        ingredients: vec![IngredientItem::new("Eggs", "3"), IngredientItem::new("Spinach", "1 cup")],
        missing_ingredients: missing.iter().map(|name| IngredientItem::new(*name, "")).collect(),
        steps: (1..=steps).map(|n| format!("Step {} of {}", n, title)).collect(),
        tags: vec!["Vegetarian".to_string(), "Quick".to_string()],
        image_url: None,
        visual_prompt: Some("eggs, spinach".to_string()),
    }
}

pub fn sample_generation() -> GeneratedRecipes {
    GeneratedRecipes {
        intro_text: "Here is what you can cook".to_string(),
        recipes: vec![
            sample_recipe("r1", "Spinach Omelette", 3, &["Feta"]),
            sample_recipe("r2", "Green Shakshuka", 4, &[]),
        ],
    }
}

pub fn tiny_jpeg() -> ImagePayload {
    ImagePayload {
        mime_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
    }
}

/// Scripted gateway. Each call pops the next queued answer; an empty queue
/// answers with a generic failure.
#[derive(Default)]
pub struct FakeGateway {
    analyses: Mutex<VecDeque<Result<Vec<String>, GatewayError>>>,
    generations: Mutex<VecDeque<Result<GeneratedRecipes, GatewayError>>>,
    images: Mutex<VecDeque<Result<Option<ImagePayload>, GatewayError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_analysis(&self, result: Result<Vec<String>, GatewayError>) {
        self.analyses.lock().push_back(result);
    }

    pub fn push_generation(&self, result: Result<GeneratedRecipes, GatewayError>) {
        self.generations.lock().push_back(result);
    }

    pub fn push_image(&self, result: Result<Option<ImagePayload>, GatewayError>) {
        self.images.lock().push_back(result);
    }

    /// Every generation request seen so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RecipeGateway for FakeGateway {
    async fn analyze_fridge_image(&self, _image: &ImagePayload) -> Result<Vec<String>, GatewayError> {
        self.analyses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::analysis("no scripted analysis")))
    }

    async fn generate_recipes(&self, request: &GenerationRequest) -> Result<GeneratedRecipes, GatewayError> {
        self.requests.lock().push(request.clone());
        self.generations
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::generation("no scripted generation")))
    }

    async fn generate_recipe_image(
        &self,
        _title: &str,
        _visual_terms: &[String],
    ) -> Result<Option<ImagePayload>, GatewayError> {
        self.images.lock().pop_front().unwrap_or(Ok(None))
    }
}

/// Handles kept by a test after the app takes ownership of its services
pub struct TestHarness {
    pub app: App,
    pub gateway: Arc<FakeGateway>,
    pub store: Arc<MemoryStore>,
    pub speech: RecordingSpeech,
}

pub fn build_app(gateway: FakeGateway) -> TestHarness {
    build_app_with(gateway, Arc::new(MemoryStore::new()), RecordingSpeech::new())
}

pub fn build_app_with(gateway: FakeGateway, store: Arc<MemoryStore>, speech: RecordingSpeech) -> TestHarness {
    let gateway = Arc::new(gateway);
    let shared_speech = speech.clone();
    let factory: SpeechFactory =
        Arc::new(move || -> Box<dyn SpeechCapability> { Box::new(shared_speech.clone()) });
    let shared_store: Arc<dyn KeyValueStore> = store.clone();

    let app = App::new(AppServices {
        gateway: gateway.clone(),
        store: shared_store,
        profile: ProfileService::new(
            Arc::new(LocalIdentityProvider::new()),
            Arc::new(MemoryProfileStore::new()),
        ),
        camera: Box::new(NoCamera),
        speech: factory,
        localization: create_localization_manager().expect("Failed to create localization manager"),
        language: Some("en".to_string()),
    });

    TestHarness {
        app,
        gateway,
        store,
        speech,
    }
}
