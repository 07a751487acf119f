//! Recognition/generation gateway.
//!
//! A stateless request/response wrapper around the external generative AI
//! service:
//! - `prompts`: instruction text sent with each request
//! - `schema`: boundary validation of the service's JSON into our model
//! - `gemini`: the HTTP implementation against the Gemini/Imagen REST API

pub mod gemini;
pub mod prompts;
pub mod schema;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::filters::FilterState;
use crate::gateway_errors::GatewayError;
use crate::models::Recipe;

pub use gemini::GeminiGateway;

/// Everything the generator needs to propose recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub ingredients: Vec<String>,
    pub pantry: Vec<String>,
    pub filters: FilterState,
}

/// Recipes plus the short introduction shown above them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratedRecipes {
    pub intro_text: String,
    pub recipes: Vec<Recipe>,
}

/// A still frame ready to be sent to the image-understanding service
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// The external AI service contract
#[async_trait]
pub trait RecipeGateway: Send + Sync {
    /// Extract ingredient names visible in a fridge/pantry photo
    async fn analyze_fridge_image(&self, image: &ImagePayload) -> Result<Vec<String>, GatewayError>;

    /// Propose recipes from detected ingredients, pantry staples and filters
    async fn generate_recipes(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedRecipes, GatewayError>;

    /// Synthesize a dish photo. `Ok(None)` when the service produced nothing.
    async fn generate_recipe_image(
        &self,
        title: &str,
        visual_terms: &[String],
    ) -> Result<Option<ImagePayload>, GatewayError>;
}
