//! Gemini/Imagen REST implementation of [`RecipeGateway`].
//!
//! Three calls, all stateless:
//! - `generateContent` on the vision model with an inline photo
//! - `generateContent` on the recipe model with a JSON response schema
//! - `predict` on the image model for a single 4:3 JPEG

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};

use super::{prompts, schema, GeneratedRecipes, GenerationRequest, ImagePayload, RecipeGateway};
use crate::config::GatewayConfig;
use crate::errors::error_logging;
use crate::gateway_errors::GatewayError;
use crate::inventory::Inventory;
use crate::observability;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(image: &ImagePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: STANDARD.encode(&image.bytes),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.as_ref()?.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// HTTP client for the Gemini and Imagen REST endpoints
#[derive(Clone)]
pub struct GeminiGateway {
    client: Client,
    config: GatewayConfig,
}

impl fmt::Debug for GeminiGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGateway")
            .field("base_url", &self.config.base_url)
            .field("vision_model", &self.config.vision_model)
            .field("recipe_model", &self.config.recipe_model)
            .field("image_model", &self.config.image_model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder().user_agent(concat!("chef-snap/", env!("CARGO_PKG_VERSION")));
        // No timeout unless configured; generation can take a long time
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    fn build_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.base_url.trim_end_matches('/'),
            model,
            method,
            self.config.api_key
        )
    }

    /// POST a JSON body and return the raw response text, mapping HTTP failures
    async fn post(&self, operation: &str, model: &str, method: &str, body: &impl Serialize) -> Result<String, GatewayError> {
        let start = Instant::now();
        let result = self.send(model, method, body).await;
        observability::record_gateway_metrics(operation, result.is_ok(), start.elapsed());
        if let Err(e) = &result {
            error_logging::log_gateway_error(e, operation, Some(model), e.status());
        }
        result
    }

    async fn send(&self, model: &str, method: &str, body: &impl Serialize) -> Result<String, GatewayError> {
        let response = self.client.post(self.build_url(model, method)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(map_api_error(status.as_u16(), &text));
        }
        Ok(text)
    }

    async fn generate_content(
        &self,
        operation: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<Option<String>, GatewayError> {
        let text = self.post(operation, model, "generateContent", request).await?;
        let response: GenerateContentResponse = serde_json::from_str(&text)?;
        Ok(response.text())
    }
}

fn map_api_error(status: u16, response_text: &str) -> GatewayError {
    let message = serde_json::from_str::<ApiErrorBody>(response_text)
        .ok()
        .and_then(|body| body.error)
        .map_or_else(|| response_text.to_string(), |e| e.message);
    GatewayError::Api { status, message }
}

#[async_trait]
impl RecipeGateway for GeminiGateway {
    async fn analyze_fridge_image(&self, image: &ImagePayload) -> Result<Vec<String>, GatewayError> {
        let model = &self.config.vision_model;
        let span = observability::gateway_span("analyze_fridge_image", model);
        async {
            let request = GenerateContentRequest {
                contents: vec![Content {
                    parts: vec![Part::image(image), Part::text(prompts::FRIDGE_ANALYSIS_PROMPT)],
                }],
                generation_config: GenerationConfig {
                    response_mime_type: "application/json",
                    response_schema: prompts::ingredient_list_schema(),
                    temperature: None,
                },
            };

            let text = self
                .generate_content("analyze_fridge_image", model, &request)
                .await
                .map_err(GatewayError::analysis)?;
            let ingredients = schema::parse_ingredient_list(text.as_deref().unwrap_or("[]"))
                .map_err(GatewayError::analysis)?;

            info!(count = ingredients.len(), "Ingredients detected in photo");
            Ok(ingredients)
        }
        .instrument(span)
        .await
    }

    async fn generate_recipes(&self, request: &GenerationRequest) -> Result<GeneratedRecipes, GatewayError> {
        let model = &self.config.recipe_model;
        let span = observability::gateway_span("generate_recipes", model);
        async {
            let body = GenerateContentRequest {
                contents: vec![Content {
                    parts: vec![Part::text(prompts::build_recipe_prompt(request))],
                }],
                generation_config: GenerationConfig {
                    response_mime_type: "application/json",
                    response_schema: prompts::recipe_response_schema(),
                    temperature: Some(self.config.temperature),
                },
            };

            let text = self
                .generate_content("generate_recipes", model, &body)
                .await
                .map_err(GatewayError::generation)?;
            let text = text.ok_or_else(|| GatewayError::generation("empty response from recipe model"))?;
            let raw_count = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("recipes").and_then(Value::as_array).map(Vec::len))
                .unwrap_or(0);
            let mut generated = schema::parse_generated_recipes(&text).map_err(GatewayError::generation)?;

            // The model is told which items are on hand but does not always obey
            let inventory = Inventory::new(&request.ingredients, &request.pantry);
            for recipe in &mut generated.recipes {
                let changed = inventory.reconcile(recipe);
                if changed > 0 {
                    debug!(recipe = %recipe.title, changed, "Reconciled missing ingredients");
                }
            }

            observability::record_generation_metrics(
                generated.recipes.len(),
                raw_count.saturating_sub(generated.recipes.len()),
            );
            info!(count = generated.recipes.len(), "Recipes generated");
            Ok(generated)
        }
        .instrument(span)
        .await
    }

    async fn generate_recipe_image(
        &self,
        title: &str,
        visual_terms: &[String],
    ) -> Result<Option<ImagePayload>, GatewayError> {
        let model = &self.config.image_model;
        let span = observability::gateway_span("generate_recipe_image", model);
        async {
            let body = json!({
                "instances": [{ "prompt": prompts::build_image_prompt(title, visual_terms) }],
                "parameters": {
                    "sampleCount": 1,
                    "aspectRatio": "4:3",
                    "outputOptions": { "mimeType": "image/jpeg" }
                }
            });

            let to_image_error = |e: GatewayError| GatewayError::ImageSynthesis(e.to_string());
            let text = self
                .post("generate_recipe_image", model, "predict", &body)
                .await
                .map_err(to_image_error)?;
            let response: PredictResponse =
                serde_json::from_str(&text).map_err(|e| to_image_error(e.into()))?;

            let Some(prediction) = response.predictions.into_iter().next() else {
                warn!(title, "Image model returned no predictions");
                return Ok(None);
            };
            let Some(encoded) = prediction.bytes_base64_encoded else {
                warn!(title, "Image prediction carried no bytes");
                return Ok(None);
            };
            let bytes = STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| GatewayError::ImageSynthesis(format!("invalid base64 image: {}", e)))?;

            Ok(Some(ImagePayload {
                mime_type: prediction.mime_type.unwrap_or_else(|| "image/jpeg".to_string()),
                bytes,
            }))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> GeminiGateway {
        GeminiGateway::new(GatewayConfig {
            api_key: "secret-key".to_string(),
            base_url: "https://example.test/v1beta/".to_string(),
            ..GatewayConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_url() {
        let url = gateway().build_url("imagen-4.0-generate-001", "predict");
        assert_eq!(
            url,
            "https://example.test/v1beta/models/imagen-4.0-generate-001:predict?key=secret-key"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", gateway());
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_map_api_error_prefers_service_message() {
        let err = map_api_error(429, r#"{"error":{"message":"Quota exceeded"}}"#);
        assert_eq!(
            err,
            GatewayError::Api {
                status: 429,
                message: "Quota exceeded".to_string()
            }
        );
        let err = map_api_error(500, "boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let image = ImagePayload {
            mime_type: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
        };
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::image(&image), Part::text("hello")],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: prompts::ingredient_list_schema(),
                temperature: None,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["inlineData"]["data"], "AQID");
        assert_eq!(value["contents"][0]["parts"][1]["text"], "hello");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert!(value["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "[\"Milk\"," }, { "text": "\"Eggs\"]" }] } }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("[\"Milk\",\"Eggs\"]"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(empty.text().is_none());
    }
}
