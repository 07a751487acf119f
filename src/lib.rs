//! # ChefSnap
//!
//! A camera-driven recipe assistant. A photo of the fridge is turned into an
//! ingredient list, recipes are generated around it under dietary, time and
//! difficulty filters, and the cook is guided step by step with voice
//! control, ratings and a shopping list.

pub mod app;
pub mod browse;
pub mod capture;
pub mod config;
pub mod console;
pub mod cooking;
pub mod errors;
pub mod filters;
pub mod gateway;
pub mod gateway_errors;
pub mod inventory;
pub mod localization;
pub mod models;
pub mod observability;
pub mod observability_config;
pub mod profile;
pub mod session_context;
pub mod shopping;
pub mod speech;
pub mod storage;

// Re-export types for easier access
pub use app::{App, AppEvent, AppServices, CookingInput, Notice};
pub use errors::{AppError, AppResult};
pub use gateway::{GeneratedRecipes, GenerationRequest, RecipeGateway};
pub use models::{Difficulty, IngredientItem, Recipe, ShoppingListItem};
pub use session_context::{AppView, SessionContext};
