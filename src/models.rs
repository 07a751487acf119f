//! Core data model shared by the gateway, the stores and the cooking session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recipe difficulty as reported by the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// An ingredient line: name plus free-text quantity ("2 cups", "a pinch", "")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientItem {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

impl IngredientItem {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }

    /// "<quantity> <name>", trimmed, as shown on the shopping list
    pub fn shopping_label(&self) -> String {
        format!("{} {}", self.quantity, self.name).trim().to_string()
    }
}

/// A generated (or saved) recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    #[serde(default)]
    pub calories: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
    pub ingredients: Vec<IngredientItem>,
    #[serde(default)]
    pub missing_ingredients: Vec<IngredientItem>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Comma separated main visual ingredients, used for image synthesis
    #[serde(
        default,
        rename = "visual_generation_prompts",
        skip_serializing_if = "Option::is_none"
    )]
    pub visual_prompt: Option<String>,
}

impl Recipe {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }

    /// Terms handed to the image synthesizer: the visual prompt when the
    /// generator supplied one, otherwise the recipe tags.
    pub fn visual_terms(&self) -> Vec<String> {
        match self.visual_prompt.as_deref() {
            Some(prompt) if !prompt.trim().is_empty() => prompt
                .split(',')
                .map(|term| term.trim().to_string())
                .filter(|term| !term.is_empty())
                .collect(),
            _ => self.tags.clone(),
        }
    }

    /// Shopping list labels for every missing ingredient
    pub fn missing_labels(&self) -> Vec<String> {
        self.missing_ingredients
            .iter()
            .map(IngredientItem::shopping_label)
            .collect()
    }
}

/// One entry of the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub id: String,
    pub name: String,
    pub recipe_title: String,
    pub acquired: bool,
}
