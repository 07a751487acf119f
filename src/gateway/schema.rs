//! Boundary validation for JSON coming back from the generative service.
//!
//! Nothing from the service reaches the `Recipe` model without passing through
//! here. Top-level shapes that are not what we asked for become empty
//! collections; individual recipes that cannot be cooked (no title, no steps)
//! are dropped; loose fields are normalized.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::GeneratedRecipes;
use crate::gateway_errors::GatewayError;
use crate::models::{Difficulty, IngredientItem, Recipe};

pub const DEFAULT_INTRO_TEXT: &str = "Here are some delicious recipes for you!";

/// Parse the analysis answer.
///
/// Text that is not JSON at all is an error; JSON that is not an array of
/// strings yields nothing.
pub fn parse_ingredient_list(text: &str) -> Result<Vec<String>, GatewayError> {
    let value: Value = serde_json::from_str(text)?;

    let Value::Array(items) = value else {
        warn!("Analysis answer is not an array; treating as empty");
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(name.trim().to_string()),
            _ => None,
        })
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect())
}

/// Loosely typed recipe as the service may send it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawRecipe {
    id: Option<Value>,
    title: Option<String>,
    description: Option<String>,
    source_url: Option<String>,
    difficulty: Option<String>,
    prep_time: Option<String>,
    cook_time: Option<String>,
    calories: Option<Value>,
    protein: Option<Value>,
    carbohydrates: Option<Value>,
    fat: Option<Value>,
    ingredients: Option<Value>,
    missing_ingredients: Option<Value>,
    steps: Option<Value>,
    tags: Option<Value>,
    #[serde(rename = "visual_generation_prompts")]
    visual_prompt: Option<String>,
}

/// Parse the generation answer into validated recipes
pub fn parse_generated_recipes(text: &str) -> Result<GeneratedRecipes, GatewayError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(generated_recipes_from_value(value))
}

pub fn generated_recipes_from_value(value: Value) -> GeneratedRecipes {
    let Value::Object(mut object) = value else {
        warn!("Generation answer is not an object; treating as empty");
        return empty_generation();
    };

    let intro_text = match object.remove("introText") {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        _ => DEFAULT_INTRO_TEXT.to_string(),
    };

    let raw_recipes = match object.remove("recipes") {
        Some(Value::Array(items)) => items,
        _ => {
            warn!("Generation answer has no recipe array");
            Vec::new()
        }
    };

    let mut ids = HashSet::new();
    let recipes = raw_recipes
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| validate_recipe(raw, index))
        .map(|mut recipe| {
            // The service sometimes repeats ids; saved-recipe presence is keyed by id
            if !ids.insert(recipe.id.clone()) {
                let base = recipe.id.clone();
                let mut suffix = 2;
                while !ids.insert(format!("{}-{}", base, suffix)) {
                    suffix += 1;
                }
                recipe.id = format!("{}-{}", base, suffix);
            }
            recipe
        })
        .collect();

    GeneratedRecipes {
        intro_text,
        recipes,
    }
}

fn empty_generation() -> GeneratedRecipes {
    GeneratedRecipes {
        intro_text: DEFAULT_INTRO_TEXT.to_string(),
        recipes: Vec::new(),
    }
}

/// Validate one recipe. Returns `None` when it cannot be cooked.
pub fn validate_recipe(value: Value, index: usize) -> Option<Recipe> {
    let raw: RawRecipe = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(index, error = %e, "Dropping recipe with unexpected shape");
            return None;
        }
    };

    let title = raw.title.map(|t| t.trim().to_string()).unwrap_or_default();
    if title.is_empty() {
        warn!(index, "Dropping recipe without a title");
        return None;
    }

    let steps = string_list(raw.steps);
    if steps.is_empty() {
        warn!(index, title = %title, "Dropping recipe without steps");
        return None;
    }

    let difficulty = match raw.difficulty.as_deref().map(str::parse::<Difficulty>) {
        Some(Ok(difficulty)) => difficulty,
        Some(Err(e)) => {
            debug!(index, error = %e, "Unknown difficulty, using default");
            Difficulty::default()
        }
        None => Difficulty::default(),
    };

    let id = match raw.id {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("{}-{}", slug(&title), index + 1),
    };

    Some(Recipe {
        id,
        title,
        description: raw.description.unwrap_or_default(),
        source_url: raw.source_url.filter(|url| url.starts_with("http")),
        difficulty,
        prep_time: raw.prep_time.unwrap_or_default(),
        cook_time: raw.cook_time.unwrap_or_default(),
        calories: loose_text(raw.calories).unwrap_or_default(),
        protein: loose_text(raw.protein),
        carbohydrates: loose_text(raw.carbohydrates),
        fat: loose_text(raw.fat),
        ingredients: ingredient_list(raw.ingredients),
        missing_ingredients: ingredient_list(raw.missing_ingredients),
        steps,
        tags: string_list(raw.tags),
        image_url: None,
        visual_prompt: raw.visual_prompt.filter(|p| !p.trim().is_empty()),
    })
}

/// Accept `{name, quantity}` objects and bare strings; drop anything else
pub fn ingredient_list(value: Option<Value>) -> Vec<IngredientItem> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(IngredientItem::new(name.trim(), "")),
            Value::Object(mut fields) => {
                let name = match fields.remove("name") {
                    Some(Value::String(name)) => name.trim().to_string(),
                    _ => return None,
                };
                let quantity = loose_text(fields.remove("quantity")).unwrap_or_default();
                Some(IngredientItem::new(name, quantity))
            }
            _ => None,
        })
        .filter(|item| !item.name.is_empty())
        .collect()
}

fn string_list(value: Option<Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.trim().to_string()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect()
}

/// Strings stay strings, numbers become their decimal text
fn loose_text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Spinach & Feta Omelette!"), "spinach-feta-omelette");
    }

    #[test]
    fn test_ingredient_list_accepts_both_shapes() {
        let items = ingredient_list(Some(json!([
            "Salt",
            { "name": "Eggs", "quantity": "3" },
            { "name": "Milk", "quantity": 200 },
            { "quantity": "1 cup" },
            42
        ])));
        assert_eq!(
            items,
            vec![
                IngredientItem::new("Salt", ""),
                IngredientItem::new("Eggs", "3"),
                IngredientItem::new("Milk", "200"),
            ]
        );
    }

    /// Repaired ids never collide with ids the service already used
    #[test]
    fn test_repeated_ids_become_unique() {
        let recipe = |id: &str| json!({ "id": id, "title": "Soup", "steps": ["Simmer"] });
        let generated = generated_recipes_from_value(json!({
            "introText": "Dinner",
            "recipes": [recipe("a"), recipe("a-2"), recipe("a"), recipe("a")]
        }));

        let ids: Vec<&str> = generated.recipes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a-2", "a-3", "a-4"]);
    }

    #[test]
    fn test_non_array_ingredient_answer_is_empty() {
        assert!(parse_ingredient_list("{\"ingredients\": [\"Milk\"]}").unwrap().is_empty());
        assert!(parse_ingredient_list("not json").is_err());
        assert_eq!(
            parse_ingredient_list("[\"Milk\", \" milk \", 3, \"Butter\", \"\"]").unwrap(),
            vec!["Milk".to_string(), "Butter".to_string()]
        );
    }
}
