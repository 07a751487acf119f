//! Instruction text and response schemas sent to the generative service.

use serde_json::{json, Value};

use super::GenerationRequest;

pub const FRIDGE_ANALYSIS_PROMPT: &str = "Look at this photo of an open fridge or pantry and list every \
food ingredient you can see. Answer with a JSON array of strings. Keep each name specific but short \
(for example 'Milk', 'Cheddar Cheese', 'Red Bell Pepper') and leave out anything that is not food.";

/// JSON schema for the analysis answer: an array of strings
pub fn ingredient_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" }
    })
}

fn ingredient_item_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "quantity": { "type": "STRING" }
        },
        "required": ["name", "quantity"]
    })
}

/// JSON schema for the generation answer: `{ introText, recipes[] }`
pub fn recipe_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "introText": { "type": "STRING" },
            "recipes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "sourceUrl": { "type": "STRING" },
                        "difficulty": { "type": "STRING", "enum": ["Easy", "Medium", "Hard"] },
                        "prepTime": { "type": "STRING" },
                        "cookTime": { "type": "STRING" },
                        "calories": { "type": "STRING" },
                        "protein": { "type": "STRING" },
                        "carbohydrates": { "type": "STRING" },
                        "fat": { "type": "STRING" },
                        "ingredients": { "type": "ARRAY", "items": ingredient_item_schema() },
                        "missingIngredients": { "type": "ARRAY", "items": ingredient_item_schema() },
                        "steps": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "visual_generation_prompts": {
                            "type": "STRING",
                            "description": "Comma separated main visual ingredients of the finished dish"
                        }
                    },
                    "required": [
                        "id", "title", "difficulty", "steps", "ingredients", "missingIngredients",
                        "tags", "protein", "carbohydrates", "fat", "prepTime", "cookTime",
                        "visual_generation_prompts"
                    ]
                }
            }
        },
        "required": ["introText", "recipes"]
    })
}

/// Build the recipe generation prompt.
///
/// Unset filters ("None"/"Any") add no constraint line except for the dietary
/// filter, which states explicitly that there is no restriction.
pub fn build_recipe_prompt(request: &GenerationRequest) -> String {
    let filters = &request.filters;
    let fresh = request.ingredients.join(", ");
    let pantry = request.pantry.join(", ");

    let mut constraints = Vec::new();
    if filters.dietary.is_restricted() {
        constraints.push(format!(
            "Every recipe must strictly follow this diet: {}.",
            filters.dietary
        ));
    } else {
        constraints.push("There is no dietary restriction.".to_string());
    }
    if filters.prep_time.is_bounded() {
        constraints.push(format!(
            "Preparation time (not counting cooking) must be {}.",
            filters.prep_time
        ));
    }
    if filters.cook_time.is_bounded() {
        constraints.push(format!(
            "Cooking time (time on the heat or in the oven) must be {}.",
            filters.cook_time
        ));
    }
    if filters.difficulty.difficulty().is_some() {
        constraints.push(format!(
            "Only suggest recipes whose difficulty is '{}'.",
            filters.difficulty
        ));
    }

    format!(
        "You are an experienced chef helping someone cook with what they have.\n\
         \n\
         [WHAT THE USER HAS]\n\
         1. Freshly scanned ingredients: {fresh}.\n\
         2. Pantry staples, always available: {pantry}.\n\
         \n\
         [CONSTRAINTS]\n\
         {constraints}\n\
         \n\
         [TASK]\n\
         1. Suggest 5 different recipes.\n\
         2. Favour the freshly scanned ingredients.\n\
         3. Pantry staples may be used freely.\n\
         4. Write a friendly introduction of one or two sentences.\n\
         \n\
         [MISSING INGREDIENTS]\n\
         - Pantry staples ({pantry}) count as available.\n\
         - Never put a pantry staple or a scanned ingredient in 'missingIngredients', even when the recipe uses it.\n\
         - 'missingIngredients' lists only what the user must buy: items that are neither scanned nor pantry staples.\n\
         \n\
         Answer with a JSON object holding \"introText\" (the introduction) and \"recipes\" (the list).\n\
         Each recipe has: a catchy title, a short appetising description, difficulty, prep time, cook time, \
         calories, protein, carbohydrates, fat, the full ingredient list with quantities, \"missingIngredients\", \
         step-by-step instructions, tags, and \"visual_generation_prompts\": a short comma separated list of \
         only the main visible ingredients of the finished dish (e.g. \"grilled salmon, asparagus, lemon slices\").",
        fresh = fresh,
        pantry = pantry,
        constraints = constraints.join("\n"),
    )
}

/// Prompt for the dish photo
pub fn build_image_prompt(title: &str, visual_terms: &[String]) -> String {
    format!(
        "A professional food photo of {} showing these ingredients: {}",
        title,
        visual_terms.join(", ")
    )
}
