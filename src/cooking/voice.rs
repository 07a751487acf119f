//! Keyword classification of finalized voice utterances.

use crate::filters::{DietaryFilter, DifficultyFilter, FilterChange};

/// Hands-free commands understood while cooking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceCommand {
    Next,
    Previous,
    ReadStep,
    StopReading,
    AddMissingToShoppingList,
    ShowIngredients,
    HideIngredients,
    ShowPhoto,
    ClosePhoto,
}

impl VoiceCommand {
    /// Metric/log label
    pub fn name(&self) -> &'static str {
        match self {
            VoiceCommand::Next => "next",
            VoiceCommand::Previous => "previous",
            VoiceCommand::ReadStep => "read_step",
            VoiceCommand::StopReading => "stop_reading",
            VoiceCommand::AddMissingToShoppingList => "add_missing",
            VoiceCommand::ShowIngredients => "show_ingredients",
            VoiceCommand::HideIngredients => "hide_ingredients",
            VoiceCommand::ShowPhoto => "show_photo",
            VoiceCommand::ClosePhoto => "close_photo",
        }
    }

    /// Classify an utterance. Checks run in a fixed order and the first match
    /// wins, so "stop reading" is a read command, "next ingredient" is Next and
    /// any mention of an ingredient opens the overlay.
    pub fn classify(utterance: &str) -> Option<Self> {
        let text = utterance.trim().to_lowercase();
        let any = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if any(&["next"]) {
            Some(VoiceCommand::Next)
        } else if any(&["back", "previous", "prev"]) {
            Some(VoiceCommand::Previous)
        } else if any(&["read", "repeat", "speak"]) {
            Some(VoiceCommand::ReadStep)
        } else if any(&["stop", "quiet", "hush"]) {
            Some(VoiceCommand::StopReading)
        } else if any(&["add"]) && any(&["shop", "list", "missing"]) {
            Some(VoiceCommand::AddMissingToShoppingList)
        } else if any(&["ingredient"]) {
            Some(VoiceCommand::ShowIngredients)
        } else if any(&["close ingredient", "hide ingredient"]) {
            // Shadowed by the group above; kept so the table reads in full
            Some(VoiceCommand::HideIngredients)
        } else if any(&["show photo", "view image", "open photo"]) {
            Some(VoiceCommand::ShowPhoto)
        } else if any(&["close photo", "close image"]) {
            Some(VoiceCommand::ClosePhoto)
        } else {
            None
        }
    }
}

/// Commands understood outside the cooking session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalVoiceCommand {
    Vegetarian,
    Easy,
}

impl GlobalVoiceCommand {
    pub fn classify(utterance: &str) -> Option<Self> {
        let text = utterance.trim().to_lowercase();
        if text.contains("vegetarian") {
            Some(GlobalVoiceCommand::Vegetarian)
        } else if text.contains("easy") {
            Some(GlobalVoiceCommand::Easy)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GlobalVoiceCommand::Vegetarian => "global_vegetarian",
            GlobalVoiceCommand::Easy => "global_easy",
        }
    }

    /// The filter change this command stands for
    pub fn filter_change(&self) -> FilterChange {
        match self {
            GlobalVoiceCommand::Vegetarian => FilterChange::Dietary(DietaryFilter::Vegetarian),
            GlobalVoiceCommand::Easy => FilterChange::Difficulty(DifficultyFilter::Easy),
        }
    }
}
