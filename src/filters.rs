//! Recipe generation filters: dietary restriction, prep/cook time buckets and difficulty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Difficulty;

/// Dietary restriction applied to generated recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DietaryFilter {
    #[default]
    None,
    Vegetarian,
    Vegan,
    Keto,
    #[serde(rename = "Gluten-Free")]
    GlutenFree,
    Paleo,
}

impl DietaryFilter {
    pub const ALL: [DietaryFilter; 6] = [
        DietaryFilter::None,
        DietaryFilter::Vegetarian,
        DietaryFilter::Vegan,
        DietaryFilter::Keto,
        DietaryFilter::GlutenFree,
        DietaryFilter::Paleo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DietaryFilter::None => "None",
            DietaryFilter::Vegetarian => "Vegetarian",
            DietaryFilter::Vegan => "Vegan",
            DietaryFilter::Keto => "Keto",
            DietaryFilter::GlutenFree => "Gluten-Free",
            DietaryFilter::Paleo => "Paleo",
        }
    }

    pub fn is_restricted(&self) -> bool {
        *self != DietaryFilter::None
    }
}

/// Upper bound on preparation or cooking time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeFilter {
    #[default]
    Any,
    #[serde(rename = "< 15 mins")]
    Under15,
    #[serde(rename = "< 30 mins")]
    Under30,
    #[serde(rename = "< 60 mins")]
    Under60,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 4] = [
        TimeFilter::Any,
        TimeFilter::Under15,
        TimeFilter::Under30,
        TimeFilter::Under60,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::Any => "Any",
            TimeFilter::Under15 => "< 15 mins",
            TimeFilter::Under30 => "< 30 mins",
            TimeFilter::Under60 => "< 60 mins",
        }
    }

    pub fn is_bounded(&self) -> bool {
        *self != TimeFilter::Any
    }
}

/// Requested recipe difficulty, or any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DifficultyFilter {
    #[default]
    Any,
    Easy,
    Medium,
    Hard,
}

impl DifficultyFilter {
    pub const ALL: [DifficultyFilter; 4] = [
        DifficultyFilter::Any,
        DifficultyFilter::Easy,
        DifficultyFilter::Medium,
        DifficultyFilter::Hard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyFilter::Any => "Any",
            DifficultyFilter::Easy => "Easy",
            DifficultyFilter::Medium => "Medium",
            DifficultyFilter::Hard => "Hard",
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        match self {
            DifficultyFilter::Any => None,
            DifficultyFilter::Easy => Some(Difficulty::Easy),
            DifficultyFilter::Medium => Some(Difficulty::Medium),
            DifficultyFilter::Hard => Some(Difficulty::Hard),
        }
    }
}

macro_rules! label_parsing {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_label(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| normalize_label(candidate.label()) == wanted)
                    .ok_or_else(|| format!("unknown {} filter '{}'", $what, s.trim()))
            }
        }
    };
}

label_parsing!(DietaryFilter, "dietary");
label_parsing!(TimeFilter, "time");
label_parsing!(DifficultyFilter, "difficulty");

/// Lowercase and drop spaces/dashes so "gluten free", "<30 mins" and "Gluten-Free" compare equal
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// The four filters that shape a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub dietary: DietaryFilter,
    pub prep_time: TimeFilter,
    pub cook_time: TimeFilter,
    pub difficulty: DifficultyFilter,
}

/// A single filter edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    Dietary(DietaryFilter),
    PrepTime(TimeFilter),
    CookTime(TimeFilter),
    Difficulty(DifficultyFilter),
}

impl FilterState {
    /// Apply a change, returning the updated state
    pub fn with(mut self, change: FilterChange) -> Self {
        match change {
            FilterChange::Dietary(value) => self.dietary = value,
            FilterChange::PrepTime(value) => self.prep_time = value,
            FilterChange::CookTime(value) => self.cook_time = value,
            FilterChange::Difficulty(value) => self.difficulty = value,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_back() {
        for filter in DietaryFilter::ALL {
            assert_eq!(filter.label().parse::<DietaryFilter>(), Ok(filter));
        }
        for filter in TimeFilter::ALL {
            assert_eq!(filter.label().parse::<TimeFilter>(), Ok(filter));
        }
        for filter in DifficultyFilter::ALL {
            assert_eq!(filter.label().parse::<DifficultyFilter>(), Ok(filter));
        }
    }

    #[test]
    fn test_loose_label_parsing() {
        assert_eq!("gluten free".parse::<DietaryFilter>(), Ok(DietaryFilter::GlutenFree));
        assert_eq!("<30 mins".parse::<TimeFilter>(), Ok(TimeFilter::Under30));
        assert_eq!("HARD".parse::<DifficultyFilter>(), Ok(DifficultyFilter::Hard));
        assert!("pescatarian".parse::<DietaryFilter>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&TimeFilter::Under15).unwrap();
        assert_eq!(json, "\"< 15 mins\"");
        let parsed: DietaryFilter = serde_json::from_str("\"Gluten-Free\"").unwrap();
        assert_eq!(parsed, DietaryFilter::GlutenFree);
    }

    #[test]
    fn test_filter_change_touches_one_field() {
        let state = FilterState::default().with(FilterChange::CookTime(TimeFilter::Under60));
        assert_eq!(state.cook_time, TimeFilter::Under60);
        assert_eq!(state.prep_time, TimeFilter::Any);
        assert_eq!(state.dietary, DietaryFilter::None);
    }
}
