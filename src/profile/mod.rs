//! # User Profile Module
//!
//! Signed-in user record: dietary preference and pantry staples, synced with a
//! remote store keyed by uid. Every failure here degrades to "no profile"
//! rather than interrupting the cooking flow.

pub mod identity;
pub mod memory;
pub mod pg;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::{error_logging, AppResult};
use crate::filters::DietaryFilter;

pub use identity::{Identity, IdentityProvider, LocalIdentityProvider};
pub use memory::MemoryProfileStore;
pub use pg::PgProfileStore;

/// Staples every new profile starts with
pub const DEFAULT_PANTRY: [&str; 3] = ["Salt", "Pepper", "Olive Oil"];

pub const DEFAULT_DISPLAY_NAME: &str = "Chef";

/// Staples offered as one-tap toggles on the profile page
pub const COMMON_STAPLES: [&str; 12] = [
    "Salt",
    "Pepper",
    "Olive Oil",
    "Sugar",
    "Flour",
    "Garlic",
    "Onions",
    "Rice",
    "Butter",
    "Eggs",
    "Milk",
    "Vegetable Oil",
];

/// Allergies and dislikes are stored but not used when generating recipes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dietary: DietaryFilter,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub pantry: Vec<String>,
}

impl UserProfile {
    /// Profile created on first sign-in
    pub fn new_for(identity: &Identity) -> Self {
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: Some(
                identity
                    .display_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            ),
            photo_url: identity.photo_url.clone(),
            preferences: Preferences::default(),
            pantry: DEFAULT_PANTRY.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn has_pantry_item(&self, item: &str) -> bool {
        self.pantry.iter().any(|p| p == item)
    }

    /// Pantry entries that are not among the common staples
    pub fn custom_items(&self) -> Vec<&str> {
        self.pantry
            .iter()
            .map(String::as_str)
            .filter(|item| !COMMON_STAPLES.contains(item))
            .collect()
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

/// Remote profile storage keyed by uid
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, uid: &str) -> AppResult<Option<UserProfile>>;
    async fn save(&self, profile: &UserProfile) -> AppResult<()>;
    /// Replace the whole pantry
    async fn update_pantry(&self, uid: &str, pantry: &[String]) -> AppResult<()>;
}

/// Pantry with `item` added or removed
pub fn toggled_pantry(pantry: &[String], item: &str) -> Vec<String> {
    if pantry.iter().any(|p| p == item) {
        pantry.iter().filter(|p| *p != item).cloned().collect()
    } else {
        let mut next = pantry.to_vec();
        next.push(item.to_string());
        next
    }
}

/// Sign-in state plus the current profile
pub struct ProfileService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn ProfileStore>,
    user: Option<Identity>,
    profile: Option<UserProfile>,
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("user", &self.user.as_ref().map(|u| &u.uid))
            .field("has_profile", &self.profile.is_some())
            .finish()
    }
}

impl ProfileService {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            identity,
            store,
            user: None,
            profile: None,
        }
    }

    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Pantry used for generation; empty when signed out
    pub fn pantry(&self) -> Vec<String> {
        self.profile
            .as_ref()
            .map(|p| p.pantry.clone())
            .unwrap_or_default()
    }

    pub fn dietary_preference(&self) -> Option<DietaryFilter> {
        self.profile.as_ref().map(|p| p.preferences.dietary)
    }

    pub async fn sign_in_guest(&mut self) -> Option<&UserProfile> {
        match self.identity.sign_in_anonymously().await {
            Ok(identity) => self.on_signed_in(identity).await,
            Err(e) => {
                error_logging::log_profile_error(&e, "sign_in_guest", None);
                None
            }
        }
    }

    pub async fn sign_in_federated(&mut self) -> Option<&UserProfile> {
        match self.identity.sign_in_federated().await {
            Ok(identity) => self.on_signed_in(identity).await,
            Err(e) => {
                error_logging::log_profile_error(&e, "sign_in_federated", None);
                None
            }
        }
    }

    async fn on_signed_in(&mut self, identity: Identity) -> Option<&UserProfile> {
        self.profile = self.fetch_or_create(&identity).await;
        self.user = Some(identity);
        self.profile.as_ref()
    }

    async fn fetch_or_create(&self, identity: &Identity) -> Option<UserProfile> {
        match self.store.fetch(&identity.uid).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                let profile = UserProfile::new_for(identity);
                match self.store.save(&profile).await {
                    Ok(()) => {
                        info!(uid = %profile.uid, "Created new profile");
                        Some(profile)
                    }
                    Err(e) => {
                        error_logging::log_profile_error(&e, "create_profile", Some(&identity.uid));
                        None
                    }
                }
            }
            Err(e) => {
                error_logging::log_profile_error(&e, "fetch_profile", Some(&identity.uid));
                None
            }
        }
    }

    pub async fn sign_out(&mut self) {
        if let Err(e) = self.identity.sign_out().await {
            error_logging::log_profile_error(
                &e,
                "sign_out",
                self.user.as_ref().map(|u| u.uid.as_str()),
            );
            return;
        }
        self.user = None;
        self.profile = None;
    }

    /// Replace the pantry. Returns false when signed out or the store refused.
    pub async fn update_pantry(&mut self, items: Vec<String>) -> bool {
        let Some(profile) = self.profile.as_mut() else {
            warn!("Pantry update ignored without a profile");
            return false;
        };

        match self.store.update_pantry(&profile.uid, &items).await {
            Ok(()) => {
                profile.pantry = items;
                true
            }
            Err(e) => {
                error_logging::log_profile_error(&e, "update_pantry", Some(&profile.uid));
                false
            }
        }
    }

    /// Add the item if absent, remove it if present
    pub async fn toggle_staple(&mut self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() {
            return false;
        }
        let Some(profile) = self.profile.as_ref() else {
            return false;
        };
        let next = toggled_pantry(&profile.pantry, item);
        self.update_pantry(next).await
    }
}
