use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{ProfileStore, UserProfile};
use crate::errors::{AppError, AppResult};

/// Profiles kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.lock().is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn fetch(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.profiles.lock().get(uid).cloned())
    }

    async fn save(&self, profile: &UserProfile) -> AppResult<()> {
        self.profiles
            .lock()
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    async fn update_pantry(&self, uid: &str, pantry: &[String]) -> AppResult<()> {
        let mut profiles = self.profiles.lock();
        let profile = profiles
            .get_mut(uid)
            .ok_or_else(|| AppError::Profile(format!("No profile for uid {}", uid)))?;
        profile.pantry = pantry.to_vec();
        Ok(())
    }
}
