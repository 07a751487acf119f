//! Identity provider seam: anonymous and federated sign-in.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::distr::Alphanumeric;
use rand::Rng;
use tracing::info;

use crate::errors::{AppError, AppResult};

/// An authenticated principal as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub is_anonymous: bool,
}

impl Identity {
    pub fn anonymous(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
            is_anonymous: true,
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_anonymously(&self) -> AppResult<Identity>;
    async fn sign_in_federated(&self) -> AppResult<Identity>;
    async fn sign_out(&self) -> AppResult<()>;
}

/// Local provider: guests get a fresh random uid; federated sign-in succeeds
/// only when an account has been configured.
#[derive(Debug, Default)]
pub struct LocalIdentityProvider {
    federated: Option<Identity>,
    current: Mutex<Option<Identity>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(account: Identity) -> Self {
        Self {
            federated: Some(account),
            current: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.lock().clone()
    }
}

fn guest_uid() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("guest-{}", suffix.to_lowercase())
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in_anonymously(&self) -> AppResult<Identity> {
        let identity = Identity::anonymous(guest_uid());
        info!(uid = %identity.uid, "Signed in as guest");
        *self.current.lock() = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_in_federated(&self) -> AppResult<Identity> {
        let identity = self
            .federated
            .clone()
            .ok_or_else(|| AppError::Profile("No federated account is configured".to_string()))?;
        info!(uid = %identity.uid, "Signed in with federated account");
        *self.current.lock() = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> AppResult<()> {
        *self.current.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guest_ids_are_unique() {
        let provider = LocalIdentityProvider::new();
        let first = provider.sign_in_anonymously().await.unwrap();
        let second = provider.sign_in_anonymously().await.unwrap();
        assert!(first.uid.starts_with("guest-"));
        assert!(first.is_anonymous);
        assert_ne!(first.uid, second.uid);
    }

    #[tokio::test]
    async fn test_federated_requires_account() {
        let provider = LocalIdentityProvider::new();
        assert!(matches!(provider.sign_in_federated().await, Err(AppError::Profile(_))));
        assert!(provider.current().is_none());
    }
}
