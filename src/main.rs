use anyhow::Result;
use chef_snap::app::{App, AppServices, SpeechFactory};
use chef_snap::capture::{Camera, FileCamera, NoCamera};
use chef_snap::config::AppConfig;
use chef_snap::console::{self, ConsoleSpeech};
use chef_snap::errors::error_logging;
use chef_snap::gateway::GeminiGateway;
use chef_snap::localization;
use chef_snap::observability;
use chef_snap::profile::{
    Identity, LocalIdentityProvider, MemoryProfileStore, PgProfileStore, ProfileService, ProfileStore,
};
use chef_snap::speech::{NoopSpeech, SpeechCapability};
use chef_snap::storage::{JsonFileStore, KeyValueStore};
use std::env;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Load and validate configuration at startup
fn load_configuration() -> Result<AppConfig> {
    let config = AppConfig::from_env().map_err(|e| {
        error_logging::log_config_error(&e, "environment", "load");
        anyhow::anyhow!("{}. Please check your environment or .env file.", e)
    })?;

    config.validate().map_err(|e| {
        error_logging::log_config_error(&e, "environment", "validate");
        anyhow::anyhow!("Configuration validation failed: {}", e)
    })?;

    Ok(config)
}

/// Profiles go to PostgreSQL when a database is configured, otherwise stay in memory
async fn create_profile_store(config: &AppConfig) -> Arc<dyn ProfileStore> {
    if config.database.url.is_none() {
        info!("No DATABASE_URL set, keeping profiles in memory");
        return Arc::new(MemoryProfileStore::new());
    }

    match PgProfileStore::connect(&config.database).await {
        Ok(store) => {
            info!("Profile database connected");
            Arc::new(store)
        }
        Err(e) => {
            // Failures degrade to no remote profile sync
            warn!(error = %e, "Profile database unavailable, keeping profiles in memory");
            Arc::new(MemoryProfileStore::new())
        }
    }
}

/// A configured federated account, if any
fn federated_account() -> Option<Identity> {
    let email = env::var("CHEFSNAP_ACCOUNT_EMAIL").ok()?;
    Some(Identity {
        uid: format!("account-{}", email.trim().to_lowercase()),
        display_name: env::var("CHEFSNAP_ACCOUNT_NAME").ok(),
        email: Some(email),
        photo_url: None,
        is_anonymous: false,
    })
}

fn create_camera() -> Box<dyn Camera> {
    match env::var("CHEFSNAP_CAMERA_IMAGE") {
        Ok(path) => Box::new(FileCamera::new(path)),
        Err(_) => Box::new(NoCamera),
    }
}

/// `CHEFSNAP_SPEECH=off` behaves like a platform without speech support
fn speech_disabled() -> bool {
    env::var("CHEFSNAP_SPEECH").is_ok_and(|value| value.eq_ignore_ascii_case("off"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let started = Instant::now();

    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let config = load_configuration()?;

    // Initialize complete observability stack (metrics, tracing, logging)
    observability::init_observability_with_config(config.observability.clone()).await?;
    info!("{}", config.summary());

    let localization_manager = localization::create_localization_manager()?;
    let language = Some(localization_manager.detect_language(config.language.as_deref()));

    let gateway = Arc::new(GeminiGateway::new(config.gateway.clone())?);

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&config.storage.data_dir)?);
    info!(data_dir = %config.storage.data_dir.display(), "Local store opened");

    let identity = Arc::new(match federated_account() {
        Some(account) => LocalIdentityProvider::with_account(account),
        None => LocalIdentityProvider::new(),
    });
    let profile = ProfileService::new(identity, create_profile_store(&config).await);

    let (console_speech, speech_events) = ConsoleSpeech::channel();
    let speech: SpeechFactory = if speech_disabled() {
        info!("Speech disabled, voice control unavailable");
        Arc::new(|| -> Box<dyn SpeechCapability> { Box::new(NoopSpeech) })
    } else {
        Arc::new(move || -> Box<dyn SpeechCapability> { Box::new(console_speech.clone()) })
    };

    let app = App::new(AppServices {
        gateway,
        store,
        profile,
        camera: create_camera(),
        speech,
        localization: localization_manager,
        language,
    });

    observability::record_startup_metrics(started.elapsed());
    info!("ChefSnap ready");

    console::run_console(app, speech_events).await
}
