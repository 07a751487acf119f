//! # Application Dispatcher
//!
//! Every user action arrives as an [`AppEvent`] and flows through
//! [`App::dispatch`], which updates the session context, talks to the gateway
//! and the stores, and returns the notices the front end should show.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

use crate::browse::{image_data_url, patch_recipe_image, BrowseQuery, ImageRequests};
use crate::capture::{Camera, CaptureFlow};
use crate::cooking::{CookingEffect, CookingSession, GlobalVoiceCommand};
use crate::errors::error_logging;
use crate::filters::FilterChange;
use crate::gateway::{GeneratedRecipes, RecipeGateway};
use crate::gateway_errors::GatewayError;
use crate::localization::LocalizationManager;
use crate::models::Recipe;
use crate::observability::{self, session_span};
use crate::profile::ProfileService;
use crate::session_context::{AppView, GenerationOutcome, SessionContext};
use crate::shopping::ShoppingList;
use crate::speech::{SpeechCapability, SpeechError};
use crate::storage::{KeyValueStore, RatingsStore, SavedRecipes, FAVORITES_KEY, RATINGS_KEY};

/// Builds a fresh speech capability for each cooking session
pub type SpeechFactory = Arc<dyn Fn() -> Box<dyn SpeechCapability> + Send + Sync>;

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Something the user should see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Inline status or confirmation
    Info(String),
    /// Blocking alert
    Alert(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Alert(text) => text,
        }
    }
}

/// Input while a cooking session is open
#[derive(Debug, Clone, PartialEq)]
pub enum CookingInput {
    Next,
    Previous,
    Jump(usize),
    ToggleRead,
    StopReading,
    AddMissing,
    Rate(u8),
    ToggleIngredients,
    OpenPhoto,
    ClosePhoto,
    ZoomIn,
    ZoomOut,
    Wheel(f64),
    ResetZoom,
    ToggleVoice,
    /// A finalized phrase from the recognizer (or typed in its place)
    Utterance(String),
    SpeechFinished(u64),
    SpeechFailed(u64, SpeechError),
    RecognitionEnded,
    RecognitionFailed(SpeechError),
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Navigate(AppView),
    StartCamera,
    StopCamera,
    Snap,
    UploadFile(PathBuf),
    UploadDataUrl(String),
    Retake,
    /// Send the captured photo for analysis and generation
    ConfirmCapture,
    ChangeFilter(FilterChange),
    Search(BrowseQuery),
    /// Request dish photos for visible cards that lack one
    LoadImages,
    SelectRecipe(String),
    ToggleSave(String),
    ToggleGlobalVoice,
    GlobalUtterance(String),
    Cooking(CookingInput),
    /// Advance timed prompts
    Tick,
    AddShoppingItem(String),
    ToggleShoppingItem(String),
    RemoveShoppingItem(String),
    ClearShoppingList,
    SignInGuest,
    SignInFederated,
    SignOut,
    ToggleStaple(String),
}

/// External collaborators the application is wired to
pub struct AppServices {
    pub gateway: Arc<dyn RecipeGateway>,
    pub store: SharedStore,
    pub profile: ProfileService,
    pub camera: Box<dyn Camera>,
    pub speech: SpeechFactory,
    pub localization: Arc<LocalizationManager>,
    pub language: Option<String>,
}

pub struct App {
    gateway: Arc<dyn RecipeGateway>,
    ratings: RatingsStore<SharedStore>,
    favorites: SavedRecipes<SharedStore>,
    profile: ProfileService,
    camera: Box<dyn Camera>,
    speech: SpeechFactory,
    localization: Arc<LocalizationManager>,
    language: Option<String>,

    context: SessionContext,
    capture: CaptureFlow,
    shopping: ShoppingList,
    saved: Vec<Recipe>,
    images: ImageRequests,
    query: BrowseQuery,
    cooking: Option<CookingSession>,
    global_speech: Box<dyn SpeechCapability>,
    global_listening: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("view", &self.context.view())
            .field("generated", &self.context.generated().len())
            .field("saved", &self.saved.len())
            .field("shopping", &self.shopping.len())
            .field("cooking", &self.cooking)
            .finish()
    }
}

impl App {
    pub fn new(services: AppServices) -> Self {
        let favorites = SavedRecipes::new(Arc::clone(&services.store));
        let saved = favorites.get_saved_recipes();
        let global_speech = (services.speech)();

        Self {
            gateway: services.gateway,
            ratings: RatingsStore::new(services.store),
            favorites,
            profile: services.profile,
            camera: services.camera,
            speech: services.speech,
            localization: services.localization,
            language: services.language,
            context: SessionContext::new(),
            capture: CaptureFlow::new(),
            shopping: ShoppingList::new(),
            saved,
            images: ImageRequests::new(),
            query: BrowseQuery::default(),
            cooking: None,
            global_speech,
            global_listening: false,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn capture(&self) -> &CaptureFlow {
        &self.capture
    }

    pub fn shopping(&self) -> &ShoppingList {
        &self.shopping
    }

    pub fn saved(&self) -> &[Recipe] {
        &self.saved
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved.iter().any(|r| r.id == id)
    }

    pub fn cooking(&self) -> Option<&CookingSession> {
        self.cooking.as_ref()
    }

    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    pub fn images(&self) -> &ImageRequests {
        &self.images
    }

    pub fn query(&self) -> &BrowseQuery {
        &self.query
    }

    pub fn localization(&self) -> &LocalizationManager {
        &self.localization
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_global_listening(&self) -> bool {
        self.global_listening
    }

    pub fn ratings(&self) -> &RatingsStore<SharedStore> {
        &self.ratings
    }

    /// Recipes of the current list view after search filtering
    pub fn visible_recipes(&self) -> Vec<&Recipe> {
        match self.context.view() {
            AppView::Saved => self.query.apply(&self.saved),
            _ => self.query.apply(self.context.generated()),
        }
    }

    fn t(&self, key: &str) -> String {
        self.localization.t_lang(key, self.language.as_deref())
    }

    fn t_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.localization.t_args_lang(key, args, self.language.as_deref())
    }

    pub async fn dispatch(&mut self, event: AppEvent) -> Vec<Notice> {
        self.dispatch_at(event, Instant::now()).await
    }

    /// Dispatch with an explicit clock reading for the timed cooking prompts
    pub async fn dispatch_at(&mut self, event: AppEvent, now: Instant) -> Vec<Notice> {
        debug!(event = ?event, "Dispatching event");

        match event {
            AppEvent::Navigate(view) => self.navigate(view),
            AppEvent::StartCamera => {
                self.capture.start_camera(self.camera.as_ref());
                self.capture_status()
            }
            AppEvent::StopCamera => {
                self.capture.stop_camera();
                vec![]
            }
            AppEvent::Snap => match self.capture.snap() {
                Ok(_) => vec![Notice::Info(self.t("capture-ready"))],
                Err(e) => vec![Notice::Info(self.upload_failed(&e))],
            },
            AppEvent::UploadFile(path) => match self.capture.upload_file(&path) {
                Ok(_) => vec![Notice::Info(self.t("capture-ready"))],
                Err(e) => vec![Notice::Info(self.upload_failed(&e))],
            },
            AppEvent::UploadDataUrl(data_url) => match self.capture.upload_data_url(&data_url) {
                Ok(_) => vec![Notice::Info(self.t("capture-ready"))],
                Err(e) => vec![Notice::Info(self.upload_failed(&e))],
            },
            AppEvent::Retake => {
                self.capture.retake(self.camera.as_ref());
                self.capture_status()
            }
            AppEvent::ConfirmCapture => self.analyze_capture().await,
            AppEvent::ChangeFilter(change) => self.change_filter(change).await,
            AppEvent::Search(query) => {
                self.query = query;
                if self.visible_recipes().is_empty() && !self.context.is_generating() {
                    vec![Notice::Info(self.t("no-recipes"))]
                } else {
                    vec![]
                }
            }
            AppEvent::LoadImages => {
                self.load_images().await;
                vec![]
            }
            AppEvent::SelectRecipe(id) => self.start_cooking(&id),
            AppEvent::ToggleSave(id) => self.toggle_save(&id),
            AppEvent::ToggleGlobalVoice => {
                self.context.toggle_global_voice();
                self.sync_global_voice();
                vec![]
            }
            AppEvent::GlobalUtterance(text) => self.global_utterance(&text).await,
            AppEvent::Cooking(input) => self.cooking_input(input, now),
            AppEvent::Tick => self.tick(now),
            AppEvent::AddShoppingItem(name) => {
                let added = self.shopping.add_items([name], None);
                self.shopping_added(added.len())
            }
            AppEvent::ToggleShoppingItem(id) => {
                self.shopping.toggle(&id);
                vec![]
            }
            AppEvent::RemoveShoppingItem(id) => {
                self.shopping.remove(&id);
                vec![]
            }
            AppEvent::ClearShoppingList => {
                self.shopping.clear();
                vec![]
            }
            AppEvent::SignInGuest => {
                self.profile.sign_in_guest().await;
                self.after_sign_in()
            }
            AppEvent::SignInFederated => {
                self.profile.sign_in_federated().await;
                self.after_sign_in()
            }
            AppEvent::SignOut => {
                self.profile.sign_out().await;
                vec![Notice::Info(self.t("signed-out"))]
            }
            AppEvent::ToggleStaple(item) => {
                if self.profile.toggle_staple(&item).await {
                    vec![Notice::Info(self.t("pantry-updated"))]
                } else {
                    vec![Notice::Info(self.t("profile-unavailable"))]
                }
            }
        }
    }

    fn upload_failed(&self, error: &impl std::fmt::Display) -> String {
        let error = error.to_string();
        self.t_args("upload-failed", &[("error", error.as_str())])
    }

    fn capture_status(&self) -> Vec<Notice> {
        match self.capture.status_key() {
            Some(key) => vec![Notice::Info(self.t(key))],
            None if self.capture.is_streaming() => vec![Notice::Info(self.t("camera-streaming"))],
            None => vec![],
        }
    }

    fn navigate(&mut self, view: AppView) -> Vec<Notice> {
        let mut notices = Vec::new();
        if view == AppView::Cooking && self.cooking.is_none() {
            return notices;
        }
        if self.cooking.is_some() && view != AppView::Cooking {
            notices.extend(self.exit_cooking());
        }
        if view != AppView::Home {
            self.capture.stop_camera();
        }
        self.context.navigate(view);
        notices
    }

    // Capture → analysis → generation

    async fn analyze_capture(&mut self) -> Vec<Notice> {
        let Some(image) = self.capture.confirm() else {
            return vec![Notice::Info(self.t("no-capture"))];
        };

        let mut notices = vec![Notice::Info(self.t("analyzing"))];
        self.context.begin_analysis();

        let ingredients = match self.gateway.analyze_fridge_image(&image).await {
            Ok(ingredients) => ingredients,
            Err(e) => {
                error_logging::log_gateway_error(&e, "analyze_fridge_image", None, e.status());
                observability::record_error_metrics("analysis", "app");
                self.context.analysis_failed();
                notices.push(Notice::Alert(self.t("analysis-failed")));
                return notices;
            }
        };

        if ingredients.is_empty() {
            notices.push(Notice::Info(self.t("no-ingredients")));
        } else {
            let joined = ingredients.join(", ");
            notices.push(Notice::Info(
                self.t_args("detected-ingredients", &[("ingredients", joined.as_str())]),
            ));
        }

        let request = self.context.analysis_complete(ingredients, self.profile.pantry());
        notices.push(Notice::Info(self.t("generating")));
        let result = self.gateway.generate_recipes(&request).await;
        notices.extend(self.generation_finished(result));
        notices
    }

    async fn change_filter(&mut self, change: FilterChange) -> Vec<Notice> {
        let Some(request) = self.context.apply_filter(change, self.profile.pantry()) else {
            return vec![Notice::Info(self.t("filters-updated"))];
        };

        let mut notices = vec![Notice::Info(self.t("generating"))];
        let result = self.gateway.generate_recipes(&request).await;
        notices.extend(self.generation_finished(result));
        notices
    }

    fn generation_finished(
        &mut self,
        result: Result<GeneratedRecipes, GatewayError>,
    ) -> Vec<Notice> {
        match self.context.finish_generation(result) {
            GenerationOutcome::Ready { count } => {
                info!(count, "Recipes ready");
                if count == 0 {
                    vec![Notice::Info(self.t("no-recipes"))]
                } else {
                    vec![]
                }
            }
            GenerationOutcome::CaptureFailed(e) => {
                error_logging::log_gateway_error(&e, "generate_recipes", None, e.status());
                observability::record_error_metrics("generation", "app");
                vec![Notice::Alert(self.t("generation-failed"))]
            }
            GenerationOutcome::RegenerationFailed(e) => {
                error_logging::log_gateway_error(&e, "regenerate_recipes", None, e.status());
                observability::record_error_metrics("regeneration", "app");
                vec![Notice::Info(self.t("regeneration-failed"))]
            }
            GenerationOutcome::Ignored => vec![],
        }
    }

    // Browsing

    /// Best-effort dish photos; a failure leaves the placeholder in place
    async fn load_images(&mut self) {
        let source: Vec<Recipe> = match self.context.view() {
            AppView::Saved => self.saved.clone(),
            _ => self.context.generated().to_vec(),
        };
        let pending = self.images.take_pending(&source);

        for recipe in pending {
            let terms = recipe.visual_terms();
            let result = self
                .gateway
                .generate_recipe_image(&recipe.title, &terms)
                .instrument(session_span("generate_image", &recipe.title))
                .await;

            match result {
                Ok(Some(image)) => self.apply_image(&recipe.id, &image_data_url(&image)),
                Ok(None) => {
                    debug!(recipe = %recipe.title, "No image produced");
                    self.images.mark_failed(&recipe.id);
                }
                Err(e) => {
                    warn!(recipe = %recipe.title, error = %e, "Image synthesis failed, using placeholder");
                    self.images.mark_failed(&recipe.id);
                }
            }
        }
    }

    /// Patch a new image everywhere the recipe appears
    fn apply_image(&mut self, id: &str, image_url: &str) {
        self.context.patch_image(id, image_url);
        patch_recipe_image(self.saved.iter_mut(), id, image_url);
        if let Some(session) = self.cooking.as_mut() {
            if session.recipe().id == id {
                session.set_image(image_url);
            }
        }
        if let Some(updated) = self.saved.iter().find(|r| r.id == id) {
            if let Err(e) = self.favorites.update_saved_recipe(updated) {
                error_logging::log_storage_error(&e, "update_saved_recipe", FAVORITES_KEY);
            }
        }
    }

    fn find_recipe(&self, id: &str) -> Option<Recipe> {
        let (first, second) = match self.context.view() {
            AppView::Saved => (&self.saved[..], self.context.generated()),
            _ => (self.context.generated(), &self.saved[..]),
        };
        first
            .iter()
            .chain(second.iter())
            .find(|r| r.id == id)
            .cloned()
    }

    fn toggle_save(&mut self, id: &str) -> Vec<Notice> {
        let Some(recipe) = self.find_recipe(id) else {
            return vec![];
        };
        match self.favorites.toggle_saved_recipe(&recipe) {
            Ok(saved) => {
                self.saved = saved;
                let key = if self.is_saved(id) { "recipe-saved" } else { "recipe-unsaved" };
                vec![Notice::Info(self.t(key))]
            }
            Err(e) => {
                error_logging::log_storage_error(&e, "toggle_saved_recipe", FAVORITES_KEY);
                vec![]
            }
        }
    }

    /// "4.5 (2 ratings)" or "Not rated yet"
    pub fn rating_summary(&self, title: &str) -> String {
        match self.ratings.average_rating(title) {
            Some(average) => {
                let average = format!("{:.1}", average);
                let count = self.ratings.rating_count(title).to_string();
                self.t_args(
                    "rating-summary",
                    &[("average", average.as_str()), ("count", count.as_str())],
                )
            }
            None => self.t("not-rated"),
        }
    }

    // Global voice

    fn sync_global_voice(&mut self) {
        let should_run = self.context.global_voice_should_run();
        if should_run && !self.global_listening {
            match self.global_speech.start_recognition() {
                Ok(()) => self.global_listening = true,
                Err(e) => {
                    error_logging::log_device_error(&e, "microphone", "start_global_recognition");
                    self.context.disable_global_voice();
                }
            }
        } else if !should_run && self.global_listening {
            self.global_speech.stop_recognition();
            self.global_listening = false;
        }
    }

    async fn global_utterance(&mut self, text: &str) -> Vec<Notice> {
        if !self.context.global_voice_should_run() {
            return vec![];
        }
        let Some(command) = GlobalVoiceCommand::classify(text) else {
            return vec![];
        };
        info!(command = command.name(), "Global voice command");
        observability::record_voice_command(command.name());
        self.change_filter(command.filter_change()).await
    }

    // Cooking

    fn start_cooking(&mut self, id: &str) -> Vec<Notice> {
        let Some(recipe) = self.find_recipe(id) else {
            return vec![];
        };
        if self.cooking.is_some() {
            self.exit_cooking();
        }

        let mut session = match CookingSession::new(recipe.clone(), (self.speech)()) {
            Ok(session) => session,
            Err(e) => return vec![Notice::Alert(e.to_string())],
        };

        self.context.select_recipe(recipe);
        self.sync_global_voice();
        let status = session.mount();
        self.cooking = Some(session);

        let mut notices = Vec::new();
        if let Some(key) = status.message_key() {
            notices.push(Notice::Info(self.t(key)));
        }
        notices.extend(self.step_notices());
        notices
    }

    fn exit_cooking(&mut self) -> Vec<Notice> {
        let Some(mut session) = self.cooking.take() else {
            return vec![];
        };
        session.exit();
        self.context.close_cooking();
        self.sync_global_voice();
        vec![Notice::Info(self.t("session-ended"))]
    }

    /// Progress line plus whichever prompt the current step shows
    pub fn step_notices(&self) -> Vec<Notice> {
        let Some(session) = self.cooking.as_ref() else {
            return vec![];
        };
        let current = (session.step() + 1).to_string();
        let total = session.step_count().to_string();
        let percent = format!("{:.0}", session.progress_percent());
        let mut notices = vec![Notice::Info(self.t_args(
            "step-progress",
            &[
                ("current", current.as_str()),
                ("total", total.as_str()),
                ("percent", percent.as_str()),
            ],
        ))];

        if session.shows_missing_prompt() {
            let count = session.recipe().missing_ingredients.len().to_string();
            notices.push(Notice::Info(self.t_args("missing-prompt", &[("count", count.as_str())])));
        }
        if session.shows_rating_prompt() {
            let key = if session.rating().has_rated() {
                "rating-thanks"
            } else {
                "rating-prompt"
            };
            notices.push(Notice::Info(self.t(key)));
        }
        notices
    }

    fn cooking_input(&mut self, input: CookingInput, now: Instant) -> Vec<Notice> {
        if matches!(input, CookingInput::Exit) {
            return self.exit_cooking();
        }
        let Some(session) = self.cooking.as_mut() else {
            return vec![];
        };

        let mut effects = Vec::new();
        let mut moved = false;
        let mut status = None;
        let mut no_photo = false;

        match input {
            CookingInput::Next => moved = session.next(),
            CookingInput::Previous => moved = session.prev(),
            CookingInput::Jump(k) => moved = session.jump(k),
            CookingInput::ToggleRead => session.toggle_read(),
            CookingInput::StopReading => session.stop_speaking(),
            CookingInput::AddMissing => effects.extend(session.add_missing(now)),
            CookingInput::Rate(stars) => {
                session.select_star(stars, now);
            }
            CookingInput::ToggleIngredients => session.toggle_ingredients(),
            CookingInput::OpenPhoto => no_photo = !session.open_photo(),
            CookingInput::ClosePhoto => session.close_photo(),
            CookingInput::ZoomIn => session.viewer_mut().zoom_in(),
            CookingInput::ZoomOut => session.viewer_mut().zoom_out(),
            CookingInput::Wheel(delta) => session.viewer_mut().wheel(delta),
            CookingInput::ResetZoom => session.viewer_mut().reset(),
            CookingInput::ToggleVoice => status = Some(session.toggle_voice()),
            CookingInput::Utterance(text) => {
                let before = session.step();
                let dispatch = session.handle_utterance(&text, now);
                moved = session.step() != before;
                effects.extend(dispatch.effect);
            }
            CookingInput::SpeechFinished(id) => session.on_speech_finished(id),
            CookingInput::SpeechFailed(id, error) => session.on_speech_error(id, &error),
            CookingInput::RecognitionEnded => {
                session.on_recognition_ended();
                status = Some(session.voice_status());
            }
            CookingInput::RecognitionFailed(error) => {
                session.on_recognition_error(&error);
                status = Some(session.voice_status());
            }
            CookingInput::Exit => {}
        }

        effects.extend(session.poll(now));

        let mut notices = Vec::new();
        if let Some(key) = status.and_then(|s| s.message_key()) {
            notices.push(Notice::Info(self.t(key)));
        }
        if no_photo {
            notices.push(Notice::Info(self.t("no-photo")));
        }
        if moved {
            notices.extend(self.step_notices());
        }
        notices.extend(self.apply_effects(effects));
        notices
    }

    fn tick(&mut self, now: Instant) -> Vec<Notice> {
        let effects = match self.cooking.as_mut() {
            Some(session) => session.poll(now),
            None => vec![],
        };
        self.apply_effects(effects)
    }

    fn apply_effects(&mut self, effects: Vec<CookingEffect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                CookingEffect::AddToShoppingList { items, recipe_title } => {
                    let added = self.shopping.add_items(items, Some(recipe_title.as_str()));
                    notices.push(Notice::Info(self.t("added-confirmation")));
                    notices.extend(self.shopping_added(added.len()));
                }
                CookingEffect::RateRecipe { title, stars } => {
                    match self.ratings.save_rating(&title, stars) {
                        Ok(()) => {
                            self.context.bump_ratings_version();
                            notices.push(Notice::Info(self.t("rating-thanks")));
                        }
                        Err(e) => {
                            error_logging::log_storage_error(&e, "save_rating", RATINGS_KEY)
                        }
                    }
                }
            }
        }
        notices
    }

    fn shopping_added(&self, count: usize) -> Vec<Notice> {
        if count == 0 {
            return vec![];
        }
        let count = count.to_string();
        vec![Notice::Info(self.t_args("shopping-added", &[("count", count.as_str())]))]
    }

    // Profile

    fn after_sign_in(&mut self) -> Vec<Notice> {
        match self.profile.profile() {
            Some(profile) => {
                let name = profile.display_name().to_string();
                let dietary = profile.preferences.dietary;
                self.context.seed_dietary(dietary);
                vec![Notice::Info(self.t_args("signed-in", &[("name", name.as_str())]))]
            }
            None => vec![Notice::Info(self.t("profile-unavailable"))],
        }
    }

    /// Tear down device resources before the process exits
    pub fn shutdown(&mut self) {
        self.exit_cooking();
        self.capture.stop_camera();
        if self.global_listening {
            self.global_speech.stop_recognition();
            self.global_listening = false;
        }
    }
}
