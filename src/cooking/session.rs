//! Step-by-step cooking session.
//!
//! The session owns the step cursor, narration lifecycle, voice recognition
//! status, rating prompt, add-missing confirmation and the two overlays
//! (ingredients list and photo viewer). Platform speech goes through
//! [`SpeechCapability`]; asynchronous outcomes are fed back through the
//! `on_*` methods. Timed sub-states take the current [`Instant`] so callers
//! decide which clock drives them.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::rating::RatingCapture;
use super::viewer::ImageViewer;
use super::voice::VoiceCommand;
use crate::errors::{error_logging, AppError, AppResult};
use crate::models::Recipe;
use crate::observability::{record_cooking_session, record_voice_command, session_span};
use crate::speech::{SpeechCapability, SpeechError, Utterance, NARRATION_RATE};

/// How long the "added" confirmation stays up after adding missing items
pub const ADDED_CONFIRMATION: Duration = Duration::from_secs(2);

/// Work the session hands back to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookingEffect {
    AddToShoppingList { items: Vec<String>, recipe_title: String },
    RateRecipe { title: String, stars: u8 },
}

/// Inline status of hands-free control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceStatus {
    /// Not started yet
    Idle,
    Listening,
    Off,
    MicDenied,
    Unsupported,
}

impl VoiceStatus {
    /// Localization key for the inline status text
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            VoiceStatus::Idle => None,
            VoiceStatus::Listening => Some("voice-listening"),
            VoiceStatus::Off => Some("voice-off"),
            VoiceStatus::MicDenied => Some("mic-denied"),
            VoiceStatus::Unsupported => Some("voice-unsupported"),
        }
    }

    fn from_error(error: &SpeechError) -> Self {
        match error {
            SpeechError::PermissionDenied => VoiceStatus::MicDenied,
            SpeechError::Unsupported => VoiceStatus::Unsupported,
            SpeechError::Failed(_) => VoiceStatus::Off,
        }
    }
}

/// Result of feeding one heard phrase to the session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoiceDispatch {
    pub command: Option<VoiceCommand>,
    pub effect: Option<CookingEffect>,
}

pub struct CookingSession {
    recipe: Recipe,
    step: usize,
    furthest_step: usize,
    speech: Box<dyn SpeechCapability>,
    /// Id of the utterance currently being narrated
    reading: Option<u64>,
    next_utterance_id: u64,
    voice: VoiceStatus,
    mounted: bool,
    exited: bool,
    show_ingredients: bool,
    viewer: ImageViewer,
    rating: RatingCapture,
    added_until: Option<Instant>,
}

impl std::fmt::Debug for CookingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookingSession")
            .field("recipe", &self.recipe.title)
            .field("step", &self.step)
            .field("reading", &self.reading)
            .field("voice", &self.voice)
            .field("exited", &self.exited)
            .finish()
    }
}

impl CookingSession {
    /// A session needs at least one step to cook
    pub fn new(recipe: Recipe, speech: Box<dyn SpeechCapability>) -> AppResult<Self> {
        if recipe.steps.is_empty() {
            let err = AppError::Validation(format!("Recipe '{}' has no steps", recipe.title));
            error_logging::log_validation_error(&err, "cooking_session_new", "recipe", Some(&recipe.title));
            return Err(err);
        }

        Ok(Self {
            recipe,
            step: 0,
            furthest_step: 0,
            speech,
            reading: None,
            next_utterance_id: 1,
            voice: VoiceStatus::Idle,
            mounted: false,
            exited: false,
            show_ingredients: false,
            viewer: ImageViewer::new(),
            rating: RatingCapture::new(),
            added_until: None,
        })
    }

    /// Start recognition. Only the first call has any effect.
    pub fn mount(&mut self) -> VoiceStatus {
        if self.mounted {
            return self.voice;
        }
        self.mounted = true;
        let _span = session_span("mount", &self.recipe.title).entered();
        info!(steps = self.recipe.steps.len(), "Cooking session started");
        self.start_recognition();
        self.voice
    }

    fn start_recognition(&mut self) {
        match self.speech.start_recognition() {
            Ok(()) => self.voice = VoiceStatus::Listening,
            Err(err) => {
                error_logging::log_device_error(&err, "microphone", "start_recognition");
                self.voice = VoiceStatus::from_error(&err);
            }
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Current step, 0-indexed
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.recipe.steps.len()
    }

    pub fn current_step_text(&self) -> &str {
        &self.recipe.steps[self.step]
    }

    pub fn progress_percent(&self) -> f64 {
        (self.step + 1) as f64 / self.step_count() as f64 * 100.0
    }

    pub fn is_first_step(&self) -> bool {
        self.step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 == self.step_count()
    }

    pub fn shows_missing_prompt(&self) -> bool {
        self.is_first_step() && !self.recipe.missing_ingredients.is_empty()
    }

    /// The rating prompt sits under the ingredients overlay while it is open
    pub fn shows_rating_prompt(&self) -> bool {
        self.is_last_step() && !self.show_ingredients
    }

    pub fn is_reading(&self) -> bool {
        self.reading.is_some()
    }

    pub fn voice_status(&self) -> VoiceStatus {
        self.voice
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn ingredients_visible(&self) -> bool {
        self.show_ingredients
    }

    pub fn viewer(&self) -> &ImageViewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ImageViewer {
        &mut self.viewer
    }

    pub fn rating(&self) -> &RatingCapture {
        &self.rating
    }

    pub fn is_added_confirmation_active(&self, now: Instant) -> bool {
        self.added_until.is_some_and(|until| now < until)
    }

    // Navigation

    pub fn next(&mut self) -> bool {
        if self.is_last_step() {
            return false;
        }
        self.move_to(self.step + 1);
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.is_first_step() {
            return false;
        }
        self.move_to(self.step - 1);
        true
    }

    /// Jump to step `k`, 1-indexed
    pub fn jump(&mut self, k: usize) -> bool {
        if k < 1 || k > self.step_count() {
            return false;
        }
        self.move_to(k - 1);
        true
    }

    fn move_to(&mut self, index: usize) {
        self.stop_speaking();
        self.step = index;
        self.furthest_step = self.furthest_step.max(index);
        debug!(step = index + 1, total = self.step_count(), "Moved to step");
    }

    // Narration

    /// Read the current step aloud, cancelling any narration in progress
    pub fn narrate(&mut self) {
        if self.reading.take().is_some() {
            self.speech.cancel_speech();
        }

        let utterance = Utterance {
            id: self.next_utterance_id,
            text: self.current_step_text().to_string(),
            rate: NARRATION_RATE,
        };
        self.next_utterance_id += 1;
        let id = utterance.id;

        match self.speech.speak(utterance) {
            Ok(()) => self.reading = Some(id),
            Err(err) => error_logging::log_device_error(&err, "speaker", "speak"),
        }
    }

    pub fn toggle_read(&mut self) {
        if self.is_reading() {
            self.stop_speaking();
        } else {
            self.narrate();
        }
    }

    pub fn stop_speaking(&mut self) {
        self.speech.cancel_speech();
        self.reading = None;
    }

    /// Natural end of an utterance. Events for superseded utterances are ignored.
    pub fn on_speech_finished(&mut self, utterance_id: u64) {
        if self.reading == Some(utterance_id) {
            self.reading = None;
        }
    }

    pub fn on_speech_error(&mut self, utterance_id: u64, error: &SpeechError) {
        if self.reading == Some(utterance_id) {
            warn!(error = %error, "Narration failed");
            self.reading = None;
        }
    }

    // Shopping list and rating

    /// Add every missing ingredient to the shopping list. Disabled while the
    /// confirmation is showing or when nothing is missing.
    pub fn add_missing(&mut self, now: Instant) -> Option<CookingEffect> {
        if self.recipe.missing_ingredients.is_empty() || self.is_added_confirmation_active(now) {
            return None;
        }
        self.added_until = Some(now + ADDED_CONFIRMATION);
        Some(CookingEffect::AddToShoppingList {
            items: self.recipe.missing_labels(),
            recipe_title: self.recipe.title.clone(),
        })
    }

    /// Click a star on the rating prompt
    pub fn select_star(&mut self, stars: u8, now: Instant) -> bool {
        self.shows_rating_prompt() && self.rating.select(stars, now)
    }

    /// Advance timed sub-states
    pub fn poll(&mut self, now: Instant) -> Vec<CookingEffect> {
        let mut effects = Vec::new();

        if let Some(stars) = self.rating.poll(now) {
            info!(recipe = %self.recipe.title, stars, "Recipe rated");
            effects.push(CookingEffect::RateRecipe {
                title: self.recipe.title.clone(),
                stars,
            });
        }

        if self.added_until.is_some_and(|until| now >= until) {
            self.added_until = None;
        }

        effects
    }

    // Overlays

    pub fn toggle_ingredients(&mut self) {
        self.show_ingredients = !self.show_ingredients;
    }

    pub fn show_ingredients(&mut self) {
        self.show_ingredients = true;
    }

    pub fn hide_ingredients(&mut self) {
        self.show_ingredients = false;
    }

    pub fn open_photo(&mut self) -> bool {
        self.viewer.open(self.recipe.has_image())
    }

    pub fn close_photo(&mut self) {
        self.viewer.close();
    }

    /// Keep the viewer in sync when a dish photo arrives mid-session
    pub fn set_image(&mut self, image_url: &str) {
        self.recipe.image_url = Some(image_url.to_string());
    }

    // Voice

    pub fn toggle_voice(&mut self) -> VoiceStatus {
        match self.voice {
            VoiceStatus::Listening => {
                self.speech.stop_recognition();
                self.voice = VoiceStatus::Off;
            }
            VoiceStatus::Unsupported => {}
            _ => self.start_recognition(),
        }
        self.voice
    }

    pub fn on_recognition_started(&mut self) {
        self.voice = VoiceStatus::Listening;
    }

    /// Recognition stopped on its own; it is not restarted
    pub fn on_recognition_ended(&mut self) {
        if self.voice == VoiceStatus::Listening {
            self.voice = VoiceStatus::Off;
        }
    }

    pub fn on_recognition_error(&mut self, error: &SpeechError) {
        error_logging::log_device_error(error, "microphone", "recognition");
        self.voice = VoiceStatus::from_error(error);
    }

    /// Dispatch a finalized utterance. Unrecognized phrases are ignored.
    pub fn handle_utterance(&mut self, utterance: &str, now: Instant) -> VoiceDispatch {
        let Some(command) = VoiceCommand::classify(utterance) else {
            debug!(utterance = %utterance, "Ignoring unrecognized voice input");
            return VoiceDispatch::default();
        };

        info!(command = command.name(), "Voice command");
        record_voice_command(command.name());

        let effect = match command {
            VoiceCommand::Next => {
                self.next();
                None
            }
            VoiceCommand::Previous => {
                self.prev();
                None
            }
            VoiceCommand::ReadStep => {
                self.stop_speaking();
                self.narrate();
                None
            }
            VoiceCommand::StopReading => {
                self.stop_speaking();
                None
            }
            VoiceCommand::AddMissingToShoppingList => self.add_missing(now),
            VoiceCommand::ShowIngredients => {
                self.show_ingredients();
                None
            }
            VoiceCommand::HideIngredients => {
                self.hide_ingredients();
                None
            }
            VoiceCommand::ShowPhoto => {
                self.open_photo();
                None
            }
            VoiceCommand::ClosePhoto => {
                self.close_photo();
                None
            }
        };

        VoiceDispatch {
            command: Some(command),
            effect,
        }
    }

    /// Leave the session: release the microphone and silence narration
    pub fn exit(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;
        self.speech.stop_recognition();
        self.speech.cancel_speech();
        self.reading = None;
        self.viewer.close();
        record_cooking_session(self.furthest_step + 1, self.step_count());
        info!(
            recipe = %self.recipe.title,
            steps_viewed = self.furthest_step + 1,
            total_steps = self.step_count(),
            "Cooking session ended"
        );
    }
}

impl Drop for CookingSession {
    fn drop(&mut self) {
        if !self.exited {
            self.exit();
        }
    }
}
