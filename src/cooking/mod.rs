//! Cooking mode: step navigation, narration, voice control, rating and photo viewer.

pub mod rating;
pub mod session;
pub mod viewer;
pub mod voice;

pub use rating::{RatingCapture, RatingState, RATING_LOCK};
pub use session::{CookingEffect, CookingSession, VoiceDispatch, VoiceStatus, ADDED_CONFIRMATION};
pub use viewer::{ImageViewer, Point};
pub use voice::{GlobalVoiceCommand, VoiceCommand};
