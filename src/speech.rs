//! Speech recognition and synthesis behind one capability interface.
//!
//! The cooking session never talks to a platform API directly. It calls
//! [`SpeechCapability`] and is told about asynchronous outcomes (utterance
//! finished, recognition ended, a phrase was heard) through its own callback
//! methods.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Narration speed used for cooking steps
pub const NARRATION_RATE: f32 = 0.9;

/// Why a speech request could not be honored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// The platform has no such capability
    Unsupported,
    /// The user refused microphone access
    PermissionDenied,
    /// Anything else the platform reported
    Failed(String),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::Unsupported => write!(f, "[SPEECH] not supported"),
            SpeechError::PermissionDenied => write!(f, "[SPEECH] permission denied"),
            SpeechError::Failed(msg) => write!(f, "[SPEECH] {}", msg),
        }
    }
}

impl std::error::Error for SpeechError {}

/// One text-to-speech request. The id comes back in completion callbacks so
/// that late events from a cancelled utterance can be told apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
    pub rate: f32,
}

pub trait SpeechCapability: Send {
    fn start_recognition(&mut self) -> Result<(), SpeechError>;
    fn stop_recognition(&mut self);
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError>;
    fn cancel_speech(&mut self);
}

/// For platforms with neither recognition nor synthesis
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpeech;

impl SpeechCapability for NoopSpeech {
    fn start_recognition(&mut self) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }

    fn stop_recognition(&mut self) {}

    fn speak(&mut self, _utterance: Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }

    fn cancel_speech(&mut self) {}
}

/// A call made against [`RecordingSpeech`]
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechCall {
    StartRecognition,
    StopRecognition,
    Speak(Utterance),
    CancelSpeech,
}

/// Records every call; clones share the same log. Recognition outcome is scriptable.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpeech {
    calls: Arc<Mutex<Vec<SpeechCall>>>,
    recognition_error: Option<SpeechError>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `start_recognition` fail with `error`
    pub fn failing_recognition(error: SpeechError) -> Self {
        Self {
            recognition_error: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SpeechCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &SpeechCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                SpeechCall::Speak(u) => Some(u.text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl SpeechCapability for RecordingSpeech {
    fn start_recognition(&mut self) -> Result<(), SpeechError> {
        self.calls.lock().push(SpeechCall::StartRecognition);
        match &self.recognition_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn stop_recognition(&mut self) {
        self.calls.lock().push(SpeechCall::StopRecognition);
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        self.calls.lock().push(SpeechCall::Speak(utterance));
        Ok(())
    }

    fn cancel_speech(&mut self) {
        self.calls.lock().push(SpeechCall::CancelSpeech);
    }
}
