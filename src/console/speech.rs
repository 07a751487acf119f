//! Terminal speech: narration is printed, typed lines stand in for recognition.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::speech::{SpeechCapability, SpeechError, Utterance};

/// Completion events reported back to the cooking session
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Finished(u64),
    Failed(u64, SpeechError),
}

/// Prints each utterance and reports it finished right away. Recognition is
/// the keyboard, so it always starts.
#[derive(Debug, Clone)]
pub struct ConsoleSpeech {
    events: UnboundedSender<SpeechEvent>,
}

impl ConsoleSpeech {
    pub fn new(events: UnboundedSender<SpeechEvent>) -> Self {
        Self { events }
    }

    /// A capability plus the receiver its completion events arrive on
    pub fn channel() -> (Self, UnboundedReceiver<SpeechEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl SpeechCapability for ConsoleSpeech {
    fn start_recognition(&mut self) -> Result<(), SpeechError> {
        debug!("Keyboard recognition started");
        Ok(())
    }

    fn stop_recognition(&mut self) {
        debug!("Keyboard recognition stopped");
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        println!("🔊 {}", utterance.text);
        self.events
            .send(SpeechEvent::Finished(utterance.id))
            .map_err(|e| SpeechError::Failed(e.to_string()))
    }

    fn cancel_speech(&mut self) {}
}
