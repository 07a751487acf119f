mod test_helpers;

use chef_snap::cooking::{CookingEffect, CookingSession, VoiceCommand, VoiceStatus, ADDED_CONFIRMATION, RATING_LOCK};
use chef_snap::speech::{NoopSpeech, RecordingSpeech, SpeechCall, SpeechError};
use std::time::{Duration, Instant};
use test_helpers::sample_recipe;

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(steps: usize, missing: &[&str]) -> (CookingSession, RecordingSpeech) {
        let speech = RecordingSpeech::new();
        let recipe = sample_recipe("r1", "Spinach Omelette", steps, missing);
        let session = CookingSession::new(recipe, Box::new(speech.clone())).expect("recipe has steps");
        (session, speech)
    }

    fn spoken_ids(speech: &RecordingSpeech) -> Vec<u64> {
        speech
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                SpeechCall::Speak(u) => Some(u.id),
                _ => None,
            })
            .collect()
    }

    /// A recipe without steps cannot be cooked
    #[test]
    fn test_session_requires_steps() {
        let recipe = sample_recipe("r0", "Empty", 0, &[]);
        let result = CookingSession::new(recipe, Box::new(RecordingSpeech::new()));
        assert!(result.is_err());
    }

    /// Navigation stays within [0, n-1]
    #[test]
    fn test_navigation_is_bounded() {
        let (mut session, _) = session_with(3, &[]);
        assert!(!session.prev());
        assert_eq!(session.step(), 0);

        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.step(), 2);
        assert!(session.is_last_step());
        assert_eq!(session.current_step_text(), "Step 3 of Spinach Omelette");
        assert!((session.progress_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jump_is_one_indexed() {
        let (mut session, _) = session_with(4, &[]);
        assert!(session.jump(3));
        assert_eq!(session.step(), 2);
        assert!(!session.jump(0));
        assert!(!session.jump(5));
        assert_eq!(session.step(), 2);
    }

    /// Every step transition silences narration
    #[test]
    fn test_step_change_cancels_narration() {
        let (mut session, speech) = session_with(3, &[]);
        session.narrate();
        assert!(session.is_reading());

        session.next();
        assert!(!session.is_reading());
        assert!(speech.count(&SpeechCall::CancelSpeech) >= 1);
    }

    /// Re-narrating while reading cancels the previous utterance exactly once
    #[test]
    fn test_narrate_while_reading_cancels_once() {
        let (mut session, speech) = session_with(2, &[]);
        session.narrate();
        speech.clear();

        session.narrate();
        assert_eq!(speech.count(&SpeechCall::CancelSpeech), 1);
        assert_eq!(speech.spoken(), vec!["Step 1 of Spinach Omelette".to_string()]);
        assert!(session.is_reading());
    }

    /// A late completion from a superseded utterance does not clear the flag
    #[test]
    fn test_stale_speech_events_are_ignored() {
        let (mut session, speech) = session_with(2, &[]);
        session.narrate();
        session.narrate();
        let ids = spoken_ids(&speech);
        assert_eq!(ids.len(), 2);

        session.on_speech_finished(ids[0]);
        assert!(session.is_reading());
        session.on_speech_error(ids[0], &SpeechError::Failed("interrupted".to_string()));
        assert!(session.is_reading());

        session.on_speech_finished(ids[1]);
        assert!(!session.is_reading());
    }

    #[test]
    fn test_toggle_read() {
        let (mut session, _) = session_with(2, &[]);
        session.toggle_read();
        assert!(session.is_reading());
        session.toggle_read();
        assert!(!session.is_reading());
    }

    /// Add-missing emits once, then stays disabled for the confirmation window
    #[test]
    fn test_add_missing_respects_confirmation() {
        let (mut session, _) = session_with(3, &["Feta", "Chives"]);
        let start = Instant::now();
        assert!(session.shows_missing_prompt());

        let effect = session.add_missing(start);
        assert_eq!(
            effect,
            Some(CookingEffect::AddToShoppingList {
                items: vec!["Feta".to_string(), "Chives".to_string()],
                recipe_title: "Spinach Omelette".to_string(),
            })
        );
        assert!(session.add_missing(start + Duration::from_millis(500)).is_none());

        let later = start + ADDED_CONFIRMATION;
        session.poll(later);
        assert!(!session.is_added_confirmation_active(later));
        assert!(session.add_missing(later).is_some());
    }

    #[test]
    fn test_add_missing_with_nothing_missing_is_noop() {
        let (mut session, _) = session_with(3, &[]);
        assert!(!session.shows_missing_prompt());
        assert!(session.add_missing(Instant::now()).is_none());
    }

    /// Stars only count on the last step, and are committed after the lock
    #[test]
    fn test_rating_commits_after_lock() {
        let (mut session, _) = session_with(2, &[]);
        let start = Instant::now();
        assert!(!session.select_star(4, start));

        session.next();
        assert!(session.select_star(4, start));
        assert!(!session.select_star(2, start + Duration::from_millis(100)));
        assert!(session.poll(start + Duration::from_millis(300)).is_empty());

        let effects = session.poll(start + RATING_LOCK);
        assert_eq!(
            effects,
            vec![CookingEffect::RateRecipe {
                title: "Spinach Omelette".to_string(),
                stars: 4,
            }]
        );
        assert!(session.poll(start + RATING_LOCK * 2).is_empty());
        assert!(session.rating().has_rated());
    }

    /// The ingredients overlay covers the rating prompt, and stars are ignored meanwhile
    #[test]
    fn test_rating_hidden_under_ingredients_overlay() {
        let (mut session, _) = session_with(2, &[]);
        let start = Instant::now();
        session.next();
        assert!(session.shows_rating_prompt());

        session.show_ingredients();
        assert!(!session.shows_rating_prompt());
        assert!(!session.select_star(5, start));
        assert!(session.poll(start + RATING_LOCK).is_empty());

        session.hide_ingredients();
        assert!(session.shows_rating_prompt());
        assert!(session.select_star(5, start));
    }

    #[test]
    fn test_voice_dispatch() {
        let (mut session, speech) = session_with(3, &["Feta"]);
        let now = Instant::now();

        let dispatch = session.handle_utterance("Next step please", now);
        assert_eq!(dispatch.command, Some(VoiceCommand::Next));
        assert_eq!(session.step(), 1);

        session.handle_utterance("go back", now);
        assert_eq!(session.step(), 0);

        let dispatch = session.handle_utterance("add to my shopping list", now);
        assert_eq!(dispatch.command, Some(VoiceCommand::AddMissingToShoppingList));
        assert!(dispatch.effect.is_some());

        session.handle_utterance("show ingredients", now);
        assert!(session.ingredients_visible());
        // Anything mentioning ingredients opens the overlay, even "hide"
        let dispatch = session.handle_utterance("hide the ingredients", now);
        assert_eq!(dispatch.command, Some(VoiceCommand::ShowIngredients));
        assert!(session.ingredients_visible());
        session.hide_ingredients();
        assert!(!session.ingredients_visible());

        speech.clear();
        session.handle_utterance("read it", now);
        assert_eq!(speech.spoken().len(), 1);

        let dispatch = session.handle_utterance("what time is it", now);
        assert_eq!(dispatch.command, None);
        assert_eq!(session.step(), 0);
    }

    #[test]
    fn test_mount_starts_recognition_once() {
        let (mut session, speech) = session_with(2, &[]);
        assert_eq!(session.mount(), VoiceStatus::Listening);
        session.mount();
        assert_eq!(speech.count(&SpeechCall::StartRecognition), 1);

        session.on_recognition_ended();
        assert_eq!(session.voice_status(), VoiceStatus::Off);
        assert_eq!(speech.count(&SpeechCall::StartRecognition), 1);
    }

    #[test]
    fn test_denied_microphone() {
        let speech = RecordingSpeech::failing_recognition(SpeechError::PermissionDenied);
        let recipe = sample_recipe("r1", "Soup", 2, &[]);
        let mut session = CookingSession::new(recipe, Box::new(speech)).expect("recipe has steps");
        assert_eq!(session.mount(), VoiceStatus::MicDenied);
        assert_eq!(session.voice_status().message_key(), Some("mic-denied"));
    }

    /// Without speech support the session still works, silently
    #[test]
    fn test_unsupported_platform() {
        let recipe = sample_recipe("r1", "Soup", 2, &[]);
        let mut session = CookingSession::new(recipe, Box::new(NoopSpeech)).expect("recipe has steps");
        assert_eq!(session.mount(), VoiceStatus::Unsupported);
        assert_eq!(session.toggle_voice(), VoiceStatus::Unsupported);

        session.narrate();
        assert!(!session.is_reading());
        assert!(session.next());
    }

    #[test]
    fn test_recognition_restart_after_toggle() {
        let (mut session, speech) = session_with(2, &[]);
        session.mount();
        assert_eq!(session.toggle_voice(), VoiceStatus::Off);
        assert_eq!(speech.count(&SpeechCall::StopRecognition), 1);

        assert_eq!(session.toggle_voice(), VoiceStatus::Listening);
        session.on_recognition_started();
        assert_eq!(session.voice_status().message_key(), Some("voice-listening"));
    }

    /// Exit releases the microphone and silences narration, once
    #[test]
    fn test_exit_is_idempotent() {
        let (mut session, speech) = session_with(2, &[]);
        session.mount();
        session.narrate();

        session.exit();
        assert!(session.is_exited());
        assert!(!session.is_reading());
        assert_eq!(speech.count(&SpeechCall::StopRecognition), 1);

        session.exit();
        assert_eq!(speech.count(&SpeechCall::StopRecognition), 1);
    }

    #[test]
    fn test_drop_releases_devices() {
        let (mut session, speech) = session_with(2, &[]);
        session.mount();
        drop(session);
        assert_eq!(speech.count(&SpeechCall::StopRecognition), 1);
        assert!(speech.count(&SpeechCall::CancelSpeech) >= 1);
    }

    #[test]
    fn test_photo_viewer_needs_image() {
        let (mut session, _) = session_with(2, &[]);
        assert!(!session.open_photo());

        session.set_image("data:image/png;base64,AAAA");
        assert!(session.open_photo());
        session.viewer_mut().zoom_in();
        assert!((session.viewer().zoom() - 1.5).abs() < f64::EPSILON);
        session.close_photo();
        assert!(!session.viewer().is_open());
    }
}
