//! Speech source lifecycle: continuous re-arm, error backoff and permission.

use crate::helpers::{Harness, Options, four_apps};
use cosmic_autopilot::ports::{SpeechErrorKind, SpeechEvent, SpeechSettings};
use cosmic_autopilot::showcase::ShowcaseInput;
use cosmic_autopilot::status::{StatusUpdate, VoiceIndicator};
use cosmic_autopilot::timer::TimerKind;

fn speech(h: &mut Harness, event: SpeechEvent) {
    h.showcase.handle_input(ShowcaseInput::Speech(event));
}

/// The source stops on its own and reports it.
fn end_utterance(h: &mut Harness) {
    h.speech.finish();
    speech(h, SpeechEvent::Ended);
}

#[test]
fn recognition_settings_are_applied_once_at_startup() {
    let h = Harness::new(four_apps());
    assert_eq!(
        h.speech.settings(),
        Some(SpeechSettings::single_utterance("en-US"))
    );
    assert_eq!(h.speech.starts(), 0);
}

#[test]
fn continuous_mode_rearms_after_each_utterance() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start();
    h.say("enable continuous mode", 0.9);
    assert!(h.showcase.interpreter().is_continuous());
    assert_eq!(h.speech.starts(), 1);

    speech(&mut h, SpeechEvent::Started);
    speech(
        &mut h,
        SpeechEvent::Result {
            utterance: "next app".to_owned(),
            confidence: 0.9,
        },
    );
    end_utterance(&mut h);
    assert!(h.timers.has_pending(TimerKind::VoiceRearm));

    h.advance(499);
    assert_eq!(h.speech.starts(), 1);
    h.advance(1);
    assert_eq!(h.speech.starts(), 2);
    assert!(h.showcase.interpreter().is_listening());
    assert_eq!(h.controller().current_index(), Some(1));
}

#[test]
fn single_shot_listening_does_not_rearm() {
    let mut h = Harness::new(four_apps());
    assert!(h.showcase.interpreter_mut().start_listening());
    end_utterance(&mut h);
    assert!(!h.timers.has_pending(TimerKind::VoiceRearm));
    h.advance(5_000);
    assert_eq!(h.speech.starts(), 1);
}

#[test]
fn disabling_continuous_cancels_pending_rearm() {
    let mut h = Harness::new(four_apps());
    h.say("enable continuous mode", 0.9);
    end_utterance(&mut h);
    assert!(h.timers.has_pending(TimerKind::VoiceRearm));

    h.say("disable continuous mode", 0.9);
    assert!(!h.showcase.interpreter().is_continuous());
    assert!(!h.timers.has_pending(TimerKind::VoiceRearm));
    h.advance(2_000);
    assert_eq!(h.speech.starts(), 1);
    assert!(h.notifier.saw("Continuous listening disabled"));
}

#[test]
fn transient_error_backs_off_longer_than_end() {
    let mut h = Harness::new(four_apps());
    h.say("enable continuous mode", 0.9);

    h.speech.finish();
    speech(&mut h, SpeechEvent::Error(SpeechErrorKind::NoSpeech));
    speech(&mut h, SpeechEvent::Ended);
    assert!(h.notifier.saw("No speech detected"));

    h.advance(500);
    assert_eq!(h.speech.starts(), 1);
    h.advance(500);
    assert_eq!(h.speech.starts(), 2);
}

#[test]
fn permission_denied_blocks_rearm_until_manual_start() {
    let mut h = Harness::new(four_apps());
    h.say("enable continuous mode", 0.9);

    h.speech.finish();
    speech(&mut h, SpeechEvent::Error(SpeechErrorKind::NotAllowed));
    speech(&mut h, SpeechEvent::Ended);
    assert!(h.notifier.saw("Microphone access denied"));
    assert!(h.showcase.interpreter().permission_denied());
    assert!(!h.timers.has_pending(TimerKind::VoiceRearm));
    h.advance(5_000);
    assert_eq!(h.speech.starts(), 1);

    assert!(h.showcase.interpreter_mut().start_listening());
    assert!(!h.showcase.interpreter().permission_denied());
    assert_eq!(h.speech.starts(), 2);
}

#[test]
fn stop_listening_is_safe_when_idle() {
    let mut h = Harness::new(four_apps());
    h.showcase.interpreter_mut().stop_listening();
    assert!(h.notifier.saw("Voice control is not listening"));

    h.showcase.interpreter_mut().start_listening();
    h.say("stop listening", 0.9);
    assert!(h.notifier.saw("Voice control stopped"));
    assert_eq!(h.speech.stops(), 1);
    assert!(!h.showcase.interpreter().is_listening());
}

#[test]
fn indicator_follows_speech_lifecycle() {
    let mut h = Harness::new(four_apps());
    h.showcase.interpreter_mut().start_listening();
    speech(&mut h, SpeechEvent::Started);
    speech(&mut h, SpeechEvent::Error(SpeechErrorKind::Other("network".to_owned())));
    end_utterance(&mut h);

    let indicators: Vec<VoiceIndicator> = h
        .notifier
        .statuses()
        .into_iter()
        .filter_map(|s| match s {
            StatusUpdate::Voice { indicator } => Some(indicator),
            _ => None,
        })
        .collect();
    assert_eq!(
        indicators,
        vec![
            VoiceIndicator::Listening,
            VoiceIndicator::Error,
            VoiceIndicator::Idle
        ]
    );
    assert!(h.notifier.saw("Voice error: network"));
}

#[test]
fn unavailable_speech_is_reported() {
    let mut h = Harness::build(
        four_apps(),
        Options {
            speech_available: false,
            ..Options::default()
        },
    );
    assert!(h.notifier.saw("Voice control not supported"));
    assert!(h.speech.settings().is_none());
    assert!(!h.showcase.interpreter_mut().start_listening());
    assert!(h.notifier.saw("Voice control not available"));
}
