//! Voice utterances resolved against the command table and the app opener.

use crate::helpers::{Harness, Options, PAGE_MAX_Y, four_apps, two_apps};
use cosmic_autopilot::ports::PageCall;
use cosmic_autopilot::status::{Level, StatusUpdate};
use cosmic_autopilot::voice::{Dispatch, VoiceAction};

#[test]
fn next_app_advances_exactly_once() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start();

    let dispatch = h.say("next app", 0.95);
    assert_eq!(dispatch, Dispatch::Command(VoiceAction::NextApp));
    assert_eq!(h.controller().current_index(), Some(1));
    assert_eq!(h.viewport.entries_shown(), vec![0, 1]);
    assert_eq!(h.notifier.count("✓ next app"), 1);
}

#[test]
fn open_by_name_loads_preview_and_unknown_name_is_reported() {
    let mut h = Harness::new(two_apps());

    let dispatch = h.say("Open Glow Radio", 0.9);
    assert_eq!(dispatch, Dispatch::Opened(1));
    assert!(h.notifier.saw("Opening Glow Radio"));
    assert_eq!(h.renderer.loaded_urls(), vec!["https://x".to_owned()]);

    let dispatch = h.say("open nonexistent xyz", 0.9);
    assert_eq!(dispatch, Dispatch::Unresolved("nonexistent xyz".to_owned()));
    assert_eq!(
        h.notifier.last_notification(),
        Some((
            "App \"nonexistent xyz\" not found".to_owned(),
            Level::Warning
        ))
    );
    assert_eq!(h.renderer.loaded_urls().len(), 1);
}

#[test]
fn table_rows_win_over_free_text_open() {
    let mut h = Harness::new(four_apps());

    let dispatch = h.say("open search", 0.9);
    assert_eq!(dispatch, Dispatch::Command(VoiceAction::FocusSearch));
    assert_eq!(h.page.calls(), vec![PageCall::FocusSearch]);
    assert!(h.renderer.calls().is_empty());

    // No row matches, so only the free-text opener is left.
    let dispatch = h.say("open autopilot settings", 0.9);
    assert_eq!(
        dispatch,
        Dispatch::Unresolved("autopilot settings".to_owned())
    );
    assert!(h.renderer.calls().is_empty());
}

#[test]
fn open_app_row_strips_filler_words() {
    let mut h = Harness::new(four_apps());
    assert_eq!(h.say("open app tile forge", 0.9), Dispatch::Opened(2));
    assert_eq!(
        h.renderer.loaded_urls(),
        vec!["https://tiles.example".to_owned()]
    );
    assert_eq!(h.say("open app", 0.9), Dispatch::Unresolved(String::new()));
    assert!(h.notifier.saw("Please specify an app name"));
}

#[test]
fn low_confidence_never_acts() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start();
    h.notifier.clear();

    assert_eq!(h.say("next app", 0.3), Dispatch::LowConfidence);
    assert_eq!(h.say("stop autopilot", f32::NAN), Dispatch::LowConfidence);
    assert_eq!(h.controller().current_index(), Some(0));
    assert!(h.controller().is_active());
    assert_eq!(
        h.notifier.notifications(),
        vec![
            ("Command not clear, please try again".to_owned(), Level::Warning),
            ("Command not clear, please try again".to_owned(), Level::Warning),
        ]
    );
}

#[test]
fn unrecognized_utterance_points_at_help() {
    let mut h = Harness::new(four_apps());
    assert_eq!(h.say("make me a sandwich", 0.9), Dispatch::Unrecognized);
    assert!(h.notifier.saw("Say \"help\" for available commands"));
}

#[test]
fn search_submits_remaining_words() {
    let mut h = Harness::new(four_apps());
    h.say("search for puzzle games", 0.9);
    assert_eq!(
        h.page.calls(),
        vec![PageCall::Search("puzzle games".to_owned())]
    );
    assert!(h.notifier.saw("Searching for \"puzzle games\""));

    h.say("search for", 0.9);
    assert!(h.notifier.saw("Please specify a search term"));
}

#[test]
fn search_without_search_box_is_reported() {
    let mut h = Harness::build(
        four_apps(),
        Options {
            has_search: false,
            ..Options::default()
        },
    );
    h.say("search for tiles", 0.9);
    h.say("open search", 0.9);
    assert_eq!(h.notifier.count("Search is not available on this page"), 2);
}

#[test]
fn speed_nudges_stay_within_voice_bounds() {
    let mut h = Harness::new(four_apps());
    assert_eq!(h.controller().speed_ms(), 5_000);

    h.say("speed up", 0.9);
    assert_eq!(h.controller().speed_ms(), 4_000);
    assert!(h.notifier.saw("Speed: 4s"));

    h.controller_mut().update_speed(1_500);
    h.say("speed up", 0.9);
    assert_eq!(h.controller().speed_ms(), 1_000);
    h.say("speed up", 0.9);
    assert_eq!(h.controller().speed_ms(), 1_000);

    h.controller_mut().update_speed(9_500);
    h.say("slow down", 0.9);
    assert_eq!(h.controller().speed_ms(), 10_000);
    h.say("slow down", 0.9);
    assert_eq!(h.controller().speed_ms(), 10_000);
    assert!(h.notifier.saw("Speed: 10s"));
}

#[test]
fn close_app_confirms_even_when_nothing_is_open() {
    let mut h = Harness::new(four_apps());
    h.say("close app", 0.9);
    assert!(h.notifier.saw("No app is currently open"));

    h.say("open glow radio", 0.9);
    h.say("close app", 0.9);
    assert!(h.notifier.saw("App closed"));
    assert!(!h.controller().preview().is_embedded_open());
}

#[test]
fn navigation_commands_drive_the_viewport() {
    let mut h = Harness::new(four_apps());
    h.say("scroll to bottom", 0.9);
    assert!((h.scroll_y() - PAGE_MAX_Y).abs() < f64::EPSILON);
    h.say("go to about", 0.9);
    assert!((h.scroll_y() - 400.0).abs() < f64::EPSILON);
    h.say("scroll down", 0.9);
    assert!((h.scroll_y() - 700.0).abs() < f64::EPSILON);
    h.say("scroll to top", 0.9);
    assert!(h.scroll_y().abs() < f64::EPSILON);

    h.say("go to community", 0.9);
    assert!(h.notifier.saw("Section \"community\" not found"));

    h.say("go back", 0.9);
    assert_eq!(h.page.calls(), vec![PageCall::GoBack]);
}

#[test]
fn help_and_panel_commands() {
    let mut h = Harness::new(four_apps());
    h.say("what can you do", 0.9);
    let help = h.notifier.statuses().into_iter().find_map(|s| match s {
        StatusUpdate::Help { text } => Some(text),
        _ => None,
    });
    assert!(help.unwrap().contains("\"next app\""));

    h.say("minimize autopilot", 0.9);
    assert!(h.controller().is_minimized());
    h.say("maximize autopilot", 0.9);
    assert!(!h.controller().is_minimized());
}

#[test]
fn transport_commands_map_to_controller() {
    let mut h = Harness::new(four_apps());
    h.say("start autopilot", 0.9);
    assert!(h.controller().is_active());
    h.say("pause autopilot", 0.9);
    assert!(h.controller().is_paused());
    h.say("resume autopilot", 0.9);
    assert!(!h.controller().is_paused());
    h.say("previous app", 0.9);
    assert_eq!(h.controller().current_index(), Some(3));
    h.say("stop autopilot", 0.9);
    assert!(!h.controller().is_active());
    assert_eq!(h.timers.pending_count(), 0);
}
