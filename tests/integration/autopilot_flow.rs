//! Autopilot transport, traversal and filtering through the showcase root.

use crate::helpers::{Harness, four_apps, two_apps};
use cosmic_autopilot::catalog::{CatalogSource, FilterMode};
use cosmic_autopilot::ports::RenderCall;
use cosmic_autopilot::preview::PreviewMode;
use cosmic_autopilot::status::StatusUpdate;
use cosmic_autopilot::timer::{TimerEvent, TimerKind};

#[test]
fn loop_off_walkthrough_completes_instead_of_wrapping() {
    let mut h = Harness::new(two_apps());
    h.controller_mut().set_loop(false);

    assert!(h.controller_mut().start());
    assert_eq!(h.controller().current_index(), Some(0));
    assert_eq!(h.controller().current_entry().unwrap().title, "Pic2Puzz");
    // Default preview mode renders nothing.
    assert!(h.renderer.calls().is_empty());

    h.controller_mut().next();
    assert_eq!(h.controller().current_index(), Some(1));
    assert_eq!(h.controller().current_entry().unwrap().title, "Glow Radio");
    let titles: Vec<String> = h
        .notifier
        .statuses()
        .into_iter()
        .filter_map(|s| match s {
            StatusUpdate::NowShowing { title, .. } => Some(title),
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec!["Pic2Puzz", "Glow Radio"]);

    h.controller_mut().next();
    assert!(!h.controller().is_active());
    assert!(h.notifier.saw("Autopilot completed!"));
    assert_eq!(h.controller().stats().completed, 1);
    assert_eq!(h.viewport.entries_shown(), vec![0, 1]);
    assert_eq!(h.timers.pending_count(), 0);
}

#[test]
fn loop_off_auto_advance_stops_after_last_entry() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().set_loop(false);
    h.controller_mut().start();

    // Three advances reach the last of four entries.
    h.advance(15_000);
    assert!(h.controller().is_active());
    assert_eq!(h.controller().current_index(), Some(3));
    assert!(!h.notifier.saw("Autopilot completed!"));

    h.advance(5_000);
    assert!(!h.controller().is_active());
    assert!(h.notifier.saw("Autopilot completed!"));
    assert_eq!(h.viewport.entries_shown(), vec![0, 1, 2, 3]);
    assert_eq!(h.timers.pending_count(), 0);
}

#[test]
fn next_and_previous_are_circular() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().next();
    let start = h.controller().current_index();
    for _ in 0..4 {
        h.controller_mut().next();
    }
    assert_eq!(h.controller().current_index(), start);
    for _ in 0..4 {
        h.controller_mut().previous();
    }
    assert_eq!(h.controller().current_index(), start);
}

#[test]
fn stop_twice_matches_stop_once() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start();
    h.advance(5_000);

    h.controller_mut().stop();
    let once = (
        h.controller().is_active(),
        h.controller().current_index(),
        h.timers.pending_count(),
        h.controller().stats(),
    );
    h.controller_mut().stop();
    let twice = (
        h.controller().is_active(),
        h.controller().current_index(),
        h.timers.pending_count(),
        h.controller().stats(),
    );
    assert_eq!(once, twice);
    assert!(!twice.0);
    assert_eq!(twice.2, 0);
}

#[test]
fn stop_page_tour_without_tour_is_a_no_op() {
    let mut h = Harness::new(four_apps());
    assert!(!h.controller_mut().stop_page_tour());
    assert!(!h.controller_mut().stop_page_tour());
    assert_eq!(h.timers.pending_count(), 0);
}

#[test]
fn empty_favorites_filter_stops_running_session() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start();
    h.advance(5_000);

    let total = h.controller_mut().apply_filter(FilterMode::Favorites);
    assert_eq!(total, 0);
    assert!(h.controller().catalog().is_view_empty());
    assert!(!h.controller().is_active());
    assert!(h.notifier.saw("No apps match this filter"));
    assert!(!h.timers.has_pending(TimerKind::Advance));
}

#[test]
fn favorite_survives_excluding_filter_round_trip() {
    let mut h = Harness::new(four_apps());
    assert_eq!(h.controller_mut().toggle_favorite(Some(1)), Some(true));

    assert_eq!(
        h.controller_mut()
            .apply_filter(FilterMode::Category("tool".to_owned())),
        2
    );
    assert_eq!(h.controller_mut().apply_filter(FilterMode::All), 4);
    assert!(h.controller().catalog().entry(1).unwrap().is_favorite);
    assert_eq!(h.controller().favorites().len(), 1);
}

#[test]
fn voice_stop_during_tick_cancels_remaining_ticks() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start();

    let timers = h.timers.clone();
    let mut delivered = 0;
    timers.advance(20_000, |event| {
        delivered += 1;
        h.showcase.handle_timer(event);
        if delivered == 3 {
            h.say("stop autopilot", 0.9);
        }
    });

    assert_eq!(delivered, 3);
    assert!(!h.controller().is_active());
    assert_eq!(h.viewport.entries_shown(), vec![0]);
    assert_eq!(h.timers.pending_count(), 0);
}

#[test]
fn shuffle_toggle_keeps_every_entry() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().toggle_shuffle();
    assert!(h.notifier.saw("Shuffle mode enabled"));
    let mut ids = h.controller().catalog().active_ids().to_vec();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3]);

    h.controller_mut().toggle_shuffle();
    assert!(h.notifier.saw("Shuffle mode disabled"));
    assert_eq!(h.controller().catalog().active_ids(), &[0, 1, 2, 3]);
}

fn with_placeholder() -> Vec<CatalogSource> {
    vec![
        CatalogSource::new("Pic2Puzz", "https://pic2puzz.space", "game"),
        CatalogSource::new("Coming Soon", "#", "game"),
    ]
}

#[test]
fn placeholder_entry_closes_the_previous_embedded_preview() {
    let mut h = Harness::new(with_placeholder());
    h.controller_mut().change_preview_mode(PreviewMode::Iframe);
    h.controller_mut().start();
    assert_eq!(h.controller().preview().embedded_entry(), Some(0));

    h.renderer.clear();
    h.controller_mut().next();
    assert_eq!(h.controller().current_entry().unwrap().title, "Coming Soon");
    assert_eq!(h.controller().preview().embedded_entry(), None);
    assert!(!h.controller().preview().is_embedded_open());
    assert!(h.renderer.calls().contains(&RenderCall::Clear));
    assert!(h.renderer.loaded_urls().is_empty());
}

#[test]
fn placeholder_entry_hides_the_previous_popup() {
    let mut h = Harness::new(with_placeholder());
    h.controller_mut().change_preview_mode(PreviewMode::Popup);
    h.controller_mut().start();
    assert!(h.controller().preview().is_popup_open());

    h.controller_mut().next();
    assert!(!h.controller().preview().is_popup_open());
    assert!(h.renderer.calls().contains(&RenderCall::HidePopup));
}

#[test]
fn stale_auto_open_leaves_the_armed_timer_cancellable() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().set_auto_open(true);
    h.controller_mut().start();
    let armed = TimerKind::AutoOpen { entry_id: 0 };
    assert!(h.timers.has_pending(armed));

    // Generation 0 predates every displayed entry.
    h.showcase.handle_timer(TimerEvent::new(armed, 0));
    assert!(h.timers.has_pending(armed));

    h.controller_mut().stop();
    assert!(!h.timers.has_pending(armed));
    h.advance(10_000);
    assert!(!h.controller().preview().is_embedded_open());
}
