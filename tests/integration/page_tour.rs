//! Page tour: sweep down, sweep up to the catalog, showcase, tear down.

use crate::helpers::{Harness, Options, PROJECTS_Y, four_apps};
use cosmic_autopilot::autopilot::TourPhase;
use cosmic_autopilot::catalog::FilterMode;
use cosmic_autopilot::config::ShowcaseConfig;
use cosmic_autopilot::preview::PreviewMode;
use cosmic_autopilot::store::{AutopilotSettings, MemoryStore, SETTINGS_KEY, load_or_default};
use cosmic_autopilot::timer::TimerKind;
use std::sync::Arc;

const FRAME_MS: u64 = 16;

fn run_until_phase(h: &mut Harness, phase: TourPhase) -> bool {
    h.advance_until(FRAME_MS, 60_000, |s| s.controller().tour_phase() == phase)
}

#[test]
fn tour_sweeps_showcases_every_entry_then_tears_down() {
    let mut h = Harness::new(four_apps());
    assert!(h.controller_mut().start_page_tour());
    assert!(h.notifier.saw("Tour started - scroll speed adjustable"));
    assert_eq!(h.controller().tour_phase(), TourPhase::ScrollingDown);

    assert!(run_until_phase(&mut h, TourPhase::ScrollingUp));
    assert!(h.scroll_y() >= 2_000.0 - 2.0);

    assert!(run_until_phase(&mut h, TourPhase::Showcasing));
    // The sweep stops 120 px above the catalog section.
    assert!((h.scroll_y() - (PROJECTS_Y - 120.0)).abs() < f64::EPSILON);
    assert!(h.controller().is_active());
    assert_eq!(h.controller().preview_mode(), PreviewMode::Iframe);
    assert_eq!(
        h.renderer.loaded_urls(),
        vec!["https://pic2puzz.space".to_owned()]
    );
    assert!(h.notifier.saw("Tour: showcasing 4 apps"));

    assert!(run_until_phase(&mut h, TourPhase::Finishing));
    assert!(h.notifier.saw("Tour completed! All apps showcased."));
    assert_eq!(h.controller().stats().completed, 1);
    assert_eq!(h.viewport.entries_shown(), vec![0, 1, 2, 3]);

    h.advance(2_000);
    assert_eq!(h.controller().tour_phase(), TourPhase::Idle);
    assert!(!h.controller().is_active());
    assert!(h.notifier.saw("Page tour stopped"));
    assert!(!h.timers.has_pending(TimerKind::Advance));
    assert!(!h.timers.has_pending(TimerKind::TourFinish));
}

#[test]
fn stopping_mid_sweep_cancels_every_tour_timer() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start_page_tour();
    h.advance(160);
    let y = h.scroll_y();
    assert!(y > 0.0);

    assert!(h.controller_mut().stop_page_tour());
    assert_eq!(h.controller().tour_phase(), TourPhase::Idle);
    assert_eq!(h.timers.pending_count(), 0);
    h.advance(1_000);
    assert!((h.scroll_y() - y).abs() < f64::EPSILON);

    assert!(!h.controller_mut().stop_page_tour());
}

#[test]
fn starting_a_tour_halts_the_autopilot() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start();
    h.advance(5_000);
    assert_eq!(h.controller().current_index(), Some(1));

    assert!(h.controller_mut().start_page_tour());
    assert!(!h.controller().is_active());
    assert!(!h.timers.has_pending(TimerKind::Advance));
    assert!(h.scroll_y().abs() < f64::EPSILON);

    // A second start while running is refused.
    assert!(!h.controller_mut().start_page_tour());
    assert!(h.notifier.saw("Page tour already running"));
}

#[test]
fn autopilot_stop_during_showcase_ends_the_tour() {
    let mut h = Harness::new(four_apps());
    h.controller_mut().start_page_tour();
    assert!(run_until_phase(&mut h, TourPhase::Showcasing));

    h.controller_mut().stop();
    assert_eq!(h.controller().tour_phase(), TourPhase::Idle);
    assert!(!h.controller().is_active());
    assert!(!h.controller().preview().is_embedded_open());
    for kind in [
        TimerKind::Advance,
        TimerKind::TourScroll,
        TimerKind::TourSettle,
        TimerKind::TourFinish,
    ] {
        assert!(!h.timers.has_pending(kind), "{kind:?} still armed");
    }
}

#[test]
fn voice_tour_commands() {
    let mut h = Harness::new(four_apps());
    h.say("stop tour", 0.9);
    assert!(h.notifier.saw("No page tour is running"));

    h.say("start tour", 0.9);
    assert_eq!(h.controller().tour_phase(), TourPhase::ScrollingDown);
    h.say("stop tour", 0.9);
    assert_eq!(h.controller().tour_phase(), TourPhase::Idle);
}

#[test]
fn tour_speed_is_clamped_and_independent_of_autopilot_speed() {
    let mut h = Harness::new(four_apps());
    assert_eq!(h.controller_mut().set_tour_speed(500), 100);
    assert_eq!(h.controller_mut().set_tour_speed(0), 10);
    assert_eq!(h.controller().tour_speed(), 10);
    assert_eq!(h.controller().speed_ms(), 5_000);
}

#[test]
fn tour_showcases_every_entry_despite_an_empty_filter() {
    let store = Arc::new(MemoryStore::new());
    let mut h = Harness::build(
        four_apps(),
        Options {
            store: store.clone(),
            ..Options::default()
        },
    );
    assert_eq!(h.controller_mut().apply_filter(FilterMode::Favorites), 0);

    assert!(h.controller_mut().start_page_tour());
    assert!(run_until_phase(&mut h, TourPhase::Showcasing));
    assert!(!h.notifier.saw("No apps to showcase"));
    assert!(h.notifier.saw("Tour: showcasing 4 apps"));

    // Preference writes during the tour keep the user's filter.
    h.controller_mut().set_loop(true);
    let settings: AutopilotSettings = load_or_default(store.as_ref(), SETTINGS_KEY);
    assert_eq!(settings.filter_category, FilterMode::Favorites);

    assert!(run_until_phase(&mut h, TourPhase::Finishing));
    assert_eq!(h.viewport.entries_shown(), vec![0, 1, 2, 3]);

    h.advance(2_000);
    assert_eq!(h.controller().tour_phase(), TourPhase::Idle);
    assert_eq!(h.controller().catalog().filter(), &FilterMode::Favorites);
    assert!(h.controller().catalog().is_view_empty());
}

#[test]
fn stopping_the_showcase_restores_the_category_filter() {
    let mut h = Harness::new(four_apps());
    assert_eq!(
        h.controller_mut()
            .apply_filter(FilterMode::Category("tool".to_owned())),
        2
    );
    h.controller_mut().start_page_tour();
    assert!(run_until_phase(&mut h, TourPhase::Showcasing));
    assert_eq!(h.controller().catalog().active_len(), 4);

    h.controller_mut().stop();
    assert_eq!(
        h.controller().catalog().filter(),
        &FilterMode::Category("tool".to_owned())
    );
    assert_eq!(h.controller().catalog().active_ids(), &[2, 3]);
}

#[test]
fn inverted_tour_bounds_do_not_panic() {
    let mut config = ShowcaseConfig::default();
    config.tour.min_speed = 80;
    config.tour.max_speed = 20;
    config.autopilot.min_speed_ms = 9_000;
    config.autopilot.max_speed_ms = 2_000;
    let mut h = Harness::build(
        four_apps(),
        Options {
            config,
            ..Options::default()
        },
    );
    assert_eq!(h.controller_mut().set_tour_speed(50), 80);
    assert_eq!(h.controller_mut().update_speed(5_000), 9_000);
}
