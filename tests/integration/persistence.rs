//! Preferences restored through the controller from memory and file stores.

use crate::helpers::{Harness, Options, four_apps};
use cosmic_autopilot::catalog::FilterMode;
use cosmic_autopilot::preview::PreviewMode;
use cosmic_autopilot::store::{
    FAVORITES_KEY, JsonFileStore, MemoryStore, POSITION_KEY, PanelPosition, SETTINGS_KEY,
    STATS_KEY, VIEWED_KEY,
};
use std::sync::Arc;

fn with_store(store: MemoryStore) -> Harness {
    Harness::build(
        four_apps(),
        Options {
            store: Arc::new(store),
            ..Options::default()
        },
    )
}

#[test]
fn malformed_values_fall_back_to_defaults() {
    let h = with_store(
        MemoryStore::new()
            .with(SETTINGS_KEY, "not json")
            .with(FAVORITES_KEY, "{bad")
            .with(VIEWED_KEY, "\"0\"")
            .with(STATS_KEY, "[]")
            .with(POSITION_KEY, "12"),
    );
    let c = h.controller();
    assert_eq!(c.speed_ms(), 5_000);
    assert!(c.loop_enabled());
    assert_eq!(c.preview_mode(), PreviewMode::None);
    assert!(c.favorites().is_empty());
    assert_eq!(c.stats().viewed, 0);
    assert_eq!(c.stats().started, 0);
    assert_eq!(c.panel_position(), None);
    assert_eq!(c.catalog().active_len(), 4);
}

#[test]
fn stored_speed_is_clamped() {
    let h = with_store(MemoryStore::new().with(SETTINGS_KEY, r#"{"speed":999999}"#));
    assert_eq!(h.controller().speed_ms(), 20_000);

    let h = with_store(MemoryStore::new().with(SETTINGS_KEY, r#"{"speed":0}"#));
    assert_eq!(h.controller().speed_ms(), 5_000);
}

#[test]
fn favorites_filter_is_restored_with_favorites() {
    let h = with_store(
        MemoryStore::new()
            .with(
                SETTINGS_KEY,
                r#"{"filterCategory":"favorites","previewMode":"popup","loop":false}"#,
            )
            .with(FAVORITES_KEY, "[1,3,42]"),
    );
    let c = h.controller();
    assert_eq!(c.catalog().filter(), &FilterMode::Favorites);
    assert_eq!(c.catalog().active_ids(), &[1, 3]);
    assert_eq!(c.preview_mode(), PreviewMode::Popup);
    assert!(!c.loop_enabled());
}

#[test]
fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs").join("preferences.json");

    {
        let mut h = Harness::build(
            four_apps(),
            Options {
                store: Arc::new(JsonFileStore::open(&path)),
                ..Options::default()
            },
        );
        h.controller_mut().toggle_favorite(Some(2));
        h.controller_mut().update_speed(8_000);
        h.controller_mut().set_loop(false);
        h.controller_mut().start();
        h.advance(5_000);
        h.controller_mut().stop();
        h.controller_mut().save_panel_position(24.0, 480.0);
    }
    assert!(path.exists());

    let h = Harness::build(
        four_apps(),
        Options {
            store: Arc::new(JsonFileStore::open(&path)),
            ..Options::default()
        },
    );
    let c = h.controller();
    assert_eq!(c.speed_ms(), 8_000);
    assert!(!c.loop_enabled());
    let favorites: Vec<usize> = c.favorites().iter().map(|e| e.id).collect();
    assert_eq!(favorites, vec![2]);
    let stats = c.stats();
    assert_eq!(stats.started, 1);
    assert_eq!(stats.viewed, 1);
    assert_eq!(stats.completion_rate, 25);
    assert_eq!(
        c.panel_position(),
        Some(PanelPosition {
            left: 24.0,
            top: 480.0
        })
    );
}

#[test]
fn reset_progress_clears_persisted_views() {
    let store = Arc::new(MemoryStore::new().with(VIEWED_KEY, "[0,1,2]"));
    let mut h = Harness::build(
        four_apps(),
        Options {
            store: store.clone(),
            ..Options::default()
        },
    );
    assert_eq!(h.controller().stats().viewed, 3);

    h.controller_mut().reset_progress();
    assert_eq!(h.controller().stats().viewed, 0);
    assert!(h.notifier.saw("Progress reset"));

    let h = Harness::build(
        four_apps(),
        Options {
            store,
            ..Options::default()
        },
    );
    assert_eq!(h.controller().stats().viewed, 0);
}
