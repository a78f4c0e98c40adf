//! The autopilot controller: transport, auto-advance, display and page tour.

use super::session::Session;
use super::tour::{Frame, PageTour, TourPhase};
use crate::catalog::{Catalog, CatalogEntry, FilterMode};
use crate::config::{OpenTarget, ShowcaseConfig};
use crate::ports::{PreviewRenderer, ScrollMode, ViewportPort};
use crate::preview::{PreviewMode, PreviewSurface};
use crate::status::{AutopilotState, Level, Notifier, StatusUpdate};
use crate::store::{
    self, AutopilotSettings, FAVORITES_KEY, POSITION_KEY, PanelPosition, PreferenceStore,
    SETTINGS_KEY, STATS_KEY, SessionStats, VIEWED_KEY,
};
use crate::timer::{Cadence, Generation, TimerEvent, TimerKind, TimerPort, TimerSlot};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Host collaborators the controller drives.
#[derive(Clone)]
pub struct ControllerPorts {
    /// Scheduling.
    pub timers: Arc<dyn TimerPort>,
    /// Page scrolling.
    pub viewport: Arc<dyn ViewportPort>,
    /// Popup and embedded preview rendering.
    pub renderer: Arc<dyn PreviewRenderer>,
    /// Toasts and status.
    pub notifier: Arc<dyn Notifier>,
    /// Durable preferences.
    pub store: Arc<dyn PreferenceStore>,
}

/// Snapshot for the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShowcaseStats {
    /// Entries in the full catalog.
    pub total_entries: usize,
    /// Entries shown at least once.
    pub viewed: usize,
    /// Entries marked favorite.
    pub favorites: usize,
    /// Sessions started.
    pub started: u32,
    /// Sessions that ran to completion.
    pub completed: u32,
    /// `viewed / total_entries` as a rounded percentage.
    pub completion_rate: u32,
}

/// Owns the catalog, the preview surface and the single autopilot session.
pub struct AutopilotController {
    config: ShowcaseConfig,
    catalog: Catalog,
    preview: PreviewSurface,
    session: Session,
    tour: PageTour,
    /// User filter set aside while the tour showcases the whole catalog.
    tour_filter: Option<FilterMode>,
    display: Generation,
    auto_open: TimerSlot,
    stats: SessionStats,
    minimized: bool,
    panel_position: Option<PanelPosition>,
    timers: Arc<dyn TimerPort>,
    viewport: Arc<dyn ViewportPort>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn PreferenceStore>,
}

impl AutopilotController {
    /// Build the controller and restore persisted preferences.
    pub fn new(config: ShowcaseConfig, catalog: Catalog, ports: ControllerPorts) -> Self {
        if let Err(e) = config.validate() {
            warn!("controller built from an unchecked configuration: {e}");
        }
        let preview = PreviewSurface::new(
            config.preview.clone(),
            ports.renderer,
            Arc::clone(&ports.notifier),
            Arc::clone(&ports.timers),
        );
        let session = Session::new(&config.autopilot);
        let tour = PageTour::new(config.tour.default_speed);
        let mut controller = Self {
            config,
            catalog,
            preview,
            session,
            tour,
            tour_filter: None,
            display: Generation::default(),
            auto_open: TimerSlot::default(),
            stats: SessionStats::default(),
            minimized: false,
            panel_position: None,
            timers: ports.timers,
            viewport: ports.viewport,
            notifier: ports.notifier,
            store: ports.store,
        };
        controller.restore_preferences();
        controller
    }

    /// Reload every persisted preference. Absent or malformed values fall
    /// back to defaults.
    pub fn restore_preferences(&mut self) {
        let store = self.store.as_ref();
        let settings: AutopilotSettings =
            store::load_json(store, SETTINGS_KEY).unwrap_or_else(|| AutopilotSettings {
                speed: self.config.autopilot.default_speed_ms,
                ..AutopilotSettings::default()
            });
        let speed = if settings.speed == 0 {
            self.config.autopilot.default_speed_ms
        } else {
            settings.speed
        };
        let speed = self.config.autopilot.clamp_speed(speed);
        self.session.apply_settings(&settings, speed);

        let favorites: Vec<usize> = store::load_or_default(store, FAVORITES_KEY);
        let viewed: Vec<usize> = store::load_or_default(store, VIEWED_KEY);
        self.catalog.restore_favorites(&favorites);
        self.catalog.restore_viewed(&viewed);
        self.stats = store::load_or_default(store, STATS_KEY);
        self.panel_position = store::load_json(store, POSITION_KEY);

        self.catalog.set_shuffle(settings.shuffle);
        let total = self.catalog.apply_filter(settings.filter_category);
        info!(
            speed_ms = speed,
            favorites = favorites.len(),
            viewed = viewed.len(),
            active = total,
            "autopilot preferences restored"
        );
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    /// The catalog and its active view.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The preview surface.
    pub fn preview(&self) -> &PreviewSurface {
        &self.preview
    }

    /// Whether a session is active (running or paused).
    pub fn is_active(&self) -> bool {
        self.session.active
    }

    /// Whether the active session is paused.
    pub fn is_paused(&self) -> bool {
        self.session.paused
    }

    /// Advance interval in milliseconds.
    pub fn speed_ms(&self) -> u64 {
        self.session.speed_ms
    }

    /// Whether traversal wraps at the end of the active view.
    pub fn loop_enabled(&self) -> bool {
        self.session.loop_enabled
    }

    /// Whether new entries auto-open in the embedded preview.
    pub fn auto_open(&self) -> bool {
        self.session.auto_open
    }

    /// Scroll strategy for the current entry.
    pub fn scroll_mode(&self) -> ScrollMode {
        self.session.scroll_mode
    }

    /// Preview presentation.
    pub fn preview_mode(&self) -> PreviewMode {
        self.session.preview_mode
    }

    /// Current position in the active view.
    pub fn current_index(&self) -> Option<usize> {
        self.catalog.current_index()
    }

    /// Entry at the current position.
    pub fn current_entry(&self) -> Option<&CatalogEntry> {
        self.catalog.current_entry()
    }

    /// Page tour phase.
    pub fn tour_phase(&self) -> TourPhase {
        self.tour.phase()
    }

    /// Page tour scroll speed.
    pub fn tour_speed(&self) -> u32 {
        self.tour.speed()
    }

    /// Whether the control panel is collapsed.
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Saved control panel position.
    pub fn panel_position(&self) -> Option<PanelPosition> {
        self.panel_position
    }

    fn status(&self, update: StatusUpdate) {
        self.notifier.status(update);
    }

    fn report_state(&self) {
        let state = match (self.session.active, self.session.paused) {
            (false, _) => AutopilotState::Stopped,
            (true, true) => AutopilotState::Paused,
            (true, false) if self.session.tour_driven => AutopilotState::Touring,
            (true, false) => AutopilotState::Running,
        };
        self.status(StatusUpdate::Autopilot { state });
    }

    // ── Transport ───────────────────────────────────────────────────────────

    /// Start auto-advancing from the current position.
    /// Returns `false` when already running or the active view is empty.
    pub fn start(&mut self) -> bool {
        if self.session.active {
            self.notifier
                .notify("Autopilot is already running", Level::Info);
            return false;
        }
        if self.catalog.is_view_empty() {
            self.notifier
                .notify("No apps found to browse", Level::Warning);
            return false;
        }
        self.stats.started = self.stats.started.saturating_add(1);
        self.persist_stats();
        self.begin_session(false);
        self.notifier.notify("Autopilot started", Level::Success);
        true
    }

    fn begin_session(&mut self, tour_driven: bool) {
        let generation = self.session.activate(tour_driven);
        info!(generation, tour_driven, "autopilot session started");
        self.report_state();
        self.show_current();
        self.session.arm_cycle(self.timers.as_ref(), &self.config.autopilot);
    }

    /// Stop the session, end any tour, close the preview and persist the
    /// viewed-set. Safe to call when nothing is running.
    pub fn stop(&mut self) {
        if self.tour.is_running() {
            self.tour.teardown(self.timers.as_ref());
            debug!("page tour ended by autopilot stop");
        }
        self.halt();
        self.restore_user_filter();
        self.notifier.notify("Autopilot stopped", Level::Info);
    }

    fn halt(&mut self) {
        let was_active = self.session.active;
        self.session.clear_cycle(self.timers.as_ref());
        self.auto_open.clear(self.timers.as_ref());
        self.display.bump();
        self.session.deactivate();
        self.catalog.reset_position();
        self.preview.close();
        self.status(StatusUpdate::Progress { percent: 0.0 });
        self.report_state();
        self.persist_viewed();
        if was_active {
            info!(generation = self.session.generation(), "autopilot session stopped");
        }
    }

    /// Halt advancing without losing position.
    pub fn pause(&mut self) -> bool {
        if !self.session.active {
            self.notifier
                .notify("Autopilot is not running", Level::Warning);
            return false;
        }
        if self.session.paused {
            self.notifier
                .notify("Autopilot is already paused", Level::Info);
            return false;
        }
        self.session.paused = true;
        self.session.clear_cycle(self.timers.as_ref());
        self.auto_open.clear(self.timers.as_ref());
        self.report_state();
        self.notifier.notify("Autopilot paused", Level::Info);
        true
    }

    /// Resume advancing with a fresh advance window.
    pub fn resume(&mut self) -> bool {
        if !self.session.active {
            self.notifier
                .notify("Autopilot is not running", Level::Warning);
            return false;
        }
        if !self.session.paused {
            self.notifier.notify("Autopilot is not paused", Level::Info);
            return false;
        }
        self.session.paused = false;
        self.status(StatusUpdate::Progress { percent: 0.0 });
        self.session.arm_cycle(self.timers.as_ref(), &self.config.autopilot);
        self.report_state();
        self.notifier.notify("Autopilot resumed", Level::Success);
        true
    }

    /// Flip between paused and running.
    pub fn toggle_pause(&mut self) -> bool {
        if self.session.paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Show the next entry. With looping off, stepping past the last entry
    /// of an active session completes it instead of wrapping.
    pub fn next(&mut self) {
        if self.catalog.is_view_empty() {
            self.notifier.notify("No apps to show", Level::Warning);
            return;
        }
        if self.session.active && self.catalog.is_at_last() {
            if self.session.tour_driven {
                self.complete_tour();
                return;
            }
            if !self.session.loop_enabled {
                self.complete();
                return;
            }
        }
        self.step_and_show(1);
    }

    /// Show the previous entry, wrapping to the last.
    pub fn previous(&mut self) {
        if self.catalog.is_view_empty() {
            self.notifier.notify("No apps to show", Level::Warning);
            return;
        }
        self.step_and_show(-1);
    }

    fn step_and_show(&mut self, delta: isize) {
        self.catalog.step(delta);
        self.show_current();
        if self.session.is_advancing() {
            self.session.arm_cycle(self.timers.as_ref(), &self.config.autopilot);
        }
    }

    fn complete(&mut self) {
        self.stats.completed = self.stats.completed.saturating_add(1);
        self.persist_stats();
        self.stop();
        self.notifier.notify("Autopilot completed!", Level::Success);
    }

    fn complete_tour(&mut self) {
        if self.tour.phase() == TourPhase::Finishing {
            return;
        }
        self.session.clear_cycle(self.timers.as_ref());
        self.stats.completed = self.stats.completed.saturating_add(1);
        self.persist_stats();
        self.tour.finish(self.timers.as_ref(), &self.config.tour);
        self.notifier
            .notify("Tour completed! All apps showcased.", Level::Success);
    }

    /// Set the advance interval, clamped to the configured bounds. A running
    /// session restarts its advance window at the new interval.
    pub fn update_speed(&mut self, ms: u64) -> u64 {
        let speed = self.config.autopilot.clamp_speed(ms);
        self.session.speed_ms = speed;
        if self.session.is_advancing() {
            self.session.arm_cycle(self.timers.as_ref(), &self.config.autopilot);
        }
        self.persist_settings();
        debug!(speed_ms = speed, "autopilot speed updated");
        speed
    }

    // ── Display ─────────────────────────────────────────────────────────────

    fn show_current(&mut self) {
        let Some(entry) = self.catalog.current_entry().cloned() else {
            return;
        };
        let position = self.catalog.current_index().unwrap_or(0) + 1;
        let total = self.catalog.active_len();

        self.session.progress_ms = 0;
        self.status(StatusUpdate::Progress { percent: 0.0 });
        self.status(StatusUpdate::NowShowing {
            entry_id: entry.id,
            title: entry.title.clone(),
            position,
            total,
        });

        let shown = match self.session.preview_mode {
            PreviewMode::None => Ok(()),
            PreviewMode::Popup => self.preview.show_popup(&entry),
            PreviewMode::Iframe => self.preview.show_embedded(&entry),
        };
        if let Err(e) = shown {
            debug!(entry_id = entry.id, "preview skipped: {e}");
            // Nothing may keep showing the previous entry.
            self.preview.close();
        }

        let display = self.display.bump();
        if self.session.auto_open
            && self.session.is_advancing()
            && self.session.preview_mode != PreviewMode::Iframe
        {
            self.auto_open.arm(
                self.timers.as_ref(),
                Cadence::once_ms(self.config.autopilot.auto_open_delay_ms),
                TimerEvent::new(TimerKind::AutoOpen { entry_id: entry.id }, display),
            );
        } else {
            self.auto_open.clear(self.timers.as_ref());
        }

        if self.session.scroll_mode != ScrollMode::None {
            self.viewport
                .scroll_into_view(entry.id, self.session.scroll_mode);
        }

        let view_count = self.catalog.record_view(entry.id).unwrap_or(entry.view_count);
        self.status(StatusUpdate::EntryBadge {
            entry_id: entry.id,
            is_favorite: entry.is_favorite,
            view_count,
        });
        debug!(entry_id = entry.id, position, total, "showing entry");
    }

    fn reposition_after_view_change(&mut self) {
        self.status(StatusUpdate::ViewReset {
            total: self.catalog.active_len(),
        });
        if self.session.active && !self.catalog.is_view_empty() {
            self.show_current();
            if self.session.is_advancing() {
                self.session.arm_cycle(self.timers.as_ref(), &self.config.autopilot);
            }
        }
    }

    // ── Preferences ─────────────────────────────────────────────────────────

    /// Enable or disable wrap-around.
    pub fn set_loop(&mut self, enabled: bool) {
        self.session.loop_enabled = enabled;
        self.persist_settings();
    }

    /// Enable or disable auto-opening the embedded preview.
    pub fn set_auto_open(&mut self, enabled: bool) {
        self.session.auto_open = enabled;
        if !enabled {
            self.auto_open.clear(self.timers.as_ref());
        }
        self.persist_settings();
    }

    /// Change how the current entry is scrolled into view.
    pub fn set_scroll_mode(&mut self, mode: ScrollMode) {
        self.session.scroll_mode = mode;
        self.persist_settings();
    }

    /// Switch the preview presentation. Whatever is open is closed.
    pub fn change_preview_mode(&mut self, mode: PreviewMode) {
        self.session.preview_mode = mode;
        self.auto_open.clear(self.timers.as_ref());
        self.preview.close();
        self.persist_settings();
        self.notifier
            .notify(&format!("Preview: {}", mode.label()), Level::Info);
    }

    /// Recompute the active view. An empty result stops any running session
    /// and is reported as a warning. Returns the new view length.
    pub fn apply_filter(&mut self, mode: FilterMode) -> usize {
        let label = mode.label();
        self.tour_filter = None;
        let total = self.catalog.apply_filter(mode);
        self.persist_settings();
        if total == 0 {
            self.status(StatusUpdate::ViewReset { total });
            self.notifier
                .notify("No apps match this filter", Level::Warning);
            if self.session.active {
                self.stop();
            }
        } else {
            self.reposition_after_view_change();
            self.notifier
                .notify(&format!("Filtered to {total} apps ({label})"), Level::Info);
        }
        total
    }

    /// Enable or disable shuffle.
    pub fn set_shuffle(&mut self, enabled: bool) {
        self.catalog.set_shuffle(enabled);
        self.persist_settings();
        self.reposition_after_view_change();
        if enabled {
            self.notifier
                .notify("Shuffle mode enabled", Level::Success);
        } else {
            self.notifier.notify("Shuffle mode disabled", Level::Info);
        }
    }

    /// Flip shuffle.
    pub fn toggle_shuffle(&mut self) {
        let enabled = !self.catalog.shuffle_enabled();
        self.set_shuffle(enabled);
    }

    /// Flip the favorite flag of `id`, or of the current entry when `None`.
    /// Returns the new flag.
    pub fn toggle_favorite(&mut self, id: Option<usize>) -> Option<bool> {
        let Some(id) = id.or_else(|| self.catalog.current_entry().map(|e| e.id)) else {
            self.notifier.notify("No app selected", Level::Warning);
            return None;
        };
        let Some(is_favorite) = self.catalog.toggle_favorite(id) else {
            warn!(entry_id = id, "favorite toggle for unknown entry");
            self.notifier.notify("Unknown app", Level::Warning);
            return None;
        };
        if let Some(entry) = self.catalog.entry(id) {
            let (message, level) = if is_favorite {
                (format!("Added \"{}\" to favorites", entry.title), Level::Success)
            } else {
                (format!("Removed \"{}\" from favorites", entry.title), Level::Info)
            };
            self.notifier.notify(&message, level);
            self.status(StatusUpdate::EntryBadge {
                entry_id: id,
                is_favorite,
                view_count: entry.view_count,
            });
        }
        self.persist_favorites();
        Some(is_favorite)
    }

    /// Favorite entries in catalog order.
    pub fn favorites(&self) -> Vec<&CatalogEntry> {
        self.catalog.favorites()
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> ShowcaseStats {
        let total_entries = self.catalog.entries().len();
        let viewed = self.catalog.viewed_ids().len();
        let completion_rate = if total_entries == 0 {
            0
        } else {
            (viewed as f64 / total_entries as f64 * 100.0).round() as u32
        };
        ShowcaseStats {
            total_entries,
            viewed,
            favorites: self.catalog.favorite_ids().len(),
            started: self.stats.started,
            completed: self.stats.completed,
            completion_rate,
        }
    }

    /// Forget which entries were viewed.
    pub fn reset_progress(&mut self) {
        self.catalog.clear_viewed();
        self.persist_viewed();
        self.notifier.notify("Progress reset", Level::Info);
    }

    // ── Panel ───────────────────────────────────────────────────────────────

    /// Collapse or expand the control panel.
    pub fn set_minimized(&mut self, minimized: bool) {
        self.minimized = minimized;
        self.status(StatusUpdate::PanelMinimized { minimized });
    }

    /// Flip the panel between collapsed and expanded. Returns the new state.
    pub fn toggle_minimize(&mut self) -> bool {
        self.set_minimized(!self.minimized);
        self.minimized
    }

    /// Remember where the panel was dragged to.
    pub fn save_panel_position(&mut self, left: f64, top: f64) {
        let position = PanelPosition { left, top };
        self.panel_position = Some(position);
        store::store_json(self.store.as_ref(), POSITION_KEY, &position);
    }

    // ── Preview controls ────────────────────────────────────────────────────

    /// Hard-reload the embedded preview.
    pub fn refresh_preview(&mut self) -> bool {
        self.preview.refresh()
    }

    /// Close whatever preview is open. Returns whether anything was open.
    pub fn close_preview(&mut self) -> bool {
        self.auto_open.clear(self.timers.as_ref());
        self.preview.close()
    }

    /// Open the current entry in a new browsing context.
    pub fn open_current_externally(&mut self) -> bool {
        let Some(entry) = self.catalog.current_entry().cloned() else {
            self.notifier.notify("No app selected", Level::Warning);
            return false;
        };
        self.preview.open_externally(&entry).is_ok()
    }

    /// Open entry `id` in the embedded preview or a new browsing context.
    pub fn open_entry(&mut self, id: usize, target: OpenTarget) -> bool {
        let Some(entry) = self.catalog.entry(id).cloned() else {
            self.notifier.notify("Unknown app", Level::Warning);
            return false;
        };
        let opened = match target {
            OpenTarget::Embedded => self.preview.show_embedded(&entry),
            OpenTarget::External => self.preview.open_externally(&entry),
        };
        opened.is_ok()
    }

    /// The embedded content reported load completion.
    pub fn on_preview_loaded(&mut self, load_id: u64) {
        self.preview.on_embedded_loaded(load_id);
    }

    /// The embedded content reported a load failure.
    pub fn on_preview_failed(&mut self, load_id: u64, reason: &str) {
        self.preview.on_embedded_failed(load_id, reason);
    }

    // ── Page tour ───────────────────────────────────────────────────────────

    /// Begin the page tour. A running autopilot session is stopped first.
    pub fn start_page_tour(&mut self) -> bool {
        if self.tour.is_running() {
            self.notifier
                .notify("Page tour already running", Level::Info);
            return false;
        }
        if self.session.active {
            self.halt();
        }
        self.viewport.scroll_to_top();
        let generation = self.tour.begin(self.timers.as_ref(), &self.config.tour);
        info!(generation, speed = self.tour.speed(), "page tour started");
        self.status(StatusUpdate::Autopilot {
            state: AutopilotState::Touring,
        });
        self.notifier
            .notify("Tour started - scroll speed adjustable", Level::Success);
        true
    }

    /// End the page tour. Stops the autopilot too if the tour started it.
    /// Returns `false` when no tour was running.
    pub fn stop_page_tour(&mut self) -> bool {
        if !self.tour.is_running() {
            debug!("stop_page_tour with no tour running");
            return false;
        }
        self.tour.teardown(self.timers.as_ref());
        if self.session.active && self.session.tour_driven {
            self.halt();
        } else if !self.session.active {
            self.report_state();
        }
        self.restore_user_filter();
        info!("page tour stopped");
        self.notifier.notify("Page tour stopped", Level::Info);
        true
    }

    /// Change the tour scroll speed. A running sweep restarts at the new rate.
    pub fn set_tour_speed(&mut self, speed: u32) -> u32 {
        let speed = self.config.tour.clamp_speed(speed);
        self.tour.set_speed(speed, self.timers.as_ref(), &self.config.tour);
        speed
    }

    fn start_showcase(&mut self) {
        self.showcase_whole_catalog();
        if self.catalog.is_view_empty() {
            self.notifier.notify("No apps to showcase", Level::Warning);
            self.stop_page_tour();
            return;
        }
        self.session.preview_mode = PreviewMode::Iframe;
        self.catalog.reset_position();
        self.begin_session(true);
        let total = self.catalog.active_len();
        self.notifier
            .notify(&format!("Tour: showcasing {total} apps"), Level::Success);
    }

    /// The tour always covers every entry, whatever the active filter.
    fn showcase_whole_catalog(&mut self) {
        if *self.catalog.filter() == FilterMode::All {
            return;
        }
        let saved = self.catalog.filter().clone();
        let total = self.catalog.apply_filter(FilterMode::All);
        debug!(filter = %saved, total, "tour lifted the active filter");
        self.tour_filter = Some(saved);
        self.status(StatusUpdate::ViewReset { total });
    }

    fn restore_user_filter(&mut self) {
        let Some(filter) = self.tour_filter.take() else {
            return;
        };
        let total = self.catalog.apply_filter(filter);
        debug!(filter = %self.catalog.filter(), total, "tour restored the active filter");
        self.status(StatusUpdate::ViewReset { total });
    }

    // ── Timers ──────────────────────────────────────────────────────────────

    /// Handle a controller-owned timer. Stale events are dropped.
    /// Returns `false` for events this controller does not own.
    pub fn handle_timer(&mut self, event: TimerEvent) -> bool {
        match event.kind {
            TimerKind::Advance => {
                if self.accept_cycle(event) {
                    self.on_advance();
                }
            }
            TimerKind::Progress => {
                if self.accept_cycle(event) {
                    let percent = self
                        .session
                        .tick_progress(self.config.autopilot.progress_tick_ms);
                    self.status(StatusUpdate::Progress { percent });
                }
            }
            TimerKind::AutoOpen { entry_id } => {
                if !self.display.is_current(event.generation) {
                    debug!(?event, "stale auto-open dropped");
                    return true;
                }
                self.auto_open.fired();
                let still_current = self.catalog.current_entry().map(|e| e.id) == Some(entry_id);
                if still_current
                    && self.session.is_advancing()
                    && !self.preview.is_embedded_open()
                {
                    self.open_entry(entry_id, OpenTarget::Embedded);
                }
            }
            TimerKind::TourScroll => {
                if self.accept_tour(event)
                    && self.tour.scroll_frame(
                        self.viewport.as_ref(),
                        self.timers.as_ref(),
                        &self.config.tour,
                    ) == Frame::Arrived
                {
                    debug!("page tour reached the showcase section");
                }
            }
            TimerKind::TourSettle => {
                if self.accept_tour(event) && self.tour.settled() {
                    self.start_showcase();
                }
            }
            TimerKind::TourFinish => {
                if self.accept_tour(event) {
                    self.tour.finish_fired();
                    self.stop_page_tour();
                }
            }
            TimerKind::LoaderTimeout => self.preview.handle_timer(event),
            TimerKind::VoiceRearm => return false,
        }
        true
    }

    fn accept_cycle(&self, event: TimerEvent) -> bool {
        let fresh = self.session.is_current_cycle(event.generation) && self.session.is_advancing();
        if !fresh {
            debug!(?event, "stale autopilot tick dropped");
        }
        fresh
    }

    fn accept_tour(&self, event: TimerEvent) -> bool {
        let fresh = self.tour.is_current(event.generation) && self.tour.is_running();
        if !fresh {
            debug!(?event, "stale tour tick dropped");
        }
        fresh
    }

    fn on_advance(&mut self) {
        if self.catalog.is_at_last() {
            if self.session.tour_driven {
                self.complete_tour();
                return;
            }
            if !self.session.loop_enabled {
                self.complete();
                return;
            }
        }
        self.catalog.step(1);
        self.show_current();
    }

    // ── Persistence ─────────────────────────────────────────────────────────

    fn persist_settings(&self) {
        let settings = AutopilotSettings {
            speed: self.session.speed_ms,
            preview_mode: self.session.preview_mode,
            loop_enabled: self.session.loop_enabled,
            auto_open: self.session.auto_open,
            shuffle: self.catalog.shuffle_enabled(),
            scroll_mode: self.session.scroll_mode,
            filter_category: self
                .tour_filter
                .clone()
                .unwrap_or_else(|| self.catalog.filter().clone()),
        };
        store::store_json(self.store.as_ref(), SETTINGS_KEY, &settings);
    }

    fn persist_favorites(&self) {
        store::store_json(
            self.store.as_ref(),
            FAVORITES_KEY,
            &self.catalog.favorite_ids(),
        );
    }

    fn persist_viewed(&self) {
        store::store_json(self.store.as_ref(), VIEWED_KEY, &self.catalog.viewed_ids());
    }

    fn persist_stats(&self) {
        store::store_json(self.store.as_ref(), STATS_KEY, &self.stats);
    }
}
