//! Shared harness for integration tests: a [`Showcase`] wired to recording
//! ports and a manual clock.

use cosmic_autopilot::autopilot::AutopilotController;
use cosmic_autopilot::catalog::{Catalog, CatalogSource};
use cosmic_autopilot::config::ShowcaseConfig;
use cosmic_autopilot::ports::{
    RecordingPage, RecordingRenderer, RecordingSpeech, RecordingViewport, ViewportPort,
};
use cosmic_autopilot::showcase::{Showcase, ShowcasePorts};
use cosmic_autopilot::status::RecordingNotifier;
use cosmic_autopilot::store::{MemoryStore, PreferenceStore};
use cosmic_autopilot::timer::ManualTimers;
use cosmic_autopilot::voice::Dispatch;
use std::sync::Arc;

/// Page height used by every harness viewport.
pub(crate) const PAGE_MAX_Y: f64 = 2_000.0;
/// Offset of the catalog section on the harness page.
pub(crate) const PROJECTS_Y: f64 = 800.0;

/// Knobs for [`Harness::build`].
pub(crate) struct Options {
    pub speech_available: bool,
    pub has_search: bool,
    pub store: Arc<dyn PreferenceStore>,
    pub config: ShowcaseConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            speech_available: true,
            has_search: true,
            store: Arc::new(MemoryStore::new()),
            config: ShowcaseConfig::default(),
        }
    }
}

pub(crate) struct Harness {
    pub showcase: Showcase,
    pub timers: Arc<ManualTimers>,
    pub viewport: Arc<RecordingViewport>,
    pub page: Arc<RecordingPage>,
    pub speech: Arc<RecordingSpeech>,
    pub renderer: Arc<RecordingRenderer>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub(crate) fn new(sources: Vec<CatalogSource>) -> Self {
        Self::build(sources, Options::default())
    }

    pub(crate) fn build(sources: Vec<CatalogSource>, options: Options) -> Self {
        let timers = Arc::new(ManualTimers::new());
        let viewport = Arc::new(
            RecordingViewport::new(PAGE_MAX_Y)
                .with_section("home", 0.0)
                .with_section("about", 400.0)
                .with_section("projects", PROJECTS_Y)
                .with_section("blog", 1_400.0),
        );
        let page = Arc::new(RecordingPage::new(options.has_search));
        let speech = Arc::new(RecordingSpeech::new(options.speech_available));
        let renderer = Arc::new(RecordingRenderer::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let ports = ShowcasePorts {
            timers: timers.clone(),
            viewport: viewport.clone(),
            page: page.clone(),
            speech: speech.clone(),
            renderer: renderer.clone(),
            notifier: notifier.clone(),
            store: options.store,
        };
        let showcase = Showcase::new(options.config, Catalog::load_seeded(sources, 7), ports);
        Self {
            showcase,
            timers,
            viewport,
            page,
            speech,
            renderer,
            notifier,
        }
    }

    pub(crate) fn controller(&self) -> &AutopilotController {
        self.showcase.controller()
    }

    pub(crate) fn controller_mut(&mut self) -> &mut AutopilotController {
        self.showcase.controller_mut()
    }

    /// Move the manual clock forward, delivering every due timer.
    pub(crate) fn advance(&mut self, ms: u64) {
        let timers = Arc::clone(&self.timers);
        timers.advance(ms, |event| self.showcase.handle_timer(event));
    }

    /// Advance in `step_ms` increments until `done` holds or `max_ms` passes.
    /// Returns whether `done` was reached.
    pub(crate) fn advance_until(
        &mut self,
        step_ms: u64,
        max_ms: u64,
        done: impl Fn(&Showcase) -> bool,
    ) -> bool {
        let mut elapsed = 0;
        while elapsed < max_ms {
            if done(&self.showcase) {
                return true;
            }
            self.advance(step_ms);
            elapsed += step_ms;
        }
        done(&self.showcase)
    }

    pub(crate) fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y()
    }

    pub(crate) fn say(&mut self, text: &str, confidence: f32) -> Dispatch {
        self.showcase.handle_utterance(text, confidence)
    }
}

/// The two-entry catalog from the loop-off walkthrough.
pub(crate) fn two_apps() -> Vec<CatalogSource> {
    vec![
        CatalogSource::new("Pic2Puzz", "https://pic2puzz.space", "game"),
        CatalogSource::new("Glow Radio", "https://x", "creative"),
    ]
}

/// A small mixed catalog.
pub(crate) fn four_apps() -> Vec<CatalogSource> {
    vec![
        CatalogSource::new("Pic2Puzz", "https://pic2puzz.space", "game"),
        CatalogSource::new("Glow Radio", "https://glow.example", "creative"),
        CatalogSource::new("Tile Forge", "https://tiles.example", "tool"),
        CatalogSource::new("Star Notes", "https://notes.example", "tool"),
    ]
}
