//! Ports to the host page.
//!
//! The core never touches a rendering tree. Scrolling, search, speech
//! recognition and preview rendering go through these traits, which the
//! host implements. Recording implementations are provided for tests and
//! for the headless host.

use crate::catalog::CatalogEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Viewport ─────────────────────────────────────────────────────────────────

/// How the catalog element of the current entry is brought into view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollMode {
    /// Center the element.
    #[default]
    Center,
    /// Align the element to the top.
    Top,
    /// Smooth-follow the element to the center.
    Smooth,
    /// Leave the scroll position alone.
    None,
}

/// Page scroll primitives.
pub trait ViewportPort: Send + Sync {
    /// Current vertical scroll offset.
    fn scroll_y(&self) -> f64;

    /// Largest reachable scroll offset (document height minus viewport).
    fn max_scroll_y(&self) -> f64;

    /// Jump to an absolute offset.
    fn scroll_to(&self, y: f64);

    /// Scroll relative to the current offset, clamped to the document.
    fn scroll_by(&self, dy: f64) {
        let target = (self.scroll_y() + dy).clamp(0.0, self.max_scroll_y().max(0.0));
        self.scroll_to(target);
    }

    /// Scroll to the document start.
    fn scroll_to_top(&self) {
        self.scroll_to(0.0);
    }

    /// Scroll to the document end.
    fn scroll_to_bottom(&self) {
        self.scroll_to(self.max_scroll_y());
    }

    /// Bring the catalog element of `entry_id` into view.
    fn scroll_into_view(&self, entry_id: usize, mode: ScrollMode);

    /// Absolute offset of a named section, if the page has one.
    fn section_offset(&self, section: &str) -> Option<f64>;

    /// Scroll to a named section. Returns `false` when it does not exist.
    fn scroll_to_section(&self, section: &str) -> bool {
        match self.section_offset(section) {
            Some(y) => {
                self.scroll_to(y);
                true
            }
            None => false,
        }
    }
}

/// Calls observed by [`RecordingViewport`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportCall {
    /// Absolute scroll.
    ScrollTo(f64),
    /// Entry brought into view.
    IntoView {
        /// Entry id.
        entry_id: usize,
        /// Strategy used.
        mode: ScrollMode,
    },
}

#[derive(Debug, Default)]
struct ViewportState {
    y: f64,
    max_y: f64,
    sections: HashMap<String, f64>,
    calls: Vec<ViewportCall>,
}

/// In-memory page with a fixed height and named sections.
#[derive(Debug, Default)]
pub struct RecordingViewport {
    state: Mutex<ViewportState>,
}

impl RecordingViewport {
    /// A page whose maximum scroll offset is `max_y`.
    pub fn new(max_y: f64) -> Self {
        Self {
            state: Mutex::new(ViewportState {
                max_y,
                ..ViewportState::default()
            }),
        }
    }

    /// Register a named section at offset `y`.
    pub fn with_section(self, name: &str, y: f64) -> Self {
        lock(&self.state).sections.insert(name.to_owned(), y);
        self
    }

    /// Every call seen so far.
    pub fn calls(&self) -> Vec<ViewportCall> {
        lock(&self.state).calls.clone()
    }

    /// Entries scrolled into view, in order.
    pub fn entries_shown(&self) -> Vec<usize> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|c| match c {
                ViewportCall::IntoView { entry_id, .. } => Some(*entry_id),
                ViewportCall::ScrollTo(_) => None,
            })
            .collect()
    }
}

impl ViewportPort for RecordingViewport {
    fn scroll_y(&self) -> f64 {
        lock(&self.state).y
    }

    fn max_scroll_y(&self) -> f64 {
        lock(&self.state).max_y
    }

    fn scroll_to(&self, y: f64) {
        let mut state = lock(&self.state);
        state.y = y.clamp(0.0, state.max_y.max(0.0));
        state.calls.push(ViewportCall::ScrollTo(y));
    }

    fn scroll_into_view(&self, entry_id: usize, mode: ScrollMode) {
        lock(&self.state)
            .calls
            .push(ViewportCall::IntoView { entry_id, mode });
    }

    fn section_offset(&self, section: &str) -> Option<f64> {
        lock(&self.state).sections.get(section).copied()
    }
}

// ── Page (search, history) ───────────────────────────────────────────────────

/// Non-scroll page affordances the voice layer drives.
pub trait PagePort: Send + Sync {
    /// Navigate back in history.
    fn go_back(&self);

    /// Focus the catalog search box. Returns `false` when the page has none.
    fn focus_search(&self) -> bool;

    /// Put `query` into the catalog search box and run it.
    /// Returns `false` when the page has none.
    fn submit_search(&self, query: &str) -> bool;
}

/// Calls observed by [`RecordingPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    /// History back.
    GoBack,
    /// Search focused.
    FocusSearch,
    /// Search submitted.
    Search(String),
}

/// In-memory page with an optional search box.
#[derive(Debug)]
pub struct RecordingPage {
    has_search: bool,
    calls: Mutex<Vec<PageCall>>,
}

impl RecordingPage {
    /// A page with (or without) a search box.
    pub fn new(has_search: bool) -> Self {
        Self {
            has_search,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call seen so far.
    pub fn calls(&self) -> Vec<PageCall> {
        lock(&self.calls).clone()
    }
}

impl Default for RecordingPage {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PagePort for RecordingPage {
    fn go_back(&self) {
        lock(&self.calls).push(PageCall::GoBack);
    }

    fn focus_search(&self) -> bool {
        if self.has_search {
            lock(&self.calls).push(PageCall::FocusSearch);
        }
        self.has_search
    }

    fn submit_search(&self, query: &str) -> bool {
        if self.has_search {
            lock(&self.calls).push(PageCall::Search(query.to_owned()));
        }
        self.has_search
    }
}

// ── Speech source ────────────────────────────────────────────────────────────

/// Recognition settings handed to the speech source once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSettings {
    /// Language tag, e.g. `en-US`.
    pub language: String,
    /// Whether the source itself keeps listening across utterances.
    pub continuous: bool,
    /// Whether partial results are emitted.
    pub interim_results: bool,
    /// Number of alternatives per result.
    pub max_alternatives: u8,
}

impl SpeechSettings {
    /// Settings for single-utterance recognition in `language`.
    pub fn single_utterance(language: &str) -> Self {
        Self {
            language: language.to_owned(),
            continuous: false,
            interim_results: false,
            max_alternatives: 3,
        }
    }
}

/// Why the speech source refused to start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechStartError {
    /// The runtime has no speech recognition.
    #[error("speech recognition is not available")]
    Unavailable,
    /// Recognition is already running.
    #[error("speech recognition is already listening")]
    AlreadyListening,
    /// Anything else the runtime reported.
    #[error("speech recognition failed to start: {0}")]
    Other(String),
}

/// Errors reported asynchronously by the speech source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechErrorKind {
    /// Nothing was heard before the source gave up.
    NoSpeech,
    /// Microphone permission was denied.
    NotAllowed,
    /// Any other runtime error.
    Other(String),
}

/// Callbacks emitted by the speech source.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    /// The source began listening.
    Started,
    /// A final recognition result.
    Result {
        /// Recognised text, as produced by the source.
        utterance: String,
        /// Recogniser confidence, 0..1.
        confidence: f32,
    },
    /// The source reported an error.
    Error(SpeechErrorKind),
    /// The source stopped listening.
    Ended,
}

/// Speech recognition capability supplied by the runtime.
pub trait SpeechSource: Send + Sync {
    /// Whether recognition exists at all.
    fn is_available(&self) -> bool;

    /// Apply recognition settings.
    fn configure(&self, settings: &SpeechSettings);

    /// Begin listening.
    ///
    /// # Errors
    ///
    /// Returns [`SpeechStartError`] when the source cannot start.
    fn start(&self) -> Result<(), SpeechStartError>;

    /// Stop listening.
    fn stop(&self);
}

#[derive(Debug, Default)]
struct SpeechState {
    settings: Option<SpeechSettings>,
    starts: usize,
    stops: usize,
    listening: bool,
}

/// Speech source that only counts start/stop requests.
#[derive(Debug)]
pub struct RecordingSpeech {
    available: bool,
    state: Mutex<SpeechState>,
}

impl RecordingSpeech {
    /// A source that is (or is not) available.
    pub fn new(available: bool) -> Self {
        Self {
            available,
            state: Mutex::new(SpeechState::default()),
        }
    }

    /// Number of accepted `start` calls.
    pub fn starts(&self) -> usize {
        lock(&self.state).starts
    }

    /// Number of `stop` calls.
    pub fn stops(&self) -> usize {
        lock(&self.state).stops
    }

    /// Settings applied by `configure`.
    pub fn settings(&self) -> Option<SpeechSettings> {
        lock(&self.state).settings.clone()
    }

    /// Simulate the source ending on its own (the host would emit `Ended`).
    pub fn finish(&self) {
        lock(&self.state).listening = false;
    }
}

impl Default for RecordingSpeech {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SpeechSource for RecordingSpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    fn configure(&self, settings: &SpeechSettings) {
        lock(&self.state).settings = Some(settings.clone());
    }

    fn start(&self) -> Result<(), SpeechStartError> {
        if !self.available {
            return Err(SpeechStartError::Unavailable);
        }
        let mut state = lock(&self.state);
        if state.listening {
            return Err(SpeechStartError::AlreadyListening);
        }
        state.listening = true;
        state.starts += 1;
        Ok(())
    }

    fn stop(&self) {
        let mut state = lock(&self.state);
        state.listening = false;
        state.stops += 1;
    }
}

// ── Preview rendering ────────────────────────────────────────────────────────

/// Renders previews. Embedded content is untrusted and reports its own
/// load/error signals back through the host.
pub trait PreviewRenderer: Send + Sync {
    /// Render the non-navigating summary popup for an entry.
    fn show_popup(&self, entry: &CatalogEntry);

    /// Remove the summary popup.
    fn hide_popup(&self);

    /// Load `url` into the single embedded view, titled `title`. The host
    /// reports completion or failure tagged with `load_id`.
    fn load_embedded(&self, url: &str, title: &str, load_id: u64);

    /// Reload the embedded view from scratch, bypassing caches.
    fn reload_embedded(&self, url: &str, load_id: u64);

    /// Blank and hide the embedded view.
    fn clear_embedded(&self);

    /// Show or hide the loading indicator.
    fn set_loading(&self, loading: bool);

    /// Open `url` in a new top-level browsing context.
    fn open_external(&self, url: &str);
}

/// Calls observed by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    /// Popup rendered for an entry id.
    Popup(usize),
    /// Popup removed.
    HidePopup,
    /// Embedded view loaded.
    Load {
        /// URL loaded.
        url: String,
        /// Title shown.
        title: String,
        /// Tag the host reports the load outcome with.
        load_id: u64,
    },
    /// Embedded view reloaded.
    Reload {
        /// URL reloaded.
        url: String,
        /// Tag the host reports the load outcome with.
        load_id: u64,
    },
    /// Embedded view cleared.
    Clear,
    /// Loading indicator toggled.
    Loading(bool),
    /// URL opened externally.
    External(String),
}

/// Renderer that records every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call seen so far.
    pub fn calls(&self) -> Vec<RenderCall> {
        lock(&self.calls).clone()
    }

    /// URLs loaded into the embedded view, in order.
    pub fn loaded_urls(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                RenderCall::Load { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    /// Tag of the most recent load or reload.
    pub fn last_load_id(&self) -> Option<u64> {
        lock(&self.calls).iter().rev().find_map(|c| match c {
            RenderCall::Load { load_id, .. } | RenderCall::Reload { load_id, .. } => {
                Some(*load_id)
            }
            _ => None,
        })
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }
}

impl PreviewRenderer for RecordingRenderer {
    fn show_popup(&self, entry: &CatalogEntry) {
        lock(&self.calls).push(RenderCall::Popup(entry.id));
    }

    fn hide_popup(&self) {
        lock(&self.calls).push(RenderCall::HidePopup);
    }

    fn load_embedded(&self, url: &str, title: &str, load_id: u64) {
        lock(&self.calls).push(RenderCall::Load {
            url: url.to_owned(),
            title: title.to_owned(),
            load_id,
        });
    }

    fn reload_embedded(&self, url: &str, load_id: u64) {
        lock(&self.calls).push(RenderCall::Reload {
            url: url.to_owned(),
            load_id,
        });
    }

    fn clear_embedded(&self) {
        lock(&self.calls).push(RenderCall::Clear);
    }

    fn set_loading(&self, loading: bool) {
        lock(&self.calls).push(RenderCall::Loading(loading));
    }

    fn open_external(&self, url: &str) {
        lock(&self.calls).push(RenderCall::External(url.to_owned()));
    }
}
