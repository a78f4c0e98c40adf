//! Preview surface: popup summary or a single reusable embedded view.
//!
//! State machine: `Closed → Popup → Closed`, `Closed → Embedded → Closed`.
//! Opening one mode while the other is open closes the other first. Every
//! launch is validated before the renderer is touched; an unusable URL is
//! reported and rejected.

use crate::catalog::CatalogEntry;
use crate::config::PreviewConfig;
use crate::error::{Result, ShowcaseError};
use crate::ports::PreviewRenderer;
use crate::status::{Level, Notifier};
use crate::timer::{Cadence, Generation, TimerEvent, TimerKind, TimerPort, TimerSlot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How the autopilot presents the current entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    /// Nothing is shown beyond the catalog highlight.
    #[default]
    None,
    /// Summary popup.
    Popup,
    /// Live embedded view.
    #[serde(alias = "embedded")]
    Iframe,
}

impl PreviewMode {
    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No Preview",
            Self::Popup => "Popup Preview",
            Self::Iframe => "Live Preview",
        }
    }
}

/// What the surface is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// Nothing open.
    Closed,
    /// Summary popup for an entry.
    Popup {
        /// Entry shown.
        entry_id: usize,
    },
    /// Embedded view.
    Embedded {
        /// Entry shown.
        entry_id: usize,
        /// URL loaded.
        url: String,
        /// Title in the header.
        title: String,
        /// Loading indicator visible.
        loading: bool,
        /// The last load reported failure.
        failed: bool,
    },
}

/// The single preview surface of the page.
pub struct PreviewSurface {
    config: PreviewConfig,
    renderer: Arc<dyn PreviewRenderer>,
    notifier: Arc<dyn Notifier>,
    timers: Arc<dyn TimerPort>,
    state: PreviewState,
    load: Generation,
    loader: TimerSlot,
}

impl PreviewSurface {
    /// Create a closed surface.
    pub fn new(
        config: PreviewConfig,
        renderer: Arc<dyn PreviewRenderer>,
        notifier: Arc<dyn Notifier>,
        timers: Arc<dyn TimerPort>,
    ) -> Self {
        Self {
            config,
            renderer,
            notifier,
            timers,
            state: PreviewState::Closed,
            load: Generation::default(),
            loader: TimerSlot::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Whether the embedded view is open.
    pub fn is_embedded_open(&self) -> bool {
        matches!(self.state, PreviewState::Embedded { .. })
    }

    /// Whether the popup is open.
    pub fn is_popup_open(&self) -> bool {
        matches!(self.state, PreviewState::Popup { .. })
    }

    /// Entry loaded in the embedded view.
    pub fn embedded_entry(&self) -> Option<usize> {
        match self.state {
            PreviewState::Embedded { entry_id, .. } => Some(entry_id),
            _ => None,
        }
    }

    /// Tag of the most recent embedded load.
    pub fn load_id(&self) -> u64 {
        self.load.current()
    }

    fn ensure_launchable(&self, entry: &CatalogEntry) -> Result<()> {
        if entry.is_launchable() {
            return Ok(());
        }
        warn!(entry_id = entry.id, url = %entry.url, "rejected launch of unlaunchable entry");
        self.notifier.notify(
            &format!("Cannot open \"{}\": it has no launchable link", entry.title),
            Level::Error,
        );
        Err(ShowcaseError::Unlaunchable {
            title: entry.title.clone(),
        })
    }

    /// Render the summary popup for `entry`, closing the embedded view first.
    ///
    /// # Errors
    ///
    /// Returns [`ShowcaseError::Unlaunchable`] (after reporting it) when the
    /// entry has no usable URL.
    pub fn show_popup(&mut self, entry: &CatalogEntry) -> Result<()> {
        self.ensure_launchable(entry)?;
        if self.is_embedded_open() {
            self.close_embedded();
        }
        self.renderer.show_popup(entry);
        self.state = PreviewState::Popup { entry_id: entry.id };
        debug!(entry_id = entry.id, "popup preview shown");
        Ok(())
    }

    /// Load `entry` into the embedded view, closing the popup first.
    /// Showing the entry that is already embedded is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ShowcaseError::Unlaunchable`] (after reporting it) when the
    /// entry has no usable URL.
    pub fn show_embedded(&mut self, entry: &CatalogEntry) -> Result<()> {
        self.ensure_launchable(entry)?;
        if let PreviewState::Embedded { url, .. } = &self.state
            && *url == entry.url
        {
            return Ok(());
        }
        if self.is_popup_open() {
            self.renderer.hide_popup();
        }

        let load_id = self.load.bump();
        self.renderer.set_loading(true);
        self.renderer.load_embedded(&entry.url, &entry.title, load_id);
        self.state = PreviewState::Embedded {
            entry_id: entry.id,
            url: entry.url.clone(),
            title: entry.title.clone(),
            loading: true,
            failed: false,
        };
        self.arm_loader(load_id);
        info!(entry_id = entry.id, load_id, "embedded preview loading");
        Ok(())
    }

    /// Hard-reload the embedded view. Returns `false` (and reports it) when
    /// nothing is embedded.
    pub fn refresh(&mut self) -> bool {
        let PreviewState::Embedded { url, .. } = &self.state else {
            self.notifier
                .notify("No live preview to refresh", Level::Warning);
            return false;
        };
        let url = url.clone();
        let load_id = self.load.bump();
        self.renderer.set_loading(true);
        self.renderer.reload_embedded(&url, load_id);
        if let PreviewState::Embedded {
            loading, failed, ..
        } = &mut self.state
        {
            *loading = true;
            *failed = false;
        }
        self.arm_loader(load_id);
        true
    }

    /// Open `entry` in a new top-level browsing context. Embedded state is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ShowcaseError::Unlaunchable`] (after reporting it) when the
    /// entry has no usable URL.
    pub fn open_externally(&mut self, entry: &CatalogEntry) -> Result<()> {
        self.ensure_launchable(entry)?;
        self.renderer.open_external(&entry.url);
        self.notifier
            .notify(&format!("Opened {} in a new tab", entry.title), Level::Success);
        Ok(())
    }

    /// Tear down whichever mode is open. Returns whether anything was open.
    pub fn close(&mut self) -> bool {
        match self.state {
            PreviewState::Closed => false,
            PreviewState::Popup { .. } => {
                self.renderer.hide_popup();
                self.state = PreviewState::Closed;
                true
            }
            PreviewState::Embedded { .. } => {
                self.close_embedded();
                true
            }
        }
    }

    fn close_embedded(&mut self) {
        self.loader.clear(self.timers.as_ref());
        // Outstanding load signals belong to the torn-down view.
        self.load.bump();
        if let PreviewState::Embedded { loading: true, .. } = self.state {
            self.renderer.set_loading(false);
        }
        self.renderer.clear_embedded();
        self.state = PreviewState::Closed;
    }

    fn arm_loader(&mut self, load_id: u64) {
        self.loader.arm(
            self.timers.as_ref(),
            Cadence::once_ms(self.config.loader_timeout_ms),
            TimerEvent::new(TimerKind::LoaderTimeout, load_id),
        );
    }

    fn finish_loading(&mut self, load_id: u64) -> bool {
        if !self.load.is_current(load_id) {
            debug!(load_id, current = self.load.current(), "stale preview signal ignored");
            return false;
        }
        let PreviewState::Embedded { loading, .. } = &mut self.state else {
            return false;
        };
        if *loading {
            *loading = false;
            self.renderer.set_loading(false);
        }
        true
    }

    /// The embedded content signalled load completion.
    pub fn on_embedded_loaded(&mut self, load_id: u64) {
        if self.finish_loading(load_id) {
            self.loader.clear(self.timers.as_ref());
        }
    }

    /// The embedded content failed to load. Reported, never propagated.
    pub fn on_embedded_failed(&mut self, load_id: u64, reason: &str) {
        if !self.finish_loading(load_id) {
            return;
        }
        self.loader.clear(self.timers.as_ref());
        if let PreviewState::Embedded { title, failed, .. } = &mut self.state {
            *failed = true;
            warn!(load_id, reason, "embedded preview failed to load");
            self.notifier.notify(
                &format!("Preview of {title} could not be loaded: {reason}"),
                Level::Warning,
            );
        }
    }

    /// Handle a preview-owned timer.
    pub fn handle_timer(&mut self, event: TimerEvent) {
        if event.kind == TimerKind::LoaderTimeout {
            self.loader.fired();
            self.finish_loading(event.generation);
        }
    }
}
