//! Notification and status reporting.
//!
//! The controller, preview surface and voice interpreter report every
//! outcome through a [`Notifier`]. Notifiers are fire-and-forget: they must
//! not block and must never call back into the core.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Neutral information.
    Info,
    /// An action completed.
    Success,
    /// Degraded or empty state, or an unresolved command.
    Warning,
    /// A failure the user needs to know about.
    Error,
}

/// Listening indicator state for the voice layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceIndicator {
    /// Not listening.
    Idle,
    /// Speech source armed.
    Listening,
    /// Last recognition attempt failed.
    Error,
}

/// Autopilot panel status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutopilotState {
    /// Auto-advancing.
    Running,
    /// Active but not advancing.
    Paused,
    /// Not active.
    Stopped,
    /// Page tour is driving the page.
    Touring,
}

/// Non-toast UI state changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusUpdate {
    /// Status line changed.
    Autopilot {
        /// New state.
        state: AutopilotState,
    },
    /// "Now showing" label and position counter.
    NowShowing {
        /// Stable id of the entry.
        entry_id: usize,
        /// Display title.
        title: String,
        /// 1-based position within the active view.
        position: usize,
        /// Length of the active view.
        total: usize,
    },
    /// Active view was recomputed; nothing is selected yet.
    ViewReset {
        /// Length of the new active view.
        total: usize,
    },
    /// Progress indicator, 0–100.
    Progress {
        /// Percentage of the current advance window elapsed.
        percent: f64,
    },
    /// Favorite badge / view counter for one entry.
    EntryBadge {
        /// Stable id of the entry.
        entry_id: usize,
        /// Favorite flag.
        is_favorite: bool,
        /// Times shown.
        view_count: u32,
    },
    /// Voice listening indicator.
    Voice {
        /// New indicator state.
        indicator: VoiceIndicator,
    },
    /// Control panel collapsed or expanded.
    PanelMinimized {
        /// Whether the panel is collapsed.
        minimized: bool,
    },
    /// Voice command help listing requested.
    Help {
        /// Rendered listing.
        text: String,
    },
}

/// Everything a notifier can be told, as a single serialisable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShowcaseEvent {
    /// Transient toast.
    Notification {
        /// Human-readable message.
        message: String,
        /// Severity.
        level: Level,
    },
    /// UI state change.
    Status {
        /// The change.
        update: StatusUpdate,
    },
}

/// Status sink used by every component.
pub trait Notifier: Send + Sync {
    /// Show a transient, human-readable message.
    fn notify(&self, message: &str, level: Level);

    /// Reflect a UI state change. Sinks without a UI may ignore it.
    fn status(&self, update: StatusUpdate) {
        let _ = update;
    }
}

/// Notifier that writes every notification to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, level: Level) {
        match level {
            Level::Info | Level::Success => info!(target: "showcase::notify", "{message}"),
            Level::Warning => warn!(target: "showcase::notify", "{message}"),
            Level::Error => error!(target: "showcase::notify", "{message}"),
        }
    }

    fn status(&self, update: StatusUpdate) {
        debug!(target: "showcase::status", ?update);
    }
}

/// Notifier that broadcasts [`ShowcaseEvent`]s to any number of subscribers.
/// Every event is also logged through [`TracingNotifier`].
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: broadcast::Sender<ShowcaseEvent>,
    log: TracingNotifier,
}

impl ChannelNotifier {
    /// Create a notifier with the given broadcast capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            log: TracingNotifier,
        }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ShowcaseEvent> {
        self.tx.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, level: Level) {
        self.log.notify(message, level);
        // No subscribers is fine; notifications are fire-and-forget.
        let _ = self.tx.send(ShowcaseEvent::Notification {
            message: message.to_owned(),
            level,
        });
    }

    fn status(&self, update: StatusUpdate) {
        self.log.status(update.clone());
        let _ = self.tx.send(ShowcaseEvent::Status { update });
    }
}

/// Notifier that keeps every event in memory. Used by tests and replay.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ShowcaseEvent>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, Vec<ShowcaseEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All recorded notifications as `(message, level)`.
    pub fn notifications(&self) -> Vec<(String, Level)> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ShowcaseEvent::Notification { message, level } => Some((message.clone(), *level)),
                ShowcaseEvent::Status { .. } => None,
            })
            .collect()
    }

    /// All recorded status updates.
    pub fn statuses(&self) -> Vec<StatusUpdate> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ShowcaseEvent::Status { update } => Some(update.clone()),
                ShowcaseEvent::Notification { .. } => None,
            })
            .collect()
    }

    /// Most recent notification, if any.
    pub fn last_notification(&self) -> Option<(String, Level)> {
        self.notifications().pop()
    }

    /// Whether any notification message contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.notifications().iter().any(|(m, _)| m.contains(needle))
    }

    /// Number of notifications containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.notifications()
            .iter()
            .filter(|(m, _)| m.contains(needle))
            .count()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.events().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, level: Level) {
        self.events().push(ShowcaseEvent::Notification {
            message: message.to_owned(),
            level,
        });
    }

    fn status(&self, update: StatusUpdate) {
        self.events().push(ShowcaseEvent::Status { update });
    }
}
