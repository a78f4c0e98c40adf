//! Manual UI commands and the keyboard shortcut map.

use crate::catalog::FilterMode;
use crate::config::OpenTarget;
use crate::ports::ScrollMode;
use crate::preview::PreviewMode;
use serde::Deserialize;

/// Every manual control the host page can send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiCommand {
    /// Start the autopilot.
    Start,
    /// Stop the autopilot.
    Stop,
    /// Start when stopped, stop when running.
    ToggleAutopilot,
    /// Pause auto-advance.
    Pause,
    /// Resume auto-advance.
    Resume,
    /// Pause or resume.
    TogglePause,
    /// Next entry.
    Next,
    /// Previous entry.
    Previous,
    /// Set the advance interval.
    SetSpeed {
        /// Interval in milliseconds.
        ms: u64,
    },
    /// Loop at the end of the view.
    SetLoop {
        /// On or off.
        enabled: bool,
    },
    /// Auto-open the embedded preview while advancing.
    SetAutoOpen {
        /// On or off.
        enabled: bool,
    },
    /// Scroll strategy for the current entry.
    SetScrollMode {
        /// Strategy.
        mode: ScrollMode,
    },
    /// Preview mode for the current entry.
    SetPreviewMode {
        /// Mode.
        mode: PreviewMode,
    },
    /// Restrict the active view.
    ApplyFilter {
        /// Filter.
        filter: FilterMode,
    },
    /// Shuffle the active view.
    SetShuffle {
        /// On or off.
        enabled: bool,
    },
    /// Flip shuffle.
    ToggleShuffle,
    /// Flip favorite on the current entry.
    ToggleFavorite,
    /// Clear the viewed-set.
    ResetProgress,
    /// Collapse or expand the panel.
    ToggleMinimize,
    /// Remember where the panel was dragged to.
    SavePanelPosition {
        /// Left offset in pixels.
        left: f64,
        /// Top offset in pixels.
        top: f64,
    },
    /// Begin the page tour.
    StartTour,
    /// End the page tour.
    StopTour,
    /// Start or stop the page tour.
    ToggleTour,
    /// Set the page tour scroll speed.
    SetTourSpeed {
        /// Slider units.
        speed: u32,
    },
    /// Reload the embedded preview.
    RefreshPreview,
    /// Close any open preview.
    ClosePreview,
    /// Open the current entry in a new browsing context.
    OpenExternally,
    /// Open a specific entry (catalog click).
    OpenEntry {
        /// Entry id.
        id: usize,
        /// Destination.
        #[serde(default)]
        target: OpenTarget,
    },
    /// Start voice listening.
    StartListening,
    /// Stop voice listening.
    StopListening,
    /// Turn continuous listening on or off.
    SetContinuous {
        /// On or off.
        enabled: bool,
    },
}

/// A key press with its modifier state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyChord {
    /// Control held.
    #[serde(default)]
    pub ctrl: bool,
    /// Shift held.
    #[serde(default)]
    pub shift: bool,
    /// Key name as the host reports it, e.g. `a` or `ArrowLeft`.
    pub key: String,
}

impl KeyChord {
    /// Ctrl+Shift+`key`.
    pub fn ctrl_shift(key: &str) -> Self {
        Self {
            ctrl: true,
            shift: true,
            key: key.to_owned(),
        }
    }
}

/// Map a chord to its command. Only Ctrl+Shift chords are bound.
///
/// `P` only pauses or resumes a running session, so it needs to know
/// whether one is active.
pub fn shortcut_command(chord: &KeyChord, autopilot_active: bool) -> Option<UiCommand> {
    if !(chord.ctrl && chord.shift) {
        return None;
    }
    let command = match chord.key.to_lowercase().as_str() {
        "a" => UiCommand::ToggleAutopilot,
        "p" if autopilot_active => UiCommand::TogglePause,
        "arrowleft" => UiCommand::Previous,
        "arrowright" => UiCommand::Next,
        "f" => UiCommand::ToggleFavorite,
        "s" => UiCommand::ToggleShuffle,
        "t" => UiCommand::ToggleTour,
        _ => return None,
    };
    Some(command)
}
