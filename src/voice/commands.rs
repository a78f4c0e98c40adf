//! The voice command table.
//!
//! Matching is substring containment of the trigger phrase in the
//! utterance, tried in table order; the first hit wins. The order below is
//! part of the contract: overlapping phrases rely on it.

use serde::Serialize;
use std::fmt::Write as _;

/// Command group, used for help output and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandCategory {
    /// Page scrolling and section jumps.
    Navigation,
    /// Autopilot transport and panel.
    Autopilot,
    /// Opening, closing and finding apps.
    Apps,
    /// Help and the listening session itself.
    General,
}

impl CommandCategory {
    /// Heading used in the help listing.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Autopilot => "Autopilot Control",
            Self::Apps => "App Control",
            Self::General => "Voice Control",
        }
    }
}

/// What a matched command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceAction {
    /// Scroll up by the configured step.
    ScrollUp,
    /// Scroll down by the configured step.
    ScrollDown,
    /// Jump to the document start.
    ScrollToTop,
    /// Jump to the document end.
    ScrollToBottom,
    /// Jump to a named page section.
    GoToSection(&'static str),
    /// History back.
    GoBack,
    /// Start the autopilot.
    StartAutopilot,
    /// Stop the autopilot.
    StopAutopilot,
    /// Pause the autopilot.
    PauseAutopilot,
    /// Resume the autopilot.
    ResumeAutopilot,
    /// Next entry.
    NextApp,
    /// Previous entry.
    PreviousApp,
    /// Begin the page tour.
    StartTour,
    /// End the page tour.
    StopTour,
    /// Shorten the advance interval.
    SpeedUp,
    /// Lengthen the advance interval.
    SlowDown,
    /// Collapse the control panel.
    MinimizeAutopilot,
    /// Expand the control panel.
    MaximizeAutopilot,
    /// Open an app named in the rest of the utterance.
    OpenApp,
    /// Close the open preview.
    CloseApp,
    /// Run a catalog search for the rest of the utterance.
    Search,
    /// Focus the catalog search box.
    FocusSearch,
    /// Show the command listing.
    Help,
    /// Stop listening and leave continuous mode.
    StopListening,
    /// Start listening.
    StartListening,
    /// Turn continuous mode on.
    EnableContinuous,
    /// Turn continuous mode off.
    DisableContinuous,
}

/// One row of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceCommand {
    /// Group.
    pub category: CommandCategory,
    /// Phrase that must appear in the utterance.
    pub trigger: &'static str,
    /// Effect.
    pub action: VoiceAction,
}

const fn cmd(category: CommandCategory, trigger: &'static str, action: VoiceAction) -> VoiceCommand {
    VoiceCommand {
        category,
        trigger,
        action,
    }
}

use CommandCategory::{Apps, Autopilot, General, Navigation};
use VoiceAction as A;

/// Every supported phrase, in match order.
pub const COMMAND_TABLE: &[VoiceCommand] = &[
    cmd(Navigation, "scroll up", A::ScrollUp),
    cmd(Navigation, "scroll down", A::ScrollDown),
    cmd(Navigation, "scroll to top", A::ScrollToTop),
    cmd(Navigation, "scroll to bottom", A::ScrollToBottom),
    cmd(Navigation, "go to home", A::GoToSection("home")),
    cmd(Navigation, "go to about", A::GoToSection("about")),
    cmd(Navigation, "go to blog", A::GoToSection("blog")),
    cmd(Navigation, "go to projects", A::GoToSection("projects")),
    cmd(Navigation, "go to apps", A::GoToSection("projects")),
    cmd(Navigation, "go to community", A::GoToSection("community")),
    cmd(Navigation, "go back", A::GoBack),
    cmd(Autopilot, "start autopilot", A::StartAutopilot),
    cmd(Autopilot, "stop autopilot", A::StopAutopilot),
    cmd(Autopilot, "pause autopilot", A::PauseAutopilot),
    cmd(Autopilot, "resume autopilot", A::ResumeAutopilot),
    cmd(Autopilot, "next app", A::NextApp),
    cmd(Autopilot, "previous app", A::PreviousApp),
    cmd(Autopilot, "start tour", A::StartTour),
    cmd(Autopilot, "stop tour", A::StopTour),
    cmd(Autopilot, "speed up", A::SpeedUp),
    cmd(Autopilot, "slow down", A::SlowDown),
    cmd(Autopilot, "minimize autopilot", A::MinimizeAutopilot),
    cmd(Autopilot, "maximize autopilot", A::MaximizeAutopilot),
    cmd(Apps, "open app", A::OpenApp),
    cmd(Apps, "close app", A::CloseApp),
    cmd(Apps, "search for", A::Search),
    cmd(Apps, "show apps", A::GoToSection("projects")),
    cmd(Apps, "open search", A::FocusSearch),
    cmd(General, "help", A::Help),
    cmd(General, "what can you do", A::Help),
    cmd(General, "stop listening", A::StopListening),
    cmd(General, "start listening", A::StartListening),
    cmd(General, "enable continuous mode", A::EnableContinuous),
    cmd(General, "disable continuous mode", A::DisableContinuous),
];

/// First table row whose trigger occurs in `utterance`.
pub fn match_command(utterance: &str) -> Option<&'static VoiceCommand> {
    COMMAND_TABLE.iter().find(|c| utterance.contains(c.trigger))
}

/// Plain-text listing of every phrase, grouped by category.
pub fn help_text() -> String {
    let mut out = String::from("Voice commands\n");
    let categories = [Navigation, Autopilot, Apps, General];
    for category in categories {
        let _ = writeln!(out, "\n{}:", category.heading());
        for command in COMMAND_TABLE.iter().filter(|c| c.category == category) {
            let _ = writeln!(out, "  \"{}\"", command.trigger);
        }
        if category == Apps {
            out.push_str("  \"open <app name>\"\n");
        }
    }
    out
}
