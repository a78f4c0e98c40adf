//! Speech-driven command interpreter.

use super::commands::{VoiceAction, VoiceCommand, help_text, match_command};
use crate::autopilot::AutopilotController;
use crate::config::VoiceConfig;
use crate::error::{Result, ShowcaseError};
use crate::ports::{PagePort, SpeechErrorKind, SpeechEvent, SpeechSettings, SpeechSource, SpeechStartError, ViewportPort};
use crate::status::{Level, Notifier, StatusUpdate, VoiceIndicator};
use crate::timer::{Cadence, Generation, TimerEvent, TimerKind, TimerPort, TimerSlot};
use std::sync::Arc;
use tracing::{debug, info, warn};

const FILLER_WORDS: &[&str] = &["open", "app", "application"];

/// What an utterance turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Discarded below the confidence threshold.
    LowConfidence,
    /// A table command ran.
    Command(VoiceAction),
    /// The free-text opener resolved an entry.
    Opened(usize),
    /// The free-text opener found nothing; carries the unresolved text.
    Unresolved(String),
    /// Nothing matched.
    Unrecognized,
}

/// Host collaborators the interpreter drives directly.
#[derive(Clone)]
pub struct VoicePorts {
    /// Speech recognition.
    pub speech: Arc<dyn SpeechSource>,
    /// Page scrolling.
    pub viewport: Arc<dyn ViewportPort>,
    /// Search box and history.
    pub page: Arc<dyn PagePort>,
    /// Toasts and status.
    pub notifier: Arc<dyn Notifier>,
    /// Re-arm scheduling.
    pub timers: Arc<dyn TimerPort>,
}

/// Turns `(utterance, confidence)` pairs into controller and page actions.
pub struct CommandInterpreter {
    config: VoiceConfig,
    speech: Arc<dyn SpeechSource>,
    viewport: Arc<dyn ViewportPort>,
    page: Arc<dyn PagePort>,
    notifier: Arc<dyn Notifier>,
    timers: Arc<dyn TimerPort>,
    listening: bool,
    continuous: bool,
    permission_denied: bool,
    rearm: TimerSlot,
    rearm_generation: Generation,
    last_command: Option<&'static str>,
}

impl CommandInterpreter {
    /// Create the interpreter and hand recognition settings to the speech
    /// source.
    pub fn new(config: VoiceConfig, ports: VoicePorts) -> Self {
        if ports.speech.is_available() {
            ports
                .speech
                .configure(&SpeechSettings::single_utterance(&config.language));
        } else {
            warn!("speech recognition is not available");
            ports.notifier.notify(
                "Voice control not supported in this browser",
                Level::Warning,
            );
        }
        Self {
            config,
            speech: ports.speech,
            viewport: ports.viewport,
            page: ports.page,
            notifier: ports.notifier,
            timers: ports.timers,
            listening: false,
            continuous: false,
            permission_denied: false,
            rearm: TimerSlot::default(),
            rearm_generation: Generation::default(),
            last_command: None,
        }
    }

    /// Whether the speech source is listening.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Whether continuous mode is on.
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Whether the microphone was refused this session.
    pub fn permission_denied(&self) -> bool {
        self.permission_denied
    }

    /// Trigger of the last table command that ran.
    pub fn last_command(&self) -> Option<&'static str> {
        self.last_command
    }

    fn indicator(&self, indicator: VoiceIndicator) {
        self.notifier.status(StatusUpdate::Voice { indicator });
    }

    // ── Listening session ───────────────────────────────────────────────────

    /// Ask the speech source to listen. Returns whether it is listening.
    pub fn start_listening(&mut self) -> bool {
        if !self.speech.is_available() {
            self.notifier
                .notify("Voice control not available", Level::Error);
            return false;
        }
        // An explicit start is a fresh permission prompt.
        self.permission_denied = false;
        match self.begin_listening() {
            Ok(()) => true,
            Err(e) => {
                warn!("cannot start speech recognition: {e}");
                self.indicator(VoiceIndicator::Error);
                let reason = match &e {
                    ShowcaseError::Speech(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                self.notifier
                    .notify(&format!("Voice error: {reason}"), Level::Error);
                false
            }
        }
    }

    /// Start the speech source. A source that is already listening counts
    /// as started.
    ///
    /// # Errors
    ///
    /// Returns [`ShowcaseError::Speech`] when the source refuses to start.
    fn begin_listening(&mut self) -> Result<()> {
        match self.speech.start() {
            Ok(()) | Err(SpeechStartError::AlreadyListening) => {
                self.listening = true;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn halt_listening(&mut self) -> bool {
        self.continuous = false;
        self.cancel_rearm();
        if !self.listening {
            return false;
        }
        self.speech.stop();
        self.listening = false;
        self.indicator(VoiceIndicator::Idle);
        true
    }

    /// Stop listening and leave continuous mode. Any scheduled re-arm is
    /// cancelled.
    pub fn stop_listening(&mut self) {
        if self.halt_listening() {
            self.notifier.notify("Voice control stopped", Level::Info);
        } else {
            self.notifier
                .notify("Voice control is not listening", Level::Info);
        }
    }

    /// Turn continuous mode on (and start listening) or off (and stop).
    pub fn set_continuous(&mut self, enabled: bool) {
        if enabled {
            self.continuous = true;
            self.notifier
                .notify("Continuous listening enabled", Level::Success);
            if !self.listening {
                self.start_listening();
            }
        } else {
            self.notifier
                .notify("Continuous listening disabled", Level::Info);
            self.halt_listening();
        }
    }

    fn cancel_rearm(&mut self) {
        self.rearm_generation.bump();
        self.rearm.clear(self.timers.as_ref());
    }

    fn schedule_rearm(&mut self, delay_ms: u64) {
        if !self.continuous || self.permission_denied {
            return;
        }
        let generation = self.rearm_generation.bump();
        self.rearm.arm(
            self.timers.as_ref(),
            Cadence::once_ms(delay_ms),
            TimerEvent::new(TimerKind::VoiceRearm, generation),
        );
        debug!(delay_ms, generation, "voice re-arm scheduled");
    }

    /// Handle the re-arm timer. Returns `false` for events it does not own.
    pub fn handle_timer(&mut self, event: TimerEvent) -> bool {
        if event.kind != TimerKind::VoiceRearm {
            return false;
        }
        if !self.rearm_generation.is_current(event.generation) {
            debug!(?event, "stale voice re-arm dropped");
            return true;
        }
        self.rearm.fired();
        if self.continuous && !self.permission_denied && !self.listening {
            self.start_listening();
        }
        true
    }

    // ── Speech callbacks ────────────────────────────────────────────────────

    /// React to a speech source callback.
    pub fn handle_speech(
        &mut self,
        event: SpeechEvent,
        controller: &mut AutopilotController,
    ) -> Option<Dispatch> {
        match event {
            SpeechEvent::Started => {
                self.listening = true;
                self.indicator(VoiceIndicator::Listening);
                self.notifier.notify("Listening...", Level::Info);
                None
            }
            SpeechEvent::Result {
                utterance,
                confidence,
            } => Some(self.handle_utterance(&utterance, confidence, controller)),
            SpeechEvent::Error(kind) => {
                self.indicator(VoiceIndicator::Error);
                match kind {
                    SpeechErrorKind::NoSpeech => {
                        self.notifier.notify("No speech detected", Level::Warning);
                    }
                    SpeechErrorKind::NotAllowed => {
                        self.permission_denied = true;
                        self.listening = false;
                        self.cancel_rearm();
                        warn!("microphone permission denied; automatic re-arm disabled");
                        self.notifier
                            .notify("Microphone access denied", Level::Error);
                    }
                    SpeechErrorKind::Other(reason) => {
                        warn!(%reason, "speech recognition error");
                        self.notifier
                            .notify(&format!("Voice error: {reason}"), Level::Error);
                    }
                }
                self.schedule_rearm(self.config.rearm_after_error_ms);
                None
            }
            SpeechEvent::Ended => {
                self.listening = false;
                self.indicator(VoiceIndicator::Idle);
                // An error backoff already pending takes precedence.
                if !self.rearm.is_armed() {
                    self.schedule_rearm(self.config.rearm_after_end_ms);
                }
                None
            }
        }
    }

    // ── Dispatch ────────────────────────────────────────────────────────────

    /// Interpret one recognised utterance.
    pub fn handle_utterance(
        &mut self,
        utterance: &str,
        confidence: f32,
        controller: &mut AutopilotController,
    ) -> Dispatch {
        let text = normalize(utterance);
        info!(utterance = %text, confidence, "voice command received");

        if confidence.is_nan() || confidence < self.config.confidence_threshold {
            self.notifier
                .notify("Command not clear, please try again", Level::Warning);
            return Dispatch::LowConfidence;
        }

        if let Some(command) = match_command(&text) {
            return self.run(command, &text, controller);
        }

        if text.split_whitespace().any(|w| w == "open") {
            return self.open_by_name(&text, controller);
        }

        self.notifier.notify(
            "Command not recognized. Say \"help\" for available commands.",
            Level::Warning,
        );
        Dispatch::Unrecognized
    }

    fn run(
        &mut self,
        command: &'static VoiceCommand,
        text: &str,
        controller: &mut AutopilotController,
    ) -> Dispatch {
        self.last_command = Some(command.trigger);
        debug!(trigger = command.trigger, category = ?command.category, "voice command matched");
        self.notifier
            .notify(&format!("✓ {}", command.trigger), Level::Success);

        match command.action {
            VoiceAction::ScrollUp => self.viewport.scroll_by(-self.config.scroll_step_px),
            VoiceAction::ScrollDown => self.viewport.scroll_by(self.config.scroll_step_px),
            VoiceAction::ScrollToTop => self.viewport.scroll_to_top(),
            VoiceAction::ScrollToBottom => self.viewport.scroll_to_bottom(),
            VoiceAction::GoToSection(section) => {
                if !self.viewport.scroll_to_section(section) {
                    self.notifier
                        .notify(&format!("Section \"{section}\" not found"), Level::Warning);
                }
            }
            VoiceAction::GoBack => self.page.go_back(),
            VoiceAction::StartAutopilot => {
                controller.start();
            }
            VoiceAction::StopAutopilot => controller.stop(),
            VoiceAction::PauseAutopilot => {
                controller.pause();
            }
            VoiceAction::ResumeAutopilot => {
                controller.resume();
            }
            VoiceAction::NextApp => controller.next(),
            VoiceAction::PreviousApp => controller.previous(),
            VoiceAction::StartTour => {
                controller.start_page_tour();
            }
            VoiceAction::StopTour => {
                if !controller.stop_page_tour() {
                    self.notifier.notify("No page tour is running", Level::Info);
                }
            }
            VoiceAction::SpeedUp => self.nudge_speed(controller, true),
            VoiceAction::SlowDown => self.nudge_speed(controller, false),
            VoiceAction::MinimizeAutopilot => controller.set_minimized(true),
            VoiceAction::MaximizeAutopilot => controller.set_minimized(false),
            VoiceAction::OpenApp => return self.open_by_name(text, controller),
            VoiceAction::CloseApp => self.close_app(controller),
            VoiceAction::Search => self.search(text),
            VoiceAction::FocusSearch => {
                if self.page.focus_search() {
                    self.notifier.notify("Search activated", Level::Success);
                } else {
                    self.notifier
                        .notify("Search is not available on this page", Level::Warning);
                }
            }
            VoiceAction::Help => self.notifier.status(StatusUpdate::Help { text: help_text() }),
            VoiceAction::StopListening => self.stop_listening(),
            VoiceAction::StartListening => {
                self.start_listening();
            }
            VoiceAction::EnableContinuous => self.set_continuous(true),
            VoiceAction::DisableContinuous => self.set_continuous(false),
        }
        Dispatch::Command(command.action)
    }

    fn nudge_speed(&self, controller: &mut AutopilotController, faster: bool) {
        let current = controller.speed_ms();
        let step = self.config.speed_step_ms;
        let target = if faster {
            current
                .saturating_sub(step)
                .max(self.config.min_speed_ms.min(current))
        } else {
            current
                .saturating_add(step)
                .min(self.config.max_speed_ms.max(current))
        };
        let speed = controller.update_speed(target);
        self.notifier
            .notify(&format!("Speed: {}", format_seconds(speed)), Level::Success);
    }

    fn close_app(&self, controller: &mut AutopilotController) {
        if controller.close_preview() {
            self.notifier.notify("App closed", Level::Success);
        } else {
            self.notifier
                .notify("No app is currently open", Level::Warning);
        }
    }

    fn search(&self, text: &str) {
        let term = text.replace("search for", "").replace("search", "");
        let term = term.split_whitespace().collect::<Vec<_>>().join(" ");
        if term.is_empty() {
            self.notifier
                .notify("Please specify a search term", Level::Warning);
            return;
        }
        if self.page.submit_search(&term) {
            self.notifier
                .notify(&format!("Searching for \"{term}\""), Level::Success);
        } else {
            self.notifier
                .notify("Search is not available on this page", Level::Warning);
        }
    }

    fn open_by_name(&self, text: &str, controller: &mut AutopilotController) -> Dispatch {
        let name = text
            .split_whitespace()
            .filter(|w| !FILLER_WORDS.contains(w))
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.notifier
                .notify("Please specify an app name", Level::Warning);
            return Dispatch::Unresolved(name);
        }

        let Some((id, title)) = controller
            .catalog()
            .find_by_title(&name)
            .map(|e| (e.id, e.title.clone()))
        else {
            debug!(%name, "voice open found no matching app");
            self.notifier
                .notify(&format!("App \"{name}\" not found"), Level::Warning);
            return Dispatch::Unresolved(name);
        };

        self.notifier
            .notify(&format!("Opening {title}"), Level::Success);
        controller.open_entry(id, self.config.open_target);
        Dispatch::Opened(id)
    }
}

fn normalize(utterance: &str) -> String {
    utterance
        .trim()
        .trim_end_matches(['.', '!', '?', ','])
        .trim()
        .to_lowercase()
}

fn format_seconds(ms: u64) -> String {
    if ms % 1_000 == 0 {
        format!("{}s", ms / 1_000)
    } else {
        format!("{:.1}s", ms as f64 / 1_000.0)
    }
}
