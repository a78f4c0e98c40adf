//! The root object: one controller, one interpreter, one input funnel.
//!
//! Everything that can change state enters through [`Showcase::handle_input`]
//! or [`Showcase::handle_timer`], always on the same task.

use crate::autopilot::{AutopilotController, ControllerPorts, TourPhase};
use crate::catalog::Catalog;
use crate::config::ShowcaseConfig;
use crate::ports::{PagePort, PreviewRenderer, SpeechEvent, SpeechSource, ViewportPort};
use crate::shortcuts::{KeyChord, UiCommand, shortcut_command};
use crate::status::Notifier;
use crate::store::PreferenceStore;
use crate::timer::{TimerEvent, TimerKind, TimerPort};
use crate::voice::{CommandInterpreter, Dispatch, VoicePorts};
use std::sync::Arc;
use tracing::debug;

/// Every host port in one bundle.
#[derive(Clone)]
pub struct ShowcasePorts {
    /// Scheduling.
    pub timers: Arc<dyn TimerPort>,
    /// Page scrolling.
    pub viewport: Arc<dyn ViewportPort>,
    /// Search box and history.
    pub page: Arc<dyn PagePort>,
    /// Speech recognition.
    pub speech: Arc<dyn SpeechSource>,
    /// Preview rendering.
    pub renderer: Arc<dyn PreviewRenderer>,
    /// Toasts and status.
    pub notifier: Arc<dyn Notifier>,
    /// Durable preferences.
    pub store: Arc<dyn PreferenceStore>,
}

/// Inputs from the host, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowcaseInput {
    /// A recognised utterance delivered directly.
    Utterance {
        /// Raw text.
        text: String,
        /// Recogniser confidence.
        confidence: f32,
    },
    /// A speech source callback.
    Speech(SpeechEvent),
    /// A manual control.
    Ui(UiCommand),
    /// A key press.
    Key(KeyChord),
    /// The embedded preview finished loading.
    PreviewLoaded {
        /// Tag issued with the load.
        load_id: u64,
    },
    /// The embedded preview failed to load.
    PreviewFailed {
        /// Tag issued with the load.
        load_id: u64,
        /// Host-reported reason.
        reason: String,
    },
}

/// Owns the autopilot controller and the voice interpreter.
pub struct Showcase {
    controller: AutopilotController,
    interpreter: CommandInterpreter,
}

impl Showcase {
    /// Wire the controller and interpreter to the host ports.
    pub fn new(config: ShowcaseConfig, catalog: Catalog, ports: ShowcasePorts) -> Self {
        let interpreter = CommandInterpreter::new(
            config.voice.clone(),
            VoicePorts {
                speech: ports.speech,
                viewport: Arc::clone(&ports.viewport),
                page: ports.page,
                notifier: Arc::clone(&ports.notifier),
                timers: Arc::clone(&ports.timers),
            },
        );
        let controller = AutopilotController::new(
            config,
            catalog,
            ControllerPorts {
                timers: ports.timers,
                viewport: ports.viewport,
                renderer: ports.renderer,
                notifier: ports.notifier,
                store: ports.store,
            },
        );
        Self {
            controller,
            interpreter,
        }
    }

    /// The autopilot controller.
    pub fn controller(&self) -> &AutopilotController {
        &self.controller
    }

    /// Mutable access to the autopilot controller.
    pub fn controller_mut(&mut self) -> &mut AutopilotController {
        &mut self.controller
    }

    /// The voice interpreter.
    pub fn interpreter(&self) -> &CommandInterpreter {
        &self.interpreter
    }

    /// Mutable access to the voice interpreter.
    pub fn interpreter_mut(&mut self) -> &mut CommandInterpreter {
        &mut self.interpreter
    }

    /// Route a fired timer to its owner.
    pub fn handle_timer(&mut self, event: TimerEvent) {
        let handled = match event.kind {
            TimerKind::VoiceRearm => self.interpreter.handle_timer(event),
            _ => self.controller.handle_timer(event),
        };
        if !handled {
            debug!(?event, "timer event had no owner");
        }
    }

    /// Interpret one utterance.
    pub fn handle_utterance(&mut self, text: &str, confidence: f32) -> Dispatch {
        self.interpreter
            .handle_utterance(text, confidence, &mut self.controller)
    }

    /// Apply one host input.
    pub fn handle_input(&mut self, input: ShowcaseInput) {
        match input {
            ShowcaseInput::Utterance { text, confidence } => {
                self.handle_utterance(&text, confidence);
            }
            ShowcaseInput::Speech(event) => {
                self.interpreter.handle_speech(event, &mut self.controller);
            }
            ShowcaseInput::Ui(command) => self.execute(command),
            ShowcaseInput::Key(chord) => {
                if let Some(command) = shortcut_command(&chord, self.controller.is_active()) {
                    self.execute(command);
                }
            }
            ShowcaseInput::PreviewLoaded { load_id } => self.controller.on_preview_loaded(load_id),
            ShowcaseInput::PreviewFailed { load_id, reason } => {
                self.controller.on_preview_failed(load_id, &reason);
            }
        }
    }

    /// Run a manual control.
    pub fn execute(&mut self, command: UiCommand) {
        let c = &mut self.controller;
        match command {
            UiCommand::Start => {
                c.start();
            }
            UiCommand::Stop => c.stop(),
            UiCommand::ToggleAutopilot => {
                if c.is_active() {
                    c.stop();
                } else {
                    c.start();
                }
            }
            UiCommand::Pause => {
                c.pause();
            }
            UiCommand::Resume => {
                c.resume();
            }
            UiCommand::TogglePause => {
                c.toggle_pause();
            }
            UiCommand::Next => c.next(),
            UiCommand::Previous => c.previous(),
            UiCommand::SetSpeed { ms } => {
                c.update_speed(ms);
            }
            UiCommand::SetLoop { enabled } => c.set_loop(enabled),
            UiCommand::SetAutoOpen { enabled } => c.set_auto_open(enabled),
            UiCommand::SetScrollMode { mode } => c.set_scroll_mode(mode),
            UiCommand::SetPreviewMode { mode } => c.change_preview_mode(mode),
            UiCommand::ApplyFilter { filter } => {
                c.apply_filter(filter);
            }
            UiCommand::SetShuffle { enabled } => c.set_shuffle(enabled),
            UiCommand::ToggleShuffle => c.toggle_shuffle(),
            UiCommand::ToggleFavorite => {
                c.toggle_favorite(None);
            }
            UiCommand::ResetProgress => c.reset_progress(),
            UiCommand::ToggleMinimize => {
                c.toggle_minimize();
            }
            UiCommand::SavePanelPosition { left, top } => c.save_panel_position(left, top),
            UiCommand::StartTour => {
                c.start_page_tour();
            }
            UiCommand::StopTour => {
                c.stop_page_tour();
            }
            UiCommand::ToggleTour => {
                if c.tour_phase() == TourPhase::Idle {
                    c.start_page_tour();
                } else {
                    c.stop_page_tour();
                }
            }
            UiCommand::SetTourSpeed { speed } => {
                c.set_tour_speed(speed);
            }
            UiCommand::RefreshPreview => {
                c.refresh_preview();
            }
            UiCommand::ClosePreview => {
                c.close_preview();
            }
            UiCommand::OpenExternally => {
                c.open_current_externally();
            }
            UiCommand::OpenEntry { id, target } => {
                c.open_entry(id, target);
            }
            UiCommand::StartListening => {
                self.interpreter.start_listening();
            }
            UiCommand::StopListening => self.interpreter.stop_listening(),
            UiCommand::SetContinuous { enabled } => self.interpreter.set_continuous(enabled),
        }
    }
}
