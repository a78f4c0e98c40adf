//! Voice command recognition and dispatch.
//!
//! The speech source delivers `(utterance, confidence)` pairs. The
//! interpreter normalises them, checks confidence, looks them up in
//! [`COMMAND_TABLE`] and falls back to opening an app by name.

pub mod commands;
pub mod interpreter;

pub use commands::{COMMAND_TABLE, CommandCategory, VoiceAction, VoiceCommand, help_text, match_command};
pub use interpreter::{CommandInterpreter, Dispatch, VoicePorts};
