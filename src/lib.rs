//! Cosmic autopilot: hands-free browsing of an app catalog.
//!
//! The crate drives a web app store page without touching its rendering
//! tree. Three features share one event loop:
//!
//! - **Autopilot**: timed auto-advance through the filtered, optionally
//!   shuffled catalog, with popup or embedded previews.
//! - **Page tour**: a continuous scroll to the bottom of the page and back
//!   up to the catalog, followed by a non-looping autopilot pass.
//! - **Voice commands**: recognised utterances mapped through an ordered
//!   command table, with a free-text "open <app>" fallback.
//!
//! # Architecture
//!
//! - [`showcase::Showcase`] owns the [`autopilot::AutopilotController`] and
//!   the [`voice::CommandInterpreter`] and is the only thing that mutates
//!   them.
//! - [`runtime::ShowcaseRuntime`] serialises host inputs and fired timers
//!   onto one task.
//! - Every timer is stamped with the generation that armed it
//!   ([`timer::TimerEvent`]), so callbacks from a stopped session or tour
//!   are dropped on delivery.
//! - The host page is reached through the traits in [`ports`], the
//!   notification sink in [`status`] and the preference store in [`store`].

pub mod autopilot;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ports;
pub mod preview;
pub mod runtime;
pub mod shortcuts;
pub mod showcase;
pub mod status;
pub mod store;
pub mod timer;
pub mod voice;

pub use autopilot::{AutopilotController, ControllerPorts, ShowcaseStats, TourPhase};
pub use catalog::{Catalog, CatalogEntry, CatalogSource, FilterMode};
pub use config::ShowcaseConfig;
pub use error::{Result, ShowcaseError};
pub use runtime::{RuntimeHandle, ShowcaseRuntime};
pub use showcase::{Showcase, ShowcaseInput, ShowcasePorts};
pub use status::{Level, Notifier, ShowcaseEvent, StatusUpdate};
pub use voice::{CommandInterpreter, Dispatch};
