//! Autopilot: timed traversal of the catalog and the two-phase page tour.
//!
//! All mutation happens through [`AutopilotController`] on the single
//! event-processing task. Every timer the controller arms is stamped with
//! the generation of the session, advance window, display or tour that
//! armed it, and is dropped on delivery if that generation is gone.

pub mod controller;
mod session;
mod tour;

pub use controller::{AutopilotController, ControllerPorts, ShowcaseStats};
pub use tour::{TourDirection, TourPhase, TourStage};
