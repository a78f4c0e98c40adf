//! Integration test binary. All integration tests live in one binary to keep
//! link time down.

// Allow unwrap/expect in test code
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

mod autopilot_flow;
mod continuous_listening;
mod page_tour;
mod persistence;
mod voice_dispatch;
