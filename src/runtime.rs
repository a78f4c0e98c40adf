//! The event loop that serialises host inputs and timer events onto one task.

use crate::autopilot::TourPhase;
use crate::error::{Result, ShowcaseError};
use crate::showcase::{Showcase, ShowcaseInput};
use crate::timer::TimerEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Sender side of a running [`ShowcaseRuntime`].
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: mpsc::Sender<ShowcaseInput>,
    cancel: CancellationToken,
}

impl RuntimeHandle {
    /// Queue an input for the loop.
    ///
    /// # Errors
    ///
    /// Returns [`ShowcaseError::Channel`] once the loop has exited.
    pub async fn send(&self, input: ShowcaseInput) -> Result<()> {
        self.tx
            .send(input)
            .await
            .map_err(|_| ShowcaseError::Channel("showcase runtime has shut down".to_owned()))
    }

    /// Ask the loop to stop after the event it is processing.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Token cancelled when the loop is asked to stop.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Owns the [`Showcase`] and drives it from two queues: fired timers and
/// host inputs. Nothing else mutates it.
pub struct ShowcaseRuntime {
    showcase: Showcase,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    input_rx: mpsc::Receiver<ShowcaseInput>,
    cancel: CancellationToken,
}

impl ShowcaseRuntime {
    /// Build the loop around `showcase`. `timer_rx` is the receiver returned
    /// by [`crate::timer::TokioTimers::new`] for the clock the showcase uses.
    pub fn new(
        showcase: Showcase,
        timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
        input_capacity: usize,
    ) -> (Self, RuntimeHandle) {
        let (tx, input_rx) = mpsc::channel(input_capacity.max(1));
        let cancel = CancellationToken::new();
        let handle = RuntimeHandle {
            tx,
            cancel: cancel.clone(),
        };
        let runtime = Self {
            showcase,
            timer_rx,
            input_rx,
            cancel,
        };
        (runtime, handle)
    }

    /// Run until shutdown is requested or every input sender is dropped.
    /// Any running session or tour is stopped on the way out. Returns the
    /// showcase for inspection.
    pub async fn run(mut self) -> Showcase {
        info!("showcase runtime started");
        let mut timers_open = true;
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                event = self.timer_rx.recv(), if timers_open => {
                    match event {
                        Some(event) => self.showcase.handle_timer(event),
                        None => {
                            debug!("timer channel closed");
                            timers_open = false;
                        }
                    }
                }
                input = self.input_rx.recv() => {
                    match input {
                        Some(input) => self.showcase.handle_input(input),
                        None => break,
                    }
                }
            }
        }

        let controller = self.showcase.controller_mut();
        if controller.is_active() || controller.tour_phase() != TourPhase::Idle {
            controller.stop();
        }
        info!("showcase runtime stopped");
        self.showcase
    }
}
