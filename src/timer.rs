//! Timer port and generation-stamped timer events.
//!
//! Every timer the controller, preview surface or voice interpreter arms is
//! delivered back to the single event-processing task as a [`TimerEvent`].
//! Each event carries the generation of the session (or tour, preview load,
//! re-arm request) that scheduled it; the receiver compares it against the
//! live generation and drops stale events. This is what keeps a tick that
//! was already in flight when `stop()` ran from mutating a new session.
//!
//! Two clocks implement [`TimerPort`]:
//! - [`TokioTimers`]: one spawned tokio task per timer, cancelled through a
//!   [`CancellationToken`], events funnelled through an unbounded channel.
//! - [`ManualTimers`]: a virtual clock for deterministic tests and replay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Handle for a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a timer is for. Routing to the owning component happens on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Autopilot auto-advance tick.
    Advance,
    /// Autopilot progress indicator tick.
    Progress,
    /// Debounced auto-open of the embedded preview for one entry.
    AutoOpen {
        /// Entry the debounce was armed for.
        entry_id: usize,
    },
    /// Page tour scroll frame.
    TourScroll,
    /// Settling delay between the upward sweep and the showcase phase.
    TourSettle,
    /// Delay between tour completion and tour teardown.
    TourFinish,
    /// Hide the embedded preview loading indicator.
    LoaderTimeout,
    /// Re-arm the speech source in continuous mode.
    VoiceRearm,
}

/// A fired timer, stamped with the generation that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    /// Purpose of the timer.
    pub kind: TimerKind,
    /// Generation of the owner at arm time.
    pub generation: u64,
}

impl TimerEvent {
    /// Build an event for `kind` stamped with `generation`.
    pub fn new(kind: TimerKind, generation: u64) -> Self {
        Self { kind, generation }
    }
}

/// One-shot or repeating schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fire once after the delay.
    Once(Duration),
    /// Fire every period until cancelled. The first tick is one period out.
    Every(Duration),
}

impl Cadence {
    /// One-shot cadence in milliseconds.
    pub fn once_ms(ms: u64) -> Self {
        Self::Once(Duration::from_millis(ms))
    }

    /// Repeating cadence in milliseconds.
    pub fn every_ms(ms: u64) -> Self {
        Self::Every(Duration::from_millis(ms))
    }
}

/// Scheduling port used by every component that needs delayed work.
pub trait TimerPort: Send + Sync {
    /// Arm a timer that will deliver `event` according to `cadence`.
    fn schedule(&self, cadence: Cadence, event: TimerEvent) -> TimerId;

    /// Cancel a timer. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}

/// Monotonic generation counter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

impl Generation {
    /// Invalidate everything stamped so far and return the new generation.
    pub fn bump(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    /// Current generation.
    pub fn current(self) -> u64 {
        self.0
    }

    /// Whether `stamp` was issued by the current generation.
    pub fn is_current(self, stamp: u64) -> bool {
        self.0 == stamp
    }
}

/// An optional armed timer that cancels its predecessor when re-armed.
#[derive(Debug, Default)]
pub struct TimerSlot(Option<TimerId>);

impl TimerSlot {
    /// Cancel whatever is armed and arm a new timer.
    pub fn arm(&mut self, timers: &dyn TimerPort, cadence: Cadence, event: TimerEvent) {
        self.clear(timers);
        self.0 = Some(timers.schedule(cadence, event));
    }

    /// Cancel the armed timer, if any.
    pub fn clear(&mut self, timers: &dyn TimerPort) {
        if let Some(id) = self.0.take() {
            timers.cancel(id);
        }
    }

    /// Forget a one-shot timer that has already fired.
    pub fn fired(&mut self) {
        self.0 = None;
    }

    /// Whether a timer is armed.
    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Tokio clock ──────────────────────────────────────────────────────────────

/// Timer port backed by tokio tasks.
///
/// Must be used from within a tokio runtime. Fired events are delivered on
/// the receiver returned by [`TokioTimers::new`].
pub struct TokioTimers {
    tx: mpsc::UnboundedSender<TimerEvent>,
    next_id: AtomicU64,
    live: Arc<Mutex<HashMap<u64, CancellationToken>>>,
}

impl TokioTimers {
    /// Create the clock and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = Self {
            tx,
            next_id: AtomicU64::new(1),
            live: Arc::new(Mutex::new(HashMap::new())),
        };
        (timers, rx)
    }

    /// Number of timers not yet fired or cancelled.
    pub fn live_count(&self) -> usize {
        lock(&self.live).len()
    }
}

impl TimerPort for TokioTimers {
    fn schedule(&self, cadence: Cadence, event: TimerEvent) -> TimerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        lock(&self.live).insert(id, token.clone());

        let tx = self.tx.clone();
        let live = Arc::clone(&self.live);
        tokio::spawn(async move {
            match cadence {
                Cadence::Once(delay) => {
                    tokio::select! {
                        () = token.cancelled() => {}
                        () = tokio::time::sleep(delay) => {
                            let _ = tx.send(event);
                        }
                    }
                    lock(&live).remove(&id);
                }
                Cadence::Every(period) => {
                    let period = period.max(Duration::from_millis(1));
                    let mut interval =
                        tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    loop {
                        tokio::select! {
                            () = token.cancelled() => break,
                            _ = interval.tick() => {
                                if tx.send(event).is_err() {
                                    lock(&live).remove(&id);
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        });
        trace!(timer_id = id, ?event, "timer armed");
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        if let Some(token) = lock(&self.live).remove(&id.0) {
            token.cancel();
            trace!(timer_id = id.0, "timer cancelled");
        }
    }
}

// ── Manual clock ─────────────────────────────────────────────────────────────

#[derive(Debug)]
struct PendingTimer {
    id: u64,
    due_ms: u64,
    period_ms: Option<u64>,
    seq: u64,
    event: TimerEvent,
}

#[derive(Debug, Default)]
struct ManualState {
    now_ms: u64,
    next_id: u64,
    next_seq: u64,
    pending: Vec<PendingTimer>,
}

/// Virtual clock for deterministic tests.
///
/// [`ManualTimers::advance`] fires due timers one at a time in due order and
/// releases its lock before invoking the handler, so timers cancelled or
/// armed by one callback are honoured before the next event is chosen.
#[derive(Debug, Default)]
pub struct ManualTimers {
    state: Mutex<ManualState>,
}

impl ManualTimers {
    /// Create a clock at t = 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now_ms(&self) -> u64 {
        lock(&self.state).now_ms
    }

    /// Number of armed timers.
    pub fn pending_count(&self) -> usize {
        lock(&self.state).pending.len()
    }

    /// Kinds of all armed timers, in arm order.
    pub fn pending_kinds(&self) -> Vec<TimerKind> {
        let state = lock(&self.state);
        let mut pending: Vec<&PendingTimer> = state.pending.iter().collect();
        pending.sort_by_key(|p| p.id);
        pending.iter().map(|p| p.event.kind).collect()
    }

    /// Whether a timer of `kind` is armed.
    pub fn has_pending(&self, kind: TimerKind) -> bool {
        lock(&self.state).pending.iter().any(|p| p.event.kind == kind)
    }

    /// Advance the clock by `ms`, handing each due event to `handler`.
    ///
    /// Returns the number of events delivered.
    pub fn advance(&self, ms: u64, mut handler: impl FnMut(TimerEvent)) -> usize {
        let deadline = self.now_ms().saturating_add(ms);
        let mut delivered = 0;
        while let Some(event) = self.pop_due(deadline) {
            handler(event);
            delivered += 1;
        }
        let mut state = lock(&self.state);
        state.now_ms = state.now_ms.max(deadline);
        delivered
    }

    fn pop_due(&self, deadline_ms: u64) -> Option<TimerEvent> {
        let mut state = lock(&self.state);
        let index = state
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= deadline_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.seq))
            .map(|(i, _)| i)?;

        let due_ms = state.pending[index].due_ms;
        state.now_ms = state.now_ms.max(due_ms);
        let event = state.pending[index].event;
        match state.pending[index].period_ms {
            Some(period) => {
                let seq = state.next_seq;
                state.next_seq += 1;
                let timer = &mut state.pending[index];
                timer.due_ms = due_ms + period.max(1);
                timer.seq = seq;
            }
            None => {
                state.pending.swap_remove(index);
            }
        }
        Some(event)
    }
}

impl TimerPort for ManualTimers {
    fn schedule(&self, cadence: Cadence, event: TimerEvent) -> TimerId {
        let mut state = lock(&self.state);
        state.next_id += 1;
        state.next_seq += 1;
        let (delay, period_ms) = match cadence {
            Cadence::Once(delay) => (millis(delay), None),
            Cadence::Every(period) => (millis(period).max(1), Some(millis(period).max(1))),
        };
        let timer = PendingTimer {
            id: state.next_id,
            due_ms: state.now_ms + delay,
            period_ms,
            seq: state.next_seq,
            event,
        };
        state.pending.push(timer);
        TimerId(state.next_id)
    }

    fn cancel(&self, id: TimerId) {
        lock(&self.state).pending.retain(|p| p.id != id.0);
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
