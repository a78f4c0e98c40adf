//! Autopilot session state and its advance/progress timers.

use crate::config::AutopilotConfig;
use crate::ports::ScrollMode;
use crate::preview::PreviewMode;
use crate::store::AutopilotSettings;
use crate::timer::{Cadence, Generation, TimerEvent, TimerKind, TimerPort, TimerSlot};

/// The single autopilot session.
///
/// `generation` identifies the session itself and is bumped on start and
/// stop. `cycle` identifies the current advance window and is bumped every
/// time the advance/progress timers are re-armed or cleared, so a tick from
/// a cancelled window can never advance the new one.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) active: bool,
    pub(crate) paused: bool,
    pub(crate) speed_ms: u64,
    pub(crate) loop_enabled: bool,
    pub(crate) auto_open: bool,
    pub(crate) scroll_mode: ScrollMode,
    pub(crate) preview_mode: PreviewMode,
    /// The page tour started this session; it never loops.
    pub(crate) tour_driven: bool,
    pub(crate) progress_ms: u64,
    generation: Generation,
    cycle: Generation,
    advance: TimerSlot,
    progress: TimerSlot,
}

impl Session {
    pub(crate) fn new(config: &AutopilotConfig) -> Self {
        Self {
            active: false,
            paused: false,
            speed_ms: config.clamp_speed(config.default_speed_ms),
            loop_enabled: true,
            auto_open: false,
            scroll_mode: ScrollMode::default(),
            preview_mode: PreviewMode::default(),
            tour_driven: false,
            progress_ms: 0,
            generation: Generation::default(),
            cycle: Generation::default(),
            advance: TimerSlot::default(),
            progress: TimerSlot::default(),
        }
    }

    /// Whether auto-advance is running.
    pub(crate) fn is_advancing(&self) -> bool {
        self.active && !self.paused
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.current()
    }

    pub(crate) fn is_current_cycle(&self, stamp: u64) -> bool {
        self.cycle.is_current(stamp)
    }

    /// Mark the session active under a fresh generation.
    pub(crate) fn activate(&mut self, tour_driven: bool) -> u64 {
        self.active = true;
        self.paused = false;
        self.tour_driven = tour_driven;
        self.progress_ms = 0;
        self.generation.bump()
    }

    /// Mark the session inactive. Timers must be cleared separately.
    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.paused = false;
        self.tour_driven = false;
        self.progress_ms = 0;
        self.generation.bump();
    }

    /// Restart the advance window: both timers re-armed from zero.
    pub(crate) fn arm_cycle(&mut self, timers: &dyn TimerPort, config: &AutopilotConfig) {
        let cycle = self.cycle.bump();
        self.progress_ms = 0;
        self.advance.arm(
            timers,
            Cadence::every_ms(self.speed_ms),
            TimerEvent::new(TimerKind::Advance, cycle),
        );
        self.progress.arm(
            timers,
            Cadence::every_ms(config.progress_tick_ms),
            TimerEvent::new(TimerKind::Progress, cycle),
        );
    }

    /// Cancel both advance timers.
    pub(crate) fn clear_cycle(&mut self, timers: &dyn TimerPort) {
        self.cycle.bump();
        self.advance.clear(timers);
        self.progress.clear(timers);
    }

    /// Whether the advance timers are armed.
    #[cfg(test)]
    pub(crate) fn cycle_armed(&self) -> bool {
        self.advance.is_armed() || self.progress.is_armed()
    }

    /// Count one progress tick and return the elapsed percentage.
    pub(crate) fn tick_progress(&mut self, tick_ms: u64) -> f64 {
        self.progress_ms = self.progress_ms.saturating_add(tick_ms);
        self.progress_percent()
    }

    pub(crate) fn progress_percent(&self) -> f64 {
        if self.speed_ms == 0 {
            return 100.0;
        }
        let percent = self.progress_ms as f64 / self.speed_ms as f64 * 100.0;
        percent.min(100.0)
    }

    /// Apply persisted preferences (speed is clamped by the caller).
    pub(crate) fn apply_settings(&mut self, settings: &AutopilotSettings, speed_ms: u64) {
        self.speed_ms = speed_ms;
        self.preview_mode = settings.preview_mode;
        self.loop_enabled = settings.loop_enabled;
        self.auto_open = settings.auto_open;
        self.scroll_mode = settings.scroll_mode;
    }
}
