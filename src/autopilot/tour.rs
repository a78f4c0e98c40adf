//! Page tour: scroll the whole page down, back up to the showcase section,
//! then hand over to the autopilot.

use crate::config::TourConfig;
use crate::ports::ViewportPort;
use crate::timer::{Cadence, Generation, TimerEvent, TimerKind, TimerPort, TimerSlot};
use serde::Serialize;

/// Where the tour is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TourPhase {
    /// No tour.
    #[default]
    Idle,
    /// Sweeping toward the document end.
    ScrollingDown,
    /// Sweeping back toward the showcase section.
    ScrollingUp,
    /// Waiting briefly before the showcase starts.
    Settling,
    /// Autopilot is walking the catalog with live previews.
    Showcasing,
    /// Every entry was shown; teardown is scheduled.
    Finishing,
}

/// Coarse stage, as shown in the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TourStage {
    /// Page scrolling.
    Scroll,
    /// Catalog showcase.
    Apps,
}

/// Scroll direction while in [`TourStage::Scroll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TourDirection {
    /// Toward the document end.
    Down,
    /// Toward the showcase section.
    Up,
}

impl TourPhase {
    /// Stage of this phase. Idle reports the initial stage.
    pub fn stage(self) -> TourStage {
        match self {
            Self::Idle | Self::ScrollingDown | Self::ScrollingUp => TourStage::Scroll,
            Self::Settling | Self::Showcasing | Self::Finishing => TourStage::Apps,
        }
    }

    /// Direction of this phase. Idle reports the initial direction.
    pub fn direction(self) -> TourDirection {
        match self {
            Self::Idle | Self::ScrollingDown => TourDirection::Down,
            _ => TourDirection::Up,
        }
    }

    /// Whether the page is being scrolled by the tour.
    pub fn is_scrolling(self) -> bool {
        matches!(self, Self::ScrollingDown | Self::ScrollingUp)
    }
}

/// Result of one scroll frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Keep scrolling.
    Continue,
    /// The showcase section was reached; the settle delay is armed.
    Arrived,
}

/// Tour state and its timers.
#[derive(Debug)]
pub(crate) struct PageTour {
    phase: TourPhase,
    speed: u32,
    generation: Generation,
    scroll: TimerSlot,
    settle: TimerSlot,
    finish: TimerSlot,
}

impl PageTour {
    pub(crate) fn new(speed: u32) -> Self {
        Self {
            phase: TourPhase::Idle,
            speed,
            generation: Generation::default(),
            scroll: TimerSlot::default(),
            settle: TimerSlot::default(),
            finish: TimerSlot::default(),
        }
    }

    pub(crate) fn phase(&self) -> TourPhase {
        self.phase
    }

    pub(crate) fn is_running(&self) -> bool {
        self.phase != TourPhase::Idle
    }

    pub(crate) fn speed(&self) -> u32 {
        self.speed
    }

    pub(crate) fn is_current(&self, stamp: u64) -> bool {
        self.generation.is_current(stamp)
    }

    /// Enter `ScrollingDown` under a fresh generation and arm the frame timer.
    pub(crate) fn begin(&mut self, timers: &dyn TimerPort, config: &TourConfig) -> u64 {
        let generation = self.generation.bump();
        self.phase = TourPhase::ScrollingDown;
        self.arm_scroll(timers, config);
        generation
    }

    /// Change the speed; a running scroll loop is restarted at the new rate.
    pub(crate) fn set_speed(&mut self, speed: u32, timers: &dyn TimerPort, config: &TourConfig) {
        self.speed = speed;
        if self.phase.is_scrolling() {
            self.arm_scroll(timers, config);
        }
    }

    fn arm_scroll(&mut self, timers: &dyn TimerPort, config: &TourConfig) {
        self.scroll.arm(
            timers,
            Cadence::every_ms(config.frame_ms),
            TimerEvent::new(TimerKind::TourScroll, self.generation.current()),
        );
    }

    /// Advance the sweep by one frame.
    pub(crate) fn scroll_frame(
        &mut self,
        viewport: &dyn ViewportPort,
        timers: &dyn TimerPort,
        config: &TourConfig,
    ) -> Frame {
        let step = config.scroll_step(self.speed);
        let current = viewport.scroll_y();
        match self.phase {
            TourPhase::ScrollingDown => {
                let bottom = viewport.max_scroll_y().max(0.0);
                if current >= bottom - config.bottom_tolerance_px {
                    self.phase = TourPhase::ScrollingUp;
                } else {
                    viewport.scroll_to(current + step);
                }
                Frame::Continue
            }
            TourPhase::ScrollingUp => {
                let target = viewport
                    .section_offset(&config.showcase_section)
                    .map_or(0.0, |y| (y - config.showcase_offset_px).max(0.0));
                let next = current - step;
                if next <= target + config.bottom_tolerance_px {
                    viewport.scroll_to(target);
                    self.scroll.clear(timers);
                    self.phase = TourPhase::Settling;
                    self.settle.arm(
                        timers,
                        Cadence::once_ms(config.settle_delay_ms),
                        TimerEvent::new(TimerKind::TourSettle, self.generation.current()),
                    );
                    Frame::Arrived
                } else {
                    viewport.scroll_to(next);
                    Frame::Continue
                }
            }
            _ => Frame::Continue,
        }
    }

    /// The settle delay elapsed. Returns whether the showcase should start.
    pub(crate) fn settled(&mut self) -> bool {
        self.settle.fired();
        if self.phase != TourPhase::Settling {
            return false;
        }
        self.phase = TourPhase::Showcasing;
        true
    }

    /// Every entry was shown; schedule the teardown.
    pub(crate) fn finish(&mut self, timers: &dyn TimerPort, config: &TourConfig) {
        self.phase = TourPhase::Finishing;
        self.finish.arm(
            timers,
            Cadence::once_ms(config.finish_delay_ms),
            TimerEvent::new(TimerKind::TourFinish, self.generation.current()),
        );
    }

    pub(crate) fn finish_fired(&mut self) {
        self.finish.fired();
    }

    /// Cancel every tour timer and return to `Idle`. Safe to call repeatedly.
    pub(crate) fn teardown(&mut self, timers: &dyn TimerPort) {
        self.generation.bump();
        self.scroll.clear(timers);
        self.settle.clear(timers);
        self.finish.clear(timers);
        self.phase = TourPhase::Idle;
    }
}
