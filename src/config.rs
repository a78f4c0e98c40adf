//! Configuration types for the showcase controller.

use crate::error::{Result, ShowcaseError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    /// Auto-advance timing.
    pub autopilot: AutopilotConfig,
    /// Page tour scrolling.
    pub tour: TourConfig,
    /// Embedded preview behaviour.
    pub preview: PreviewConfig,
    /// Voice command interpretation.
    pub voice: VoiceConfig,
}

/// Auto-advance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Interval used when no stored preference exists.
    pub default_speed_ms: u64,
    /// Lower clamp for the advance interval.
    pub min_speed_ms: u64,
    /// Upper clamp for the advance interval.
    pub max_speed_ms: u64,
    /// Period of the progress indicator tick.
    pub progress_tick_ms: u64,
    /// Debounce before auto-opening the embedded preview for a new entry.
    pub auto_open_delay_ms: u64,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            default_speed_ms: 5_000,
            min_speed_ms: 1_000,
            max_speed_ms: 20_000,
            progress_tick_ms: 100,
            auto_open_delay_ms: 500,
        }
    }
}

impl AutopilotConfig {
    /// Clamp an advance interval to the configured bounds. Inverted bounds
    /// resolve to the minimum.
    pub fn clamp_speed(&self, ms: u64) -> u64 {
        bounded(ms, self.min_speed_ms, self.max_speed_ms)
    }
}

/// `value` within `min..=max`, without panicking when `min > max`.
fn bounded<T: Ord + Copy>(value: T, min: T, max: T) -> T {
    value.min(max).max(min)
}

/// Page tour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Initial tour speed (slider units).
    pub default_speed: u32,
    /// Slowest tour speed.
    pub min_speed: u32,
    /// Fastest tour speed.
    pub max_speed: u32,
    /// Scroll tick period, roughly one animation frame.
    pub frame_ms: u64,
    /// Pause between reaching the showcase section and starting autopilot.
    pub settle_delay_ms: u64,
    /// Delay between reporting tour completion and tearing the tour down.
    pub finish_delay_ms: u64,
    /// Distance from the document end that counts as "bottom".
    pub bottom_tolerance_px: f64,
    /// Section the upward sweep stops at. Falls back to the top when absent.
    pub showcase_section: String,
    /// Offset above the showcase section to stop at.
    pub showcase_offset_px: f64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            default_speed: 50,
            min_speed: 10,
            max_speed: 100,
            frame_ms: 16,
            settle_delay_ms: 500,
            finish_delay_ms: 2_000,
            bottom_tolerance_px: 2.0,
            showcase_section: "projects".to_owned(),
            showcase_offset_px: 120.0,
        }
    }
}

impl TourConfig {
    /// Clamp a tour speed to the configured bounds. Inverted bounds resolve
    /// to the minimum.
    pub fn clamp_speed(&self, speed: u32) -> u32 {
        bounded(speed, self.min_speed, self.max_speed)
    }

    /// Pixels scrolled per frame for a given tour speed.
    ///
    /// Speed 10 scrolls 1.5px per frame, speed 100 scrolls 6px.
    pub fn scroll_step(&self, speed: u32) -> f64 {
        1.0 + f64::from(speed) / 20.0
    }
}

/// Preview surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// The loading indicator is hidden after this long regardless of load state.
    pub loader_timeout_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            loader_timeout_ms: 2_000,
        }
    }
}

/// Where a voice "open <app>" request sends the resolved entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenTarget {
    /// Load into the embedded preview.
    #[default]
    Embedded,
    /// Open in a new top-level browsing context.
    External,
}

/// Voice command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Utterances below this confidence are discarded.
    pub confidence_threshold: f32,
    /// Recognition language tag.
    pub language: String,
    /// Re-arm delay after the speech source ends in continuous mode.
    pub rearm_after_end_ms: u64,
    /// Re-arm delay after a transient speech error in continuous mode.
    pub rearm_after_error_ms: u64,
    /// Advance interval change for "speed up" / "slow down".
    pub speed_step_ms: u64,
    /// Fastest interval reachable by voice.
    pub min_speed_ms: u64,
    /// Slowest interval reachable by voice.
    pub max_speed_ms: u64,
    /// Distance for "scroll up" / "scroll down".
    pub scroll_step_px: f64,
    /// Destination for resolved "open <app>" requests.
    pub open_target: OpenTarget,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            language: "en-US".to_owned(),
            rearm_after_end_ms: 500,
            rearm_after_error_ms: 1_000,
            speed_step_ms: 1_000,
            min_speed_ms: 1_000,
            max_speed_ms: 10_000,
            scroll_step_px: 300.0,
            open_target: OpenTarget::Embedded,
        }
    }
}

impl ShowcaseConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ShowcaseError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ShowcaseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/cosmic-autopilot/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("cosmic-autopilot")
                .join("config.toml")
        } else if let Some(home) = dirs::home_dir() {
            home.join(".config")
                .join("cosmic-autopilot")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/cosmic-autopilot/config.toml")
        }
    }

    /// Check bounds and thresholds for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ShowcaseError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let ap = &self.autopilot;
        if ap.min_speed_ms == 0 || ap.min_speed_ms > ap.max_speed_ms {
            return Err(ShowcaseError::Config(format!(
                "autopilot speed bounds are invalid: {}..{}",
                ap.min_speed_ms, ap.max_speed_ms
            )));
        }
        if ap.progress_tick_ms == 0 {
            return Err(ShowcaseError::Config(
                "autopilot.progress_tick_ms must be positive".to_owned(),
            ));
        }
        let tour = &self.tour;
        if tour.min_speed == 0 || tour.min_speed > tour.max_speed {
            return Err(ShowcaseError::Config(format!(
                "tour speed bounds are invalid: {}..{}",
                tour.min_speed, tour.max_speed
            )));
        }
        if tour.frame_ms == 0 {
            return Err(ShowcaseError::Config(
                "tour.frame_ms must be positive".to_owned(),
            ));
        }
        let voice = &self.voice;
        if !(0.0..=1.0).contains(&voice.confidence_threshold) {
            return Err(ShowcaseError::Config(format!(
                "voice.confidence_threshold must be within 0..=1, got {}",
                voice.confidence_threshold
            )));
        }
        if voice.min_speed_ms > voice.max_speed_ms {
            return Err(ShowcaseError::Config(format!(
                "voice speed bounds are invalid: {}..{}",
                voice.min_speed_ms, voice.max_speed_ms
            )));
        }
        Ok(())
    }
}
