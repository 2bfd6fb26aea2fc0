//! Timing and layout configuration for list playback.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Playback speed multiplier applied to every visual delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSpeed {
    /// 0.5x speed
    Half,
    /// Normal speed (1x)
    #[default]
    Normal,
    /// 2x speed
    Double,
    /// 4x speed
    Quadruple,
    /// No visual delay at all
    Instant,
}

impl PlaybackSpeed {
    /// Get the speed multiplier.
    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
            PlaybackSpeed::Instant => f64::INFINITY,
        }
    }

    /// Scale a base delay to this speed.
    pub fn scale(&self, base: Duration) -> Duration {
        match self {
            PlaybackSpeed::Instant => Duration::ZERO,
            speed => base.div_f64(speed.multiplier()),
        }
    }
}

/// Configuration for a list driver and its animator.
///
/// Durations are serialized as whole milliseconds. Use the accessor methods
/// to read them scaled by [`PlaybackSpeed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisConfig {
    /// Duration of one FLIP transition.
    #[serde(rename = "transition_ms", with = "millis")]
    pub transition: Duration,
    /// Extra time past the transition before a missing completion signal
    /// is given up on.
    #[serde(rename = "guard_margin_ms", with = "millis")]
    pub guard_margin: Duration,
    /// One rendering frame of the headless stage.
    #[serde(rename = "frame_ms", with = "millis")]
    pub frame: Duration,
    /// How long each search visit stays highlighted.
    #[serde(rename = "probe_hold_ms", with = "millis")]
    pub probe_hold: Duration,
    /// How long a search match stays highlighted.
    #[serde(rename = "found_hold_ms", with = "millis")]
    pub found_hold: Duration,
    /// Pause between consecutive sort steps.
    #[serde(rename = "step_pause_ms", with = "millis")]
    pub step_pause: Duration,
    pub speed: PlaybackSpeed,
    pub grid: GridConfig,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(300),
            guard_margin: Duration::from_millis(100),
            frame: Duration::from_millis(16),
            probe_hold: Duration::from_millis(1100),
            found_hold: Duration::from_millis(2000),
            step_pause: Duration::from_millis(400),
            speed: PlaybackSpeed::Normal,
            grid: GridConfig::default(),
        }
    }
}

impl VisConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Set the playback speed.
    #[must_use]
    pub fn with_speed(mut self, speed: PlaybackSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Set the transition duration.
    #[must_use]
    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    /// Set the guard margin.
    #[must_use]
    pub fn with_guard_margin(mut self, margin: Duration) -> Self {
        self.guard_margin = margin;
        self
    }

    /// Set the search highlight holds.
    #[must_use]
    pub fn with_holds(mut self, probe: Duration, found: Duration) -> Self {
        self.probe_hold = probe;
        self.found_hold = found;
        self
    }

    /// Set the pause between sort steps.
    #[must_use]
    pub fn with_step_pause(mut self, pause: Duration) -> Self {
        self.step_pause = pause;
        self
    }

    /// Set the headless grid geometry.
    #[must_use]
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn transition(&self) -> Duration {
        self.speed.scale(self.transition)
    }

    /// Upper bound on one element's transition wait.
    pub fn guard_timeout(&self) -> Duration {
        self.transition() + self.speed.scale(self.guard_margin)
    }

    pub fn probe_hold(&self) -> Duration {
        self.speed.scale(self.probe_hold)
    }

    pub fn found_hold(&self) -> Duration {
        self.speed.scale(self.found_hold)
    }

    pub fn step_pause(&self) -> Duration {
        self.speed.scale(self.step_pause)
    }
}

/// Card grid used by the headless stage to lay records out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            cell_width: 240.0,
            cell_height: 96.0,
            gap: 16.0,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
