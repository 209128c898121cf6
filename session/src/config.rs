use std::time::Duration;

use bunny_hop_world::WorldConfig;
use serde::Deserialize;

/// Complete configuration of a game session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Grid, queue and collision settings.
    pub world: WorldConfig,
    /// Playback cadence and input delays.
    pub timing: TimingConfig,
}

/// Playback cadence and input delays, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Interval between instructions during playback.
    pub cadence_ms: u64,
    /// Delay between pressing the primary action and the program starting.
    pub run_debounce_ms: u64,
    /// Delay between a verdict and the primary button changing.
    pub feedback_delay_ms: u64,
}

impl TimingConfig {
    /// Interval between instructions during playback.
    #[must_use]
    pub const fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    /// Delay between pressing the primary action and the program starting.
    #[must_use]
    pub const fn run_debounce(&self) -> Duration {
        Duration::from_millis(self.run_debounce_ms)
    }

    /// Delay between a verdict and the primary button changing.
    #[must_use]
    pub const fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cadence_ms: 1000,
            run_debounce_ms: 300,
            feedback_delay_ms: 500,
        }
    }
}
