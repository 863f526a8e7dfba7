//! Scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// One scheduling unit in milliseconds: how long each pause and throttle
    /// sleep lasts.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Initial throttle interval: ticks to skip between iterations. `None`
    /// (or a later `set_delay 0`) runs user work every tick.
    #[serde(default)]
    pub initial_delay: Option<u64>,

    /// Stop cleanly after this many ticks. `None` runs until a quit event or
    /// a terminal user-work result; bounded runs are for tests and drills.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            initial_delay: None,
            max_ticks: None,
        }
    }
}

impl SchedulerConfig {
    /// One scheduling unit as a Duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be > 0".to_string());
        }
        Ok(())
    }
}
