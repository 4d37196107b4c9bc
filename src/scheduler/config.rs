//! Scheduler configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Max macrotask delay in milliseconds, rejected at submission above this
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Microtasks drained in one burst before a starvation warning is logged.
    /// The drain semantics are unchanged: an infinite microtask chain still
    /// starves macrotasks forever, this only makes it visible.
    #[serde(default = "default_starvation_warn_threshold")]
    pub starvation_warn_threshold: u64,
}

fn default_max_delay_ms() -> u64 {
    86_400_000 // 24h
}

fn default_starvation_warn_threshold() -> u64 {
    10_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: default_max_delay_ms(),
            starvation_warn_threshold: default_starvation_warn_threshold(),
        }
    }
}

impl SchedulerConfig {
    /// Get the max delay as a Duration
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}
