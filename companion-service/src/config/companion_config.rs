//! Timing and policy constants for companion sessions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ServiceError, ServiceResult};

/// Timing and policy constants for a companion session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Animation tick period
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Walk-in progress added per tick
    #[serde(default = "default_walk_in_step")]
    pub walk_in_step: f32,

    /// Progress value at which the walk-in reaches center stage
    #[serde(default = "default_walk_in_span")]
    pub walk_in_span: f32,

    /// Simulated reply latency, lower bound (inclusive)
    #[serde(default = "default_thinking_min_ms")]
    pub thinking_min_ms: u64,

    /// Simulated reply latency, upper bound (exclusive)
    #[serde(default = "default_thinking_max_ms")]
    pub thinking_max_ms: u64,

    /// How long the stretching interlude holds
    #[serde(default = "default_stretch_ms")]
    pub stretch_ms: u64,

    /// Duration of each leg (out, back) of the walk interlude
    #[serde(default = "default_walk_leg_ms")]
    pub walk_leg_ms: u64,

    /// How long a reply bubble stays visible
    #[serde(default = "default_bubble_ms")]
    pub bubble_ms: u64,

    /// Delay after a reply before reverting to idle
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Pause between finishing the walk-in and the greeting bubble
    #[serde(default = "default_greeting_delay_ms")]
    pub greeting_delay_ms: u64,

    /// How long the greeting bubble stays visible
    #[serde(default = "default_greeting_ms")]
    pub greeting_ms: u64,

    /// Duration of the eased transition between static poses
    #[serde(default = "default_limb_transition_ms")]
    pub limb_transition_ms: u64,

    /// Every Nth exchange pauses to stretch (0 disables)
    #[serde(default = "default_stretch_every")]
    pub stretch_every: u64,

    /// Every Nth exchange walks across the stage and back (0 disables)
    #[serde(default = "default_walk_every")]
    pub walk_every: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        default_companion()
    }
}

impl CompanionConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn stretch(&self) -> Duration {
        Duration::from_millis(self.stretch_ms)
    }

    pub fn bubble(&self) -> Duration {
        Duration::from_millis(self.bubble_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn greeting_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_delay_ms)
    }

    pub fn greeting(&self) -> Duration {
        Duration::from_millis(self.greeting_ms)
    }

    pub fn limb_transition(&self) -> Duration {
        Duration::from_millis(self.limb_transition_ms)
    }

    /// Number of ticks one walk interlude leg takes (at least one)
    pub fn walk_leg_ticks(&self) -> u32 {
        (self.walk_leg_ms / self.tick_ms.max(1)).max(1) as u32
    }

    /// Reject values the session timers cannot work with
    pub fn validate(&self) -> ServiceResult<()> {
        if self.tick_ms == 0 {
            return Err(ServiceError::Config {
                message: "companion.tick_ms must be positive".to_string(),
            });
        }
        if self.thinking_min_ms >= self.thinking_max_ms {
            return Err(ServiceError::Config {
                message: format!(
                    "companion.thinking_min_ms ({}) must be below thinking_max_ms ({})",
                    self.thinking_min_ms, self.thinking_max_ms
                ),
            });
        }
        if self.walk_in_step <= 0.0 || self.walk_in_span <= 0.0 {
            return Err(ServiceError::Config {
                message: "companion.walk_in_step and walk_in_span must be positive".to_string(),
            });
        }
        Ok(())
    }
}

// ==================== Default Value Functions ====================

pub(crate) fn default_companion() -> CompanionConfig {
    CompanionConfig {
        tick_ms: default_tick_ms(),
        walk_in_step: default_walk_in_step(),
        walk_in_span: default_walk_in_span(),
        thinking_min_ms: default_thinking_min_ms(),
        thinking_max_ms: default_thinking_max_ms(),
        stretch_ms: default_stretch_ms(),
        walk_leg_ms: default_walk_leg_ms(),
        bubble_ms: default_bubble_ms(),
        settle_ms: default_settle_ms(),
        greeting_delay_ms: default_greeting_delay_ms(),
        greeting_ms: default_greeting_ms(),
        limb_transition_ms: default_limb_transition_ms(),
        stretch_every: default_stretch_every(),
        walk_every: default_walk_every(),
    }
}

fn default_tick_ms() -> u64 {
    32
}

fn default_walk_in_step() -> f32 {
    2.2
}

fn default_walk_in_span() -> f32 {
    52.0
}

fn default_thinking_min_ms() -> u64 {
    900
}

fn default_thinking_max_ms() -> u64 {
    1800
}

fn default_stretch_ms() -> u64 {
    750
}

fn default_walk_leg_ms() -> u64 {
    1100
}

fn default_bubble_ms() -> u64 {
    3200
}

fn default_settle_ms() -> u64 {
    3500
}

fn default_greeting_delay_ms() -> u64 {
    400
}

fn default_greeting_ms() -> u64 {
    2500
}

fn default_limb_transition_ms() -> u64 {
    400
}

fn default_stretch_every() -> u64 {
    4
}

fn default_walk_every() -> u64 {
    6
}
