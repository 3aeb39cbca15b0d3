//! Command scheduling.
//!
//! The scheduler turns the polling loop's inline "re-send the command
//! every N minutes, back off when the liquid line overheats" branching
//! into a pure decision function over an externally supplied clock. Time
//! is a [`Duration`] offset from an arbitrary epoch so the state machine
//! runs against synthetic timestamps in tests.

use std::time::Duration;

use gree_protocol::{ControlIntent, DecodedStatus, Mode};
use serde::{Deserialize, Serialize};

use crate::guard::{SafetyRule, SafetyVerdict};

/// Timing and intents for the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How often the baseline intent is re-asserted, in seconds.
    pub reassert_interval_secs: u64,
    /// How long to hold off after a protective fallback, in seconds.
    pub cooldown_secs: u64,
    /// The standing command re-asserted on the interval.
    pub baseline: ControlIntent,
    /// The reduced-capacity command issued on a liquid overtemperature.
    pub fallback: ControlIntent,
}

impl SchedulerConfig {
    /// The re-assert interval as a [`Duration`].
    pub fn reassert_interval(&self) -> Duration {
        Duration::from_secs(self.reassert_interval_secs)
    }

    /// The cooldown as a [`Duration`].
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            reassert_interval_secs: 300,
            cooldown_secs: 30,
            baseline: max_capacity_intent(Mode::Cool),
            fallback: reduced_capacity_intent(),
        }
    }
}

/// The standing maximum-capacity command for chiller operation.
pub fn max_capacity_intent(mode: Mode) -> ControlIntent {
    ControlIntent {
        power: Some(true),
        mode: Some(mode),
        capacity: Some(0xFF),
        flow: Some(0xFF),
        fan_speed: Some(5),
        ..Default::default()
    }
}

/// The reduced-capacity command used to shed heat after an
/// overtemperature.
pub fn reduced_capacity_intent() -> ControlIntent {
    ControlIntent {
        power: Some(true),
        mode: Some(Mode::Cool),
        capacity: Some(0x40),
        flow: Some(0x60),
        ..Default::default()
    }
}

/// Scheduler state across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Normal operation; the baseline is re-asserted on the interval.
    Asserting,
    /// A fallback was issued; nothing is emitted until the deadline.
    CoolingDown {
        /// When the cooldown expires.
        until: Duration,
    },
}

/// Decides, once per polling tick, whether to emit the baseline intent, a
/// protective fallback, or nothing.
///
/// The only state carried across ticks is the last baseline timestamp and
/// the cooldown deadline; a single logical caller owns the instance, so
/// no locking is involved.
#[derive(Debug)]
pub struct CommandScheduler {
    config: SchedulerConfig,
    state: SchedulerState,
    last_baseline_at: Option<Duration>,
}

impl CommandScheduler {
    /// Create a scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        CommandScheduler {
            config,
            state: SchedulerState::Asserting,
            last_baseline_at: None,
        }
    }

    /// Current state, for display.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Decide what to send for this tick.
    ///
    /// A liquid overtemperature verdict triggers the fallback exactly once
    /// per violation onset and starts the cooldown; during the cooldown
    /// nothing is emitted, including for the continuing violation.
    /// Otherwise the baseline is emitted on the very first tick and then
    /// whenever the re-assert interval has elapsed.
    pub fn tick(
        &mut self,
        now: Duration,
        verdict: &SafetyVerdict,
        status: Option<&DecodedStatus>,
    ) -> Option<ControlIntent> {
        if let SchedulerState::CoolingDown { until } = self.state {
            if now < until {
                return None;
            }
            log::debug!("cooldown expired, resuming assertion");
            self.state = SchedulerState::Asserting;
        }

        if verdict.violates(SafetyRule::LiquidTempOverLimit) {
            if let Some(fo) = status.and_then(|s| s.fixed_offset.as_ref()) {
                log::warn!(
                    "liquid line at {}C, issuing reduced-capacity fallback",
                    fo.liquid_temp_c
                );
            }
            self.state = SchedulerState::CoolingDown {
                until: now + self.config.cooldown(),
            };
            return Some(self.config.fallback.clone());
        }

        let due = match self.last_baseline_at {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.config.reassert_interval(),
        };
        if due {
            self.last_baseline_at = Some(now);
            return Some(self.config.baseline.clone());
        }

        None
    }
}
