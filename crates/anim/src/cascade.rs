//! The scripted power-on sequence.
//!
//! A single external "power on" signal starts a fixed chain of timed stages
//! that ends by handing control to the player. The chain runs once per
//! session; stages are never re-entered and there is no way back to `Off`.

use cartwalker_common::{Timeline, TimerId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stages of the power-on sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerStage {
    Off,
    RedLightOn,
    HatchOpening,
    LegsUnfolding,
    LegsRising,
    LegsDeployed,
    IdlePosed,
    InteractionEnabled,
}

impl PowerStage {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Off => Some(Self::RedLightOn),
            Self::RedLightOn => Some(Self::HatchOpening),
            Self::HatchOpening => Some(Self::LegsUnfolding),
            Self::LegsUnfolding => Some(Self::LegsRising),
            Self::LegsRising => Some(Self::LegsDeployed),
            Self::LegsDeployed => Some(Self::IdlePosed),
            Self::IdlePosed => Some(Self::InteractionEnabled),
            Self::InteractionEnabled => None,
        }
    }
}

/// Delay before entering each stage, measured from entry into the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeTimings {
    pub red_light_ms: u64,
    pub hatch_ms: u64,
    pub unfold_ms: u64,
    pub rise_ms: u64,
    pub legs_deployed_ms: u64,
    pub idle_ms: u64,
    /// Lines up with the camera target settling after the legs deploy.
    pub interaction_ms: u64,
}

impl Default for CascadeTimings {
    fn default() -> Self {
        Self {
            red_light_ms: 10,
            hatch_ms: 4000,
            unfold_ms: 1500,
            rise_ms: 2400,
            legs_deployed_ms: 0,
            idle_ms: 2000,
            interaction_ms: 2800,
        }
    }
}

impl CascadeTimings {
    /// Delay before entering `stage`. `Off` is never entered.
    pub fn delay_into(&self, stage: PowerStage) -> Duration {
        let ms = match stage {
            PowerStage::Off => 0,
            PowerStage::RedLightOn => self.red_light_ms,
            PowerStage::HatchOpening => self.hatch_ms,
            PowerStage::LegsUnfolding => self.unfold_ms,
            PowerStage::LegsRising => self.rise_ms,
            PowerStage::LegsDeployed => self.legs_deployed_ms,
            PowerStage::IdlePosed => self.idle_ms,
            PowerStage::InteractionEnabled => self.interaction_ms,
        };
        Duration::from_millis(ms)
    }

    /// Time from the power-on signal to interaction.
    pub fn total(&self) -> Duration {
        let mut total = Duration::ZERO;
        let mut stage = PowerStage::Off;
        while let Some(next) = stage.next() {
            total += self.delay_into(next);
            stage = next;
        }
        total
    }
}

/// Explicit state machine for the power-on sequence.
#[derive(Debug, Clone)]
pub struct PowerOnCascade {
    timings: CascadeTimings,
    stage: PowerStage,
    timeline: Timeline<PowerStage>,
    pending: Option<TimerId>,
    triggered: bool,
}

impl PowerOnCascade {
    pub fn new(timings: CascadeTimings) -> Self {
        Self {
            timings,
            stage: PowerStage::Off,
            timeline: Timeline::new(),
            pending: None,
            triggered: false,
        }
    }

    pub fn stage(&self) -> PowerStage {
        self.stage
    }

    pub fn timings(&self) -> &CascadeTimings {
        &self.timings
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn red_light_on(&self) -> bool {
        self.stage >= PowerStage::RedLightOn
    }

    pub fn legs_out(&self) -> bool {
        self.stage >= PowerStage::LegsDeployed
    }

    pub fn interaction_enabled(&self) -> bool {
        self.stage == PowerStage::InteractionEnabled
    }

    /// When the next stage is due, if one is pending.
    pub fn next_due(&self) -> Option<Duration> {
        self.timeline.next_due()
    }

    /// Start the sequence. Only the first call does anything.
    pub fn trigger(&mut self, now: Duration) -> bool {
        if self.triggered {
            tracing::debug!("power-on already triggered, ignoring");
            return false;
        }
        self.triggered = true;
        tracing::info!("power-on sequence started");
        self.schedule_after(now, PowerStage::Off);
        true
    }

    /// Enter every stage that is due by `now`. Returns them in order.
    pub fn advance(&mut self, now: Duration) -> Vec<PowerStage> {
        let mut entered = Vec::new();
        while let Some((due, stage)) = self.timeline.pop_due(now) {
            self.pending = None;
            if stage <= self.stage {
                continue;
            }
            self.stage = stage;
            let at_ms = due.as_millis() as u64;
            tracing::debug!(?stage, at_ms, "entered power stage");
            entered.push(stage);
            self.schedule_after(due, stage);
        }
        entered
    }

    /// Cancel the pending stage, leaving the sequence where it is.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(id) => self.timeline.cancel(id),
            None => false,
        }
    }

    fn schedule_after(&mut self, at: Duration, current: PowerStage) {
        if let Some(next) = current.next() {
            let delay = self.timings.delay_into(next);
            let id = self.timeline.schedule(at, delay, next);
            self.pending = Some(id);
        }
    }
}
