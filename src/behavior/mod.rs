//! Discrete state machine that turns perception into a steering request.
//!
//! The controller is the only place an agent's [`AgentState`] and
//! [`Animation`] change. Hosts push damage/capture outcomes in through
//! [`BehaviorController::apply_external`].

pub mod animation;

use serde::{Deserialize, Serialize};

use crate::creature::{Species, Temperament};
use crate::error::{self, ConfigError};
use crate::perception::{wrap_angle, PerceptionData, Relationship};
use crate::steering::{blend, Kinematics, SteeringBehavior, SteeringConfig, SteeringContext, SteeringOutput};

pub use animation::Animation;

/// Fraction of top speed used while wandering.
const WALK_FRACTION: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AgentState {
    #[default]
    Idle,
    Wandering,
    Fleeing,
    Chasing,
    Attacking,
    Defending,
    /// Held until the host revives the agent.
    Unconscious,
    /// Held until the host releases the agent.
    Captured,
}

impl AgentState {
    pub const ALL: [AgentState; 8] = [
        Self::Idle,
        Self::Wandering,
        Self::Fleeing,
        Self::Chasing,
        Self::Attacking,
        Self::Defending,
        Self::Unconscious,
        Self::Captured,
    ];

    /// States the controller never leaves on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Unconscious | Self::Captured)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Wandering => "Wandering",
            Self::Fleeing => "Fleeing",
            Self::Chasing => "Chasing",
            Self::Attacking => "Attacking",
            Self::Defending => "Defending",
            Self::Unconscious => "Unconscious",
            Self::Captured => "Captured",
        }
    }
}

/// Per-agent mutable behavior state. Owned by the host, written by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentMind {
    state: AgentState,
    /// Seconds spent in `state`.
    time_in_state: f64,
    animation: Animation,
    wander_angle: f64,
}

impl AgentMind {
    pub fn new(wander_angle: f64) -> Self {
        Self {
            wander_angle,
            ..Self::default()
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn time_in_state(&self) -> f64 {
        self.time_in_state
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    pub fn wander_angle(&self) -> f64 {
        self.wander_angle
    }

    fn enter(&mut self, state: AgentState) {
        self.state = state;
        self.time_in_state = 0.0;
        self.animation = Animation::for_state(state);
    }
}

/// Outcomes the host's damage/capture systems report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalEvent {
    KnockedOut,
    Captured,
    Revived,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Per-tick chance an idle agent starts wandering.
    pub idle_to_wander_chance: f64,
    /// Seconds an agent wanders before it may stop.
    pub wander_min_dwell: f64,
    /// Per-tick chance a wanderer past the dwell time stops.
    pub wander_to_idle_chance: f64,
    /// Threat level at which non-aggressive agents flee.
    pub flee_threshold: f64,
    /// Threat level at which aggressive agents flee.
    pub aggressive_flee_threshold: f64,
    /// Multiplier on flee thresholds while the elevated-threat flag is set.
    pub elevated_threat_factor: f64,
    /// Hunters switch from chasing to attacking inside this distance.
    pub attack_range: f64,
    /// Agents that don't flee stand their ground against threats inside this distance.
    pub defend_radius: f64,
    /// Max wander-angle change per tick (radians).
    pub wander_jitter: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            idle_to_wander_chance: 0.02,
            wander_min_dwell: 5.0,
            wander_to_idle_chance: 0.01,
            flee_threshold: 0.5,
            aggressive_flee_threshold: 0.9,
            elevated_threat_factor: 0.5,
            attack_range: 3.0,
            defend_radius: 16.0,
            wander_jitter: 0.6,
        }
    }
}

impl BehaviorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::ensure_unit("behavior.idle_to_wander_chance", self.idle_to_wander_chance)?;
        error::ensure_non_negative("behavior.wander_min_dwell", self.wander_min_dwell)?;
        error::ensure_unit("behavior.wander_to_idle_chance", self.wander_to_idle_chance)?;
        error::ensure_unit("behavior.flee_threshold", self.flee_threshold)?;
        error::ensure_unit("behavior.aggressive_flee_threshold", self.aggressive_flee_threshold)?;
        error::ensure_unit("behavior.elevated_threat_factor", self.elevated_threat_factor)?;
        error::ensure_non_negative("behavior.attack_range", self.attack_range)?;
        error::ensure_non_negative("behavior.defend_radius", self.defend_radius)?;
        error::ensure_non_negative("behavior.wander_jitter", self.wander_jitter)?;
        Ok(())
    }
}

/// Everything the controller reads for one agent and one tick.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorContext<'a, Id> {
    pub agent: Kinematics,
    pub species: Species,
    pub perception: &'a PerceptionData<Id>,
    /// World-wide alarm; lowers flee thresholds.
    pub elevated_threat: bool,
    /// Tick length in seconds.
    pub dt: f64,
}

/// Result of one controller tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub previous: AgentState,
    pub state: AgentState,
    pub animation: Animation,
    pub steering: SteeringOutput,
}

impl Decision {
    pub fn changed(&self) -> bool {
        self.previous != self.state
    }
}

#[derive(Debug, Clone)]
pub struct BehaviorController {
    config: BehaviorConfig,
    steering: SteeringConfig,
}

impl BehaviorController {
    pub fn new(config: BehaviorConfig, steering: SteeringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        steering.validate()?;
        Ok(Self { config, steering })
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Advance `mind` one tick and pick this tick's steering.
    pub fn update<Id: Copy>(
        &self,
        mind: &mut AgentMind,
        ctx: &BehaviorContext<'_, Id>,
        rng: &mut fastrand::Rng,
    ) -> Decision {
        let previous = mind.state;
        mind.time_in_state += ctx.dt;

        let next = self.next_state(mind, ctx, rng);
        if next != previous {
            log::debug!(
                "{} {} -> {} after {:.1}s",
                ctx.species.label(),
                previous.label(),
                next.label(),
                mind.time_in_state
            );
            mind.enter(next);
        }

        if mind.state == AgentState::Wandering {
            let jitter = (rng.f64() * 2.0 - 1.0) * self.config.wander_jitter;
            mind.wander_angle = wrap_angle(mind.wander_angle + jitter);
        }

        Decision {
            previous,
            state: mind.state,
            animation: mind.animation,
            steering: self.steer(mind, ctx),
        }
    }

    /// Apply a host-side outcome. Returns whether the state changed.
    ///
    /// Reviving only leaves `Unconscious`; releasing only leaves `Captured`.
    pub fn apply_external(&self, mind: &mut AgentMind, event: ExternalEvent) -> bool {
        let next = match (event, mind.state) {
            (ExternalEvent::KnockedOut, AgentState::Captured) => return false,
            (ExternalEvent::KnockedOut, _) => AgentState::Unconscious,
            (ExternalEvent::Captured, _) => AgentState::Captured,
            (ExternalEvent::Revived, AgentState::Unconscious) => AgentState::Idle,
            (ExternalEvent::Released, AgentState::Captured) => AgentState::Idle,
            (ExternalEvent::Revived | ExternalEvent::Released, _) => return false,
        };
        if next == mind.state {
            return false;
        }
        log::debug!("external {:?}: {} -> {}", event, mind.state.label(), next.label());
        mind.enter(next);
        true
    }

    fn next_state<Id: Copy>(
        &self,
        mind: &AgentMind,
        ctx: &BehaviorContext<'_, Id>,
        rng: &mut fastrand::Rng,
    ) -> AgentState {
        if mind.state.is_terminal() {
            return mind.state;
        }
        let perception = ctx.perception;

        if let Some(threat) = perception.highest_threat() {
            if self.should_flee(ctx.species.temperament(), threat.threat_level, ctx.elevated_threat) {
                return AgentState::Fleeing;
            }
        }

        if perception.target_relationship() == Some(Relationship::Prey) {
            if let Some(target) = perception.target() {
                return if target.distance <= self.config.attack_range {
                    AgentState::Attacking
                } else {
                    AgentState::Chasing
                };
            }
        }

        if let Some(threat) = perception.nearest_threat() {
            if threat.distance <= self.config.defend_radius {
                return AgentState::Defending;
            }
        }

        match mind.state {
            AgentState::Idle => {
                if rng.f64() < self.config.idle_to_wander_chance {
                    AgentState::Wandering
                } else {
                    AgentState::Idle
                }
            }
            AgentState::Wandering => {
                if mind.time_in_state >= self.config.wander_min_dwell
                    && rng.f64() < self.config.wander_to_idle_chance
                {
                    AgentState::Idle
                } else {
                    AgentState::Wandering
                }
            }
            // Stimulus gone: settle down.
            _ => AgentState::Idle,
        }
    }

    fn should_flee(&self, temperament: Temperament, threat_level: f64, elevated: bool) -> bool {
        let base = match temperament {
            Temperament::Passive | Temperament::Skittish => return true,
            Temperament::Aggressive => self.config.aggressive_flee_threshold,
            Temperament::Neutral | Temperament::Territorial => self.config.flee_threshold,
        };
        let threshold = if elevated {
            base * self.config.elevated_threat_factor
        } else {
            base
        };
        threat_level >= threshold
    }

    fn steer<Id: Copy>(&self, mind: &AgentMind, ctx: &BehaviorContext<'_, Id>) -> SteeringOutput {
        use SteeringBehavior::*;

        let top_speed = ctx.species.profile().max_speed;
        let speed = match mind.state {
            AgentState::Wandering => top_speed * WALK_FRACTION,
            _ => top_speed,
        };
        let config = self.steering.with_max_speed(speed);
        let sctx = SteeringContext {
            agent: ctx.agent,
            perception: ctx.perception,
            config: &config,
        };
        let here = ctx.agent.position;

        match mind.state {
            AgentState::Idle => blend(&[Arrive(here).weighted(1.0), Separation.weighted(1.0)], &sctx),
            AgentState::Wandering => blend(
                &[
                    Wander {
                        angle: mind.wander_angle,
                    }
                    .weighted(1.0),
                    Separation.weighted(1.5),
                    Cohesion.weighted(0.4),
                    Alignment.weighted(0.4),
                ],
                &sctx,
            ),
            AgentState::Fleeing => blend(&[Evade.weighted(2.0), Separation.weighted(1.0)], &sctx),
            AgentState::Chasing => blend(&[Pursuit.weighted(1.0), Separation.weighted(0.5)], &sctx),
            AgentState::Attacking => match ctx.perception.target() {
                Some(target) => blend(
                    &[Arrive(target.position).weighted(1.0), Face(target.position).weighted(1.0)],
                    &sctx,
                ),
                None => Arrive(here).steer(&sctx),
            },
            AgentState::Defending => match ctx.perception.nearest_threat() {
                Some(threat) => blend(
                    &[
                        Arrive(here).weighted(1.0),
                        Face(threat.position).weighted(1.0),
                        Separation.weighted(1.0),
                    ],
                    &sctx,
                ),
                None => Arrive(here).steer(&sctx),
            },
            AgentState::Unconscious | AgentState::Captured => SteeringOutput::ZERO,
        }
    }
}
