//! Steering behaviors: pure functions from agent + perception to a desired
//! velocity change.
//!
//! - Seek / Flee / Arrive: move relative to a fixed point
//! - Pursuit / Evade: intercept the target or dodge the nearest threat
//! - Separation / Cohesion / Alignment: flocking against perceived allies
//! - Wander: drift around a jittered circle ahead of the agent
//! - Face: turn toward a point without moving
//!
//! Outputs compose by weighted sum, see [`blend`].

mod flocking;
mod seek;

use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

use crate::error::{self, ConfigError};
use crate::perception::PerceptionData;
use crate::vector::Vector2;

pub use flocking::{alignment, cohesion, separation};
pub use seek::{arrive, evade, face, flee, pursuit, seek, wander};

/// Desired linear velocity change plus turn rate. Zero means "no opinion".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteeringOutput {
    pub linear: Vector2,
    /// Radians, positive turns from +x toward +z.
    pub angular: f64,
}

impl SteeringOutput {
    pub const ZERO: Self = Self {
        linear: Vector2::ZERO,
        angular: 0.0,
    };

    pub fn linear(linear: Vector2) -> Self {
        Self {
            linear,
            angular: 0.0,
        }
    }

    pub fn angular(angular: f64) -> Self {
        Self {
            linear: Vector2::ZERO,
            angular,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.linear.is_zero() && self.angular == 0.0
    }

    pub fn scale(self, factor: f64) -> Self {
        Self {
            linear: self.linear * factor,
            angular: self.angular * factor,
        }
    }

    /// Clamp the linear part to `max`.
    pub fn limit(self, max: f64) -> Self {
        Self {
            linear: self.linear.limit(max),
            angular: self.angular,
        }
    }
}

impl Add for SteeringOutput {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            linear: self.linear + rhs.linear,
            angular: self.angular + rhs.angular,
        }
    }
}

impl AddAssign for SteeringOutput {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for SteeringOutput {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

/// Where the agent is and how it is moving.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub position: Vector2,
    pub velocity: Vector2,
    /// Heading in radians.
    pub facing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Desired-velocity magnitude for seek-style behaviors.
    pub max_speed: f64,
    /// Magnitude of flocking forces.
    pub max_force: f64,
    pub separation_radius: f64,
    /// Upper bound on pursuit/evade look-ahead (seconds).
    pub prediction_time: f64,
    /// Arrive starts slowing inside this radius.
    pub arrival_radius: f64,
    /// Cohesion/alignment consider allies within this radius.
    pub flock_radius: f64,
    pub wander_distance: f64,
    pub wander_radius: f64,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_speed: 8.0,
            max_force: 4.0,
            separation_radius: 4.0,
            prediction_time: 1.5,
            arrival_radius: 6.0,
            flock_radius: 16.0,
            wander_distance: 6.0,
            wander_radius: 3.0,
        }
    }
}

impl SteeringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::ensure_positive("steering.max_speed", self.max_speed)?;
        error::ensure_non_negative("steering.max_force", self.max_force)?;
        error::ensure_non_negative("steering.separation_radius", self.separation_radius)?;
        error::ensure_non_negative("steering.prediction_time", self.prediction_time)?;
        error::ensure_non_negative("steering.arrival_radius", self.arrival_radius)?;
        error::ensure_non_negative("steering.flock_radius", self.flock_radius)?;
        error::ensure_non_negative("steering.wander_distance", self.wander_distance)?;
        error::ensure_non_negative("steering.wander_radius", self.wander_radius)?;
        Ok(())
    }

    /// Same tuning with a different top speed (per-species).
    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }
}

/// Read-only inputs for one behavior evaluation.
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a, Id> {
    pub agent: Kinematics,
    pub perception: &'a PerceptionData<Id>,
    pub config: &'a SteeringConfig,
}

/// Closed set of steering strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringBehavior {
    Seek(Vector2),
    Flee(Vector2),
    Arrive(Vector2),
    /// Intercept the perceived target.
    Pursuit,
    /// Dodge the nearest perceived threat.
    Evade,
    Separation,
    Cohesion,
    Alignment,
    /// `angle` is the current wander angle, owned by the caller.
    Wander { angle: f64 },
    Face(Vector2),
}

impl SteeringBehavior {
    pub fn steer<Id: Copy>(&self, ctx: &SteeringContext<'_, Id>) -> SteeringOutput {
        match *self {
            Self::Seek(point) => seek(&ctx.agent, point, ctx.config),
            Self::Flee(point) => flee(&ctx.agent, point, ctx.config),
            Self::Arrive(point) => arrive(&ctx.agent, point, ctx.config),
            Self::Pursuit => pursuit(ctx),
            Self::Evade => evade(ctx),
            Self::Separation => separation(ctx),
            Self::Cohesion => cohesion(ctx),
            Self::Alignment => alignment(ctx),
            Self::Wander { angle } => wander(&ctx.agent, angle, ctx.config),
            Self::Face(point) => face(&ctx.agent, point),
        }
    }

    pub fn weighted(self, weight: f64) -> WeightedBehavior {
        WeightedBehavior {
            behavior: self,
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedBehavior {
    pub behavior: SteeringBehavior,
    pub weight: f64,
}

/// Weighted sum of every behavior's output.
pub fn blend<Id: Copy>(behaviors: &[WeightedBehavior], ctx: &SteeringContext<'_, Id>) -> SteeringOutput {
    behaviors
        .iter()
        .fold(SteeringOutput::ZERO, |acc, wb| acc + wb.behavior.steer(ctx) * wb.weight)
}
