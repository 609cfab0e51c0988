use glam::DVec3;

use crate::behavior::AgentMind;
use crate::creature::Species;
use crate::perception::PerceptionData;
use crate::steering::SteeringOutput;
use crate::vector::Vector2;

/// World position in blocks. `y` is height and ignored by the AI.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub DVec3);

/// Ground velocity in blocks/second.
#[derive(Debug, Clone, Copy)]
pub struct Velocity(pub Vector2);

/// Heading in radians.
#[derive(Debug, Clone, Copy)]
pub struct Facing(pub f64);

/// Hit points, reported to perception for threat scoring.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: f64,
}

/// AI-driven creature of one species.
#[derive(Debug, Clone, Copy)]
pub struct Creature {
    pub species: Species,
}

/// Marks a player-controlled entity.
#[derive(Debug, Clone, Copy)]
pub struct Player;

/// Behavior state, written only by the controller.
#[derive(Debug, Clone, Copy)]
pub struct Mind(pub AgentMind);

/// Last tick's classified perception.
#[derive(Debug, Clone)]
pub struct Awareness(pub PerceptionData<hecs::Entity>);

/// Steering requested this tick, applied by the movement system.
#[derive(Debug, Clone, Copy)]
pub struct Steering(pub SteeringOutput);
