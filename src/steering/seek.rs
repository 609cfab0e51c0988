use crate::perception::{wrap_angle, PerceivedEntity};
use crate::vector::Vector2;

use super::{Kinematics, SteeringConfig, SteeringContext, SteeringOutput};

/// Head straight for `target` at full speed. Returns `desired - velocity`.
pub fn seek(agent: &Kinematics, target: Vector2, config: &SteeringConfig) -> SteeringOutput {
    let desired = (target - agent.position).normalize() * config.max_speed;
    SteeringOutput::linear(desired - agent.velocity)
}

/// Opposite of [`seek`].
pub fn flee(agent: &Kinematics, threat: Vector2, config: &SteeringConfig) -> SteeringOutput {
    let desired = (agent.position - threat).normalize() * config.max_speed;
    SteeringOutput::linear(desired - agent.velocity)
}

/// Seek that ramps speed down linearly inside `arrival_radius`.
pub fn arrive(agent: &Kinematics, target: Vector2, config: &SteeringConfig) -> SteeringOutput {
    let offset = target - agent.position;
    let distance = offset.length();
    let speed = if distance < config.arrival_radius {
        config.max_speed * distance / config.arrival_radius
    } else {
        config.max_speed
    };
    let desired = offset.normalize() * speed;
    SteeringOutput::linear(desired - agent.velocity)
}

/// Where `other` will be after the capped look-ahead.
fn predict<Id>(agent: &Kinematics, other: &PerceivedEntity<Id>, config: &SteeringConfig) -> Vector2 {
    let distance = agent.position.distance_to(other.position);
    let look_ahead = config.prediction_time.min(distance / config.max_speed);
    other.position + other.velocity * look_ahead
}

/// Seek the target's predicted position. No target, no opinion.
pub fn pursuit<Id: Copy>(ctx: &SteeringContext<'_, Id>) -> SteeringOutput {
    let Some(target) = ctx.perception.target() else {
        return SteeringOutput::ZERO;
    };
    let predicted = predict(&ctx.agent, target, ctx.config);
    seek(&ctx.agent, predicted, ctx.config)
}

/// Flee the nearest threat's predicted position.
pub fn evade<Id: Copy>(ctx: &SteeringContext<'_, Id>) -> SteeringOutput {
    let Some(threat) = ctx.perception.nearest_threat() else {
        return SteeringOutput::ZERO;
    };
    let predicted = predict(&ctx.agent, threat, ctx.config);
    flee(&ctx.agent, predicted, ctx.config)
}

/// Seek a point on a circle projected ahead of the agent.
///
/// Heading follows velocity, or `facing` while standing still.
pub fn wander(agent: &Kinematics, angle: f64, config: &SteeringConfig) -> SteeringOutput {
    let heading = if agent.velocity.is_zero() {
        Vector2::from_angle(agent.facing)
    } else {
        agent.velocity.normalize()
    };
    let center = agent.position + heading * config.wander_distance;
    let target = center + Vector2::from_angle(angle) * config.wander_radius;
    seek(agent, target, config)
}

/// Turn toward `point`; linear part stays zero.
pub fn face(agent: &Kinematics, point: Vector2) -> SteeringOutput {
    let offset = point - agent.position;
    if offset.is_zero() {
        return SteeringOutput::ZERO;
    }
    SteeringOutput::angular(wrap_angle(offset.angle() - agent.facing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::Species;
    use crate::perception::{EntityKind, EntitySnapshot, PerceptionConfig, PerceptionData, PerceptionSystem};
    use crate::spatial::{GridConfig, SpatialHashGrid};
    use glam::DVec3;
    use std::collections::HashMap;

    const EPS: f64 = 1e-9;

    fn cfg(max_speed: f64, prediction_time: f64) -> SteeringConfig {
        SteeringConfig {
            max_speed,
            prediction_time,
            ..SteeringConfig::default()
        }
    }

    /// Raptor at the origin facing +x with one other creature ahead.
    fn hunt(other: Species, at: Vector2, velocity: Vector2) -> PerceptionData<u32> {
        let mut grid = SpatialHashGrid::new(GridConfig::default()).unwrap();
        let mut lookup = HashMap::new();
        let hunter = EntitySnapshot {
            id: 1,
            position: DVec3::ZERO,
            velocity: Vector2::ZERO,
            facing: 0.0,
            kind: EntityKind::Creature(Species::Velociraptor),
            health: 180.0,
        };
        let quarry = EntitySnapshot {
            id: 2,
            position: DVec3::new(at.x, 0.0, at.z),
            velocity,
            facing: 0.0,
            kind: EntityKind::Creature(other),
            health: 300.0,
        };
        for s in [hunter, quarry] {
            grid.update(&s);
            lookup.insert(s.id, s);
        }
        PerceptionSystem::new(PerceptionConfig::default())
            .unwrap()
            .perceive(&hunter, &grid, &lookup, 0.0)
    }

    #[test]
    fn pursuit_of_stationary_target() {
        let data = hunt(Species::Stegosaurus, Vector2::new(10.0, 0.0), Vector2::ZERO);
        let config = cfg(5.0, 2.0);
        let ctx = SteeringContext {
            agent: Kinematics::default(),
            perception: &data,
            config: &config,
        };
        let out = pursuit(&ctx);
        assert!((out.linear.x - 5.0).abs() < EPS);
        assert!(out.linear.z.abs() < EPS);
    }

    #[test]
    fn pursuit_leads_a_moving_target() {
        // lookAhead = min(0.5, 10/5) = 0.5, predicted = (10, 2).
        let data = hunt(Species::Stegosaurus, Vector2::new(10.0, 0.0), Vector2::new(0.0, 4.0));
        let config = cfg(5.0, 0.5);
        let ctx = SteeringContext {
            agent: Kinematics::default(),
            perception: &data,
            config: &config,
        };
        let out = pursuit(&ctx);
        let expected = Vector2::new(10.0, 2.0).normalize() * 5.0;
        assert!((out.linear.x - expected.x).abs() < EPS);
        assert!((out.linear.z - expected.z).abs() < EPS);
    }

    #[test]
    fn pursuit_subtracts_current_velocity() {
        let data = hunt(Species::Stegosaurus, Vector2::new(10.0, 0.0), Vector2::ZERO);
        let config = cfg(5.0, 2.0);
        let ctx = SteeringContext {
            agent: Kinematics {
                velocity: Vector2::new(1.0, 1.0),
                ..Kinematics::default()
            },
            perception: &data,
            config: &config,
        };
        let out = pursuit(&ctx);
        assert!((out.linear.x - 4.0).abs() < EPS);
        assert!((out.linear.z + 1.0).abs() < EPS);
    }

    #[test]
    fn pursuit_without_target_is_zero() {
        let data = PerceptionData::<u32>::default();
        let config = cfg(5.0, 2.0);
        let ctx = SteeringContext {
            agent: Kinematics::default(),
            perception: &data,
            config: &config,
        };
        assert_eq!(pursuit(&ctx), SteeringOutput::ZERO);
        assert_eq!(evade(&ctx), SteeringOutput::ZERO);
    }

    #[test]
    fn evade_runs_from_threat() {
        let data = hunt(Species::TyrannosaurusRex, Vector2::new(10.0, 0.0), Vector2::ZERO);
        let config = cfg(5.0, 2.0);
        let ctx = SteeringContext {
            agent: Kinematics::default(),
            perception: &data,
            config: &config,
        };
        let out = evade(&ctx);
        assert!((out.linear.x + 5.0).abs() < EPS);
    }

    #[test]
    fn arrive_slows_inside_radius() {
        let config = SteeringConfig {
            max_speed: 10.0,
            arrival_radius: 10.0,
            ..SteeringConfig::default()
        };
        let agent = Kinematics::default();
        let near = arrive(&agent, Vector2::new(2.0, 0.0), &config);
        let far = arrive(&agent, Vector2::new(50.0, 0.0), &config);
        assert!((near.linear.x - 2.0).abs() < EPS);
        assert!((far.linear.x - 10.0).abs() < EPS);
        // At the target a moving agent brakes.
        let moving = Kinematics {
            velocity: Vector2::new(3.0, 0.0),
            ..Kinematics::default()
        };
        assert_eq!(arrive(&moving, Vector2::ZERO, &config).linear, Vector2::new(-3.0, 0.0));
    }

    #[test]
    fn seek_and_flee_are_opposite() {
        let config = cfg(4.0, 1.0);
        let agent = Kinematics::default();
        let target = Vector2::new(3.0, 4.0);
        assert_eq!(seek(&agent, target, &config).linear, -flee(&agent, target, &config).linear);
    }

    #[test]
    fn wander_projects_ahead_of_heading() {
        let config = SteeringConfig {
            max_speed: 1.0,
            wander_distance: 10.0,
            wander_radius: 1.0,
            ..SteeringConfig::default()
        };
        let agent = Kinematics::default();
        let out = wander(&agent, 0.0, &config);
        assert!((out.linear.x - 1.0).abs() < EPS);
    }

    #[test]
    fn face_turns_shortest_way() {
        let agent = Kinematics {
            facing: 0.0,
            ..Kinematics::default()
        };
        let left = face(&agent, Vector2::new(0.0, 5.0));
        assert!((left.angular - std::f64::consts::FRAC_PI_2).abs() < EPS);
        assert!(left.linear.is_zero());
        assert_eq!(face(&agent, Vector2::ZERO), SteeringOutput::ZERO);
    }
}
