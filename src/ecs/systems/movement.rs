use crate::ecs::components::{Creature, Facing, Player, Position, Steering, Velocity};
use crate::vector::Vector2;

/// How fast velocity follows the steering request (1/seconds).
const STEERING_RESPONSE: f64 = 4.0;
/// Friction multiplier per tick when nothing is steering.
const FRICTION: f64 = 0.92;
/// Minimum velocity magnitude before snapping to zero.
const MIN_VELOCITY: f64 = 0.05;
/// Max turn rate in radians/second for explicit facing requests.
const TURN_RATE: f64 = 3.0;

/// Integrate steering into velocity, velocity into position.
/// Positions stay inside `[-half_extent, half_extent]²`.
pub fn integrate(world: &mut hecs::World, dt: f64, half_extent: f64) {
    for (_, (pos, vel, facing, steering, creature)) in world
        .query_mut::<(&mut Position, &mut Velocity, &mut Facing, &Steering, &Creature)>()
    {
        let max_speed = creature.species.profile().max_speed;

        if steering.0.linear.is_zero() {
            vel.0 = vel.0 * FRICTION;
        } else {
            vel.0 = (vel.0 + steering.0.linear * (STEERING_RESPONSE * dt)).limit(max_speed);
        }

        // Snap tiny velocities to zero
        if vel.0.length_squared() < MIN_VELOCITY * MIN_VELOCITY {
            vel.0 = Vector2::ZERO;
        }

        // Explicit turn requests win; otherwise face the direction of travel.
        if steering.0.angular != 0.0 {
            let max_turn = TURN_RATE * dt;
            facing.0 += steering.0.angular.clamp(-max_turn, max_turn);
        } else if !vel.0.is_zero() {
            facing.0 = vel.0.angle();
        }

        advance(pos, vel, dt, half_extent);
    }

    for (_, (pos, vel, facing, _)) in
        world.query_mut::<(&mut Position, &mut Velocity, &mut Facing, &Player)>()
    {
        advance(pos, vel, dt, half_extent);
        if !vel.0.is_zero() {
            facing.0 = vel.0.angle();
        }
    }
}

/// Move and bounce off the world edge.
fn advance(pos: &mut Position, vel: &mut Velocity, dt: f64, half_extent: f64) {
    pos.0.x += vel.0.x * dt;
    pos.0.z += vel.0.z * dt;

    if pos.0.x.abs() > half_extent {
        pos.0.x = pos.0.x.clamp(-half_extent, half_extent);
        vel.0.x = -vel.0.x;
    }
    if pos.0.z.abs() > half_extent {
        pos.0.z = pos.0.z.clamp(-half_extent, half_extent);
        vel.0.z = -vel.0.z;
    }
}
