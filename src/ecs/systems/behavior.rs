use crate::behavior::{BehaviorContext, BehaviorController};
use crate::ecs::components::{Awareness, Creature, Facing, Mind, Position, Steering, Velocity};
use crate::ecs::events::{EventBus, SimEvent};
use crate::steering::Kinematics;
use crate::vector::Vector2;

/// Run the behavior controller for every creature and stash its steering.
pub fn update(
    world: &mut hecs::World,
    controller: &BehaviorController,
    events: &mut EventBus,
    elevated_threat: bool,
    dt: f64,
    rng: &mut fastrand::Rng,
) {
    for (entity, (creature, mind, awareness, steering, pos, vel, facing)) in world.query_mut::<(
        &Creature,
        &mut Mind,
        &Awareness,
        &mut Steering,
        &Position,
        &Velocity,
        &Facing,
    )>() {
        let ctx = BehaviorContext {
            agent: Kinematics {
                position: Vector2::new(pos.0.x, pos.0.z),
                velocity: vel.0,
                facing: facing.0,
            },
            species: creature.species,
            perception: &awareness.0,
            elevated_threat,
            dt,
        };
        let decision = controller.update(&mut mind.0, &ctx, rng);
        steering.0 = decision.steering;

        if decision.changed() {
            events.dispatch(&SimEvent::StateChanged {
                entity,
                species: creature.species,
                from: decision.previous,
                to: decision.state,
                animation: decision.animation,
            });
        }
    }
}
