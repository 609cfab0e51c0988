pub mod species;

pub use species::{DietCategory, Species, SpeciesProfile, Temperament};

use glam::DVec3;

use crate::behavior::AgentMind;
use crate::ecs::components::*;
use crate::perception::PerceptionData;
use crate::steering::SteeringOutput;
use crate::vector::Vector2;

/// Relative spawn weights. Herds outnumber hunters.
const SPAWN_WEIGHTS: [(Species, u32); 8] = [
    (Species::Triceratops, 6),
    (Species::Stegosaurus, 5),
    (Species::Parasaurolophus, 8),
    (Species::Compsognathus, 6),
    (Species::Velociraptor, 4),
    (Species::Dilophosaurus, 3),
    (Species::TyrannosaurusRex, 1),
    (Species::Spinosaurus, 1),
];

/// Pick a species according to [`SPAWN_WEIGHTS`].
pub fn random_species(rng: &mut fastrand::Rng) -> Species {
    let total: u32 = SPAWN_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.u32(0..total);
    for (species, weight) in SPAWN_WEIGHTS {
        if roll < weight {
            return species;
        }
        roll -= weight;
    }
    Species::Parasaurolophus
}

/// Spawn a batch of creatures scattered over `[-half_extent, half_extent]²`.
pub fn spawn_creatures(
    world: &mut hecs::World,
    count: usize,
    half_extent: f64,
    rng: &mut fastrand::Rng,
) -> Vec<hecs::Entity> {
    (0..count)
        .map(|_| {
            let species = random_species(rng);
            spawn_creature(world, species, random_point(rng, half_extent), rng)
        })
        .collect()
}

pub fn spawn_creature(
    world: &mut hecs::World,
    species: Species,
    position: DVec3,
    rng: &mut fastrand::Rng,
) -> hecs::Entity {
    let profile = species.profile();
    let facing = rng.f64() * std::f64::consts::TAU;
    world.spawn((
        Position(position),
        Velocity(Vector2::ZERO),
        Facing(facing),
        Health {
            current: profile.max_health,
        },
        Creature { species },
        Mind(AgentMind::new(facing)),
        Awareness(PerceptionData::default()),
        Steering(SteeringOutput::ZERO),
    ))
}

/// Players drift in straight lines and bounce off the world edge.
pub fn spawn_players(
    world: &mut hecs::World,
    count: usize,
    half_extent: f64,
    speed: f64,
    rng: &mut fastrand::Rng,
) -> Vec<hecs::Entity> {
    (0..count)
        .map(|_| {
            let heading = rng.f64() * std::f64::consts::TAU;
            world.spawn((
                Position(random_point(rng, half_extent)),
                Velocity(Vector2::from_angle(heading) * speed),
                Facing(heading),
                Health { current: 100.0 },
                Player,
            ))
        })
        .collect()
}

fn random_point(rng: &mut fastrand::Rng, half_extent: f64) -> DVec3 {
    DVec3::new(
        (rng.f64() * 2.0 - 1.0) * half_extent,
        0.0,
        (rng.f64() * 2.0 - 1.0) * half_extent,
    )
}
