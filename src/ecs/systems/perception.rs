use crate::ecs::components::{Awareness, Creature};
use crate::perception::PerceptionSystem;
use crate::spatial::SpatialHashGrid;

use super::spatial::Snapshots;

/// Rebuild every creature's awareness from the grid.
///
/// Read-only against the grid; must run after [`super::spatial::sync`].
pub fn update(
    world: &mut hecs::World,
    perception: &PerceptionSystem,
    grid: &SpatialHashGrid<hecs::Entity>,
    snapshots: &Snapshots,
    now: f64,
) {
    for (entity, (_, awareness)) in world.query_mut::<(&Creature, &mut Awareness)>() {
        let Some(me) = snapshots.get(&entity) else {
            log::warn!("creature {entity:?} missing from snapshot cache");
            continue;
        };
        awareness.0 = perception.perceive(me, grid, snapshots, now);
    }
}
