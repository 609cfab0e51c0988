use std::collections::HashMap;

use crate::ecs::components::{Creature, Facing, Health, Position, Velocity};
use crate::perception::{EntityKind, EntitySnapshot};
use crate::spatial::SpatialHashGrid;

pub type Snapshots = HashMap<hecs::Entity, EntitySnapshot<hecs::Entity>>;

/// Push current positions into the grid and refresh the snapshot cache.
///
/// Entities without a `Creature` component are treated as players. Grid
/// entries whose entity left the world since the last sync are dropped.
pub fn sync(world: &hecs::World, grid: &mut SpatialHashGrid<hecs::Entity>, snapshots: &mut Snapshots) {
    snapshots.clear();
    for (entity, (pos, vel, facing, health, creature)) in world
        .query::<(&Position, &Velocity, &Facing, &Health, Option<&Creature>)>()
        .iter()
    {
        let kind = match creature {
            Some(c) => EntityKind::Creature(c.species),
            None => EntityKind::Player,
        };
        let snapshot = EntitySnapshot {
            id: entity,
            position: pos.0,
            velocity: vel.0,
            facing: facing.0,
            kind,
            health: health.current,
        };
        grid.update(&snapshot);
        snapshots.insert(entity, snapshot);
    }

    if grid.len() != snapshots.len() {
        let before = grid.len();
        grid.retain(|id| snapshots.contains_key(&id));
        log::debug!("dropped {} stale grid entries", before - grid.len());
    }
}

/// Remove `entity` from the world and the grid. Unknown entities are ignored.
pub fn despawn(
    world: &mut hecs::World,
    grid: &mut SpatialHashGrid<hecs::Entity>,
    snapshots: &mut Snapshots,
    entity: hecs::Entity,
) -> bool {
    grid.remove_id(entity);
    snapshots.remove(&entity);
    world.despawn(entity).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::spawn_creatures;
    use crate::spatial::GridConfig;

    #[test]
    fn sync_forgets_entities_despawned_behind_its_back() {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(5);
        let mut grid = SpatialHashGrid::new(GridConfig::default()).unwrap();
        let mut snapshots = Snapshots::new();

        let herd = spawn_creatures(&mut world, 10, 50.0, &mut rng);
        sync(&world, &mut grid, &mut snapshots);
        assert_eq!(grid.len(), 10);

        for &e in &herd[..7] {
            world.despawn(e).unwrap();
        }
        sync(&world, &mut grid, &mut snapshots);
        assert_eq!(grid.len(), 3);
        assert_eq!(snapshots.len(), 3);
        assert!(herd[..7].iter().all(|e| !grid.contains(*e)));
        assert!(herd[7..].iter().all(|e| grid.contains(*e)));
        assert_eq!(grid.query_radius(0.0, 0.0, 1_000.0).len(), 3);
    }

    #[test]
    fn despawn_clears_grid_and_cache() {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(6);
        let mut grid = SpatialHashGrid::new(GridConfig::default()).unwrap();
        let mut snapshots = Snapshots::new();

        let herd = spawn_creatures(&mut world, 2, 50.0, &mut rng);
        sync(&world, &mut grid, &mut snapshots);
        assert!(despawn(&mut world, &mut grid, &mut snapshots, herd[0]));
        assert!(!grid.contains(herd[0]));
        assert!(!snapshots.contains_key(&herd[0]));
        assert!(!despawn(&mut world, &mut grid, &mut snapshots, herd[0]));
    }
}
