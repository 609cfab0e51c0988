use std::collections::HashMap;
use std::hash::Hash;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{self, ConfigError};
use crate::vector::Vector2;

/// Anything with a stable id and a world position.
///
/// The grid indexes by `(x, z)`; `y` is ignored for proximity.
pub trait SpatialEntity {
    type Id: Copy + Eq + Hash;

    fn id(&self) -> Self::Id;
    fn position(&self) -> DVec3;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Edge length of one square cell. Roughly the typical query radius.
    pub cell_size: f64,
    /// Number of hashed buckets in the arena.
    pub table_size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 32.0,
            table_size: 1024,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::ensure_positive("grid.cell_size", self.cell_size)?;
        if self.table_size == 0 {
            return Err(ConfigError::invalid(
                "grid.table_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Integer cell coordinate.
pub type Cell = (i32, i32);

/// One result of a radius query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<Id> {
    pub id: Id,
    pub position: Vector2,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Slot<Id> {
    id: Id,
    cell: Cell,
    position: Vector2,
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    cell: Cell,
    bucket: usize,
}

/// Spatial hash grid for radius queries over moving entities.
///
/// Cells live in a fixed arena of buckets indexed by a multiplicative hash
/// of the cell coordinate. Slots remember their exact cell so colliding
/// cells never leak into each other's queries. A reverse table maps each
/// id to the cell it was last filed under.
///
/// Writes (`update`/`remove`) must not overlap with reads; run all position
/// updates for a tick before any perception queries.
pub struct SpatialHashGrid<Id> {
    cell_size: f64,
    inv_cell_size: f64,
    table_size: usize,
    buckets: Vec<Vec<Slot<Id>>>,
    tracked: HashMap<Id, Tracked>,
}

impl<Id: Copy + Eq + Hash> SpatialHashGrid<Id> {
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut buckets = Vec::with_capacity(config.table_size);
        for _ in 0..config.table_size {
            // Pre-allocate each bucket so early ticks don't thrash.
            buckets.push(Vec::with_capacity(4));
        }
        Ok(Self {
            cell_size: config.cell_size,
            inv_cell_size: 1.0 / config.cell_size,
            table_size: config.table_size,
            buckets,
            tracked: HashMap::new(),
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.tracked.contains_key(&id)
    }

    /// Cell the entity was last filed under.
    pub fn cell_of(&self, id: Id) -> Option<Cell> {
        self.tracked.get(&id).map(|t| t.cell)
    }

    /// Last known ground position of the entity.
    pub fn position_of(&self, id: Id) -> Option<Vector2> {
        let tracked = self.tracked.get(&id)?;
        self.buckets[tracked.bucket]
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.position)
    }

    /// Drop every entity. Keeps bucket allocations.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.tracked.clear();
    }

    /// Track `entity` at its current position, moving it between cells if needed.
    pub fn update<E>(&mut self, entity: &E)
    where
        E: SpatialEntity<Id = Id>,
    {
        let p = entity.position();
        self.update_position(entity.id(), Vector2::new(p.x, p.z));
    }

    pub fn update_position(&mut self, id: Id, position: Vector2) {
        let cell = self.cell_coords(position);

        if let Some(prev) = self.tracked.get(&id).copied() {
            if prev.cell == cell {
                // Same cell: membership unchanged, refresh the stored position.
                if let Some(slot) = self.buckets[prev.bucket].iter_mut().find(|s| s.id == id) {
                    slot.position = position;
                }
                return;
            }
            self.detach(id, prev.bucket);
        }

        let bucket = self.hash_cell(cell.0, cell.1);
        self.buckets[bucket].push(Slot { id, cell, position });
        self.tracked.insert(id, Tracked { cell, bucket });
    }

    /// Stop tracking `entity`. Unknown entities are ignored.
    pub fn remove<E>(&mut self, entity: &E)
    where
        E: SpatialEntity<Id = Id>,
    {
        self.remove_id(entity.id());
    }

    pub fn remove_id(&mut self, id: Id) {
        if let Some(prev) = self.tracked.remove(&id) {
            self.detach(id, prev.bucket);
        }
    }

    /// All entities within `radius` of `(x, z)`. Order is unspecified.
    pub fn query_radius(&self, x: f64, z: f64, radius: f64) -> Vec<Neighbor<Id>> {
        self.query_radius_filter(x, z, radius, |_| true)
    }

    /// Like [`query_radius`](Self::query_radius) but keeps only neighbors
    /// accepted by `predicate`.
    pub fn query_radius_filter(
        &self,
        x: f64,
        z: f64,
        radius: f64,
        predicate: impl Fn(&Neighbor<Id>) -> bool,
    ) -> Vec<Neighbor<Id>> {
        let mut found = Vec::new();
        self.visit_radius(x, z, radius, |n| {
            if predicate(&n) {
                found.push(n);
            }
        });
        found
    }

    /// Calls `callback` for each entity within `radius` of `(x, z)`.
    ///
    /// Scans every cell overlapping the query circle's bounding square,
    /// then filters on true Euclidean distance. When that square covers more
    /// cells than there are buckets, every bucket is scanned once instead.
    pub fn visit_radius(&self, x: f64, z: f64, radius: f64, mut callback: impl FnMut(Neighbor<Id>)) {
        if !(radius >= 0.0) {
            return;
        }
        let center = Vector2::new(x, z);
        let radius_sq = radius * radius;
        let reach = (radius * self.inv_cell_size).ceil();
        let side = 2.0 * reach + 1.0;

        let mut emit = |slot: &Slot<Id>| {
            let dist_sq = slot.position.distance_squared_to(center);
            if dist_sq <= radius_sq {
                callback(Neighbor {
                    id: slot.id,
                    position: slot.position,
                    distance: dist_sq.sqrt(),
                });
            }
        };

        if side * side > self.table_size as f64 {
            for slot in self.buckets.iter().flatten() {
                emit(slot);
            }
            return;
        }

        let (cx, cz) = self.cell_coords(center);
        let reach = reach as i32;
        for dz in -reach..=reach {
            for dx in -reach..=reach {
                let cell = (cx.wrapping_add(dx), cz.wrapping_add(dz));
                let bucket = self.hash_cell(cell.0, cell.1);
                for slot in &self.buckets[bucket] {
                    if slot.cell == cell {
                        emit(slot);
                    }
                }
            }
        }
    }

    /// Drop every tracked entity for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(Id) -> bool) {
        let mut dropped = 0;
        for bucket in &mut self.buckets {
            bucket.retain(|slot| {
                let kept = keep(slot.id);
                if !kept {
                    dropped += 1;
                }
                kept
            });
        }
        if dropped > 0 {
            let buckets = &self.buckets;
            self.tracked
                .retain(|id, t| buckets[t.bucket].iter().any(|slot| slot.id == *id));
        }
    }

    fn detach(&mut self, id: Id, bucket: usize) {
        let slots = &mut self.buckets[bucket];
        if let Some(idx) = slots.iter().position(|s| s.id == id) {
            slots.swap_remove(idx);
        }
    }

    fn cell_coords(&self, pos: Vector2) -> Cell {
        let cx = (pos.x * self.inv_cell_size).floor() as i32;
        let cz = (pos.z * self.inv_cell_size).floor() as i32;
        (cx, cz)
    }

    fn hash_cell(&self, cx: i32, cz: i32) -> usize {
        // Large-prime multiplicative hash over the cell coordinate.
        let h = (cx as u32).wrapping_mul(73856093) ^ (cz as u32).wrapping_mul(19349663);
        (h as usize) % self.table_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dot {
        id: u32,
        pos: DVec3,
    }

    impl SpatialEntity for Dot {
        type Id = u32;
        fn id(&self) -> u32 {
            self.id
        }
        fn position(&self) -> DVec3 {
            self.pos
        }
    }

    fn grid(cell_size: f64, table_size: usize) -> SpatialHashGrid<u32> {
        SpatialHashGrid::new(GridConfig {
            cell_size,
            table_size,
        })
        .unwrap()
    }

    fn ids(mut found: Vec<Neighbor<u32>>) -> Vec<u32> {
        found.sort_by_key(|n| n.id);
        found.into_iter().map(|n| n.id).collect()
    }

    #[test]
    fn insert_and_query() {
        let mut g = grid(64.0, 256);
        g.update_position(0, Vector2::new(100.0, 100.0));
        g.update_position(1, Vector2::new(110.0, 105.0));
        g.update_position(2, Vector2::new(900.0, 900.0));

        assert_eq!(ids(g.query_radius(105.0, 102.0, 20.0)), vec![0, 1]);
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn update_uses_x_and_z_only() {
        let mut g = grid(10.0, 64);
        g.update(&Dot {
            id: 5,
            pos: DVec3::new(3.0, 500.0, 4.0),
        });
        let found = g.query_radius(0.0, 0.0, 5.0);
        assert_eq!(ids(found.clone()), vec![5]);
        assert!((found[0].distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn update_moves_between_cells() {
        let mut g = grid(10.0, 64);
        g.update_position(1, Vector2::new(1.0, 1.0));
        assert_eq!(g.cell_of(1), Some((0, 0)));

        g.update_position(1, Vector2::new(-15.0, 25.0));
        assert_eq!(g.cell_of(1), Some((-2, 2)));
        assert!(g.query_radius(1.0, 1.0, 2.0).is_empty());
        assert_eq!(ids(g.query_radius(-15.0, 25.0, 0.5)), vec![1]);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn same_cell_update_refreshes_position() {
        let mut g = grid(100.0, 16);
        g.update_position(1, Vector2::new(1.0, 1.0));
        g.update_position(1, Vector2::new(50.0, 50.0));
        assert_eq!(g.position_of(1), Some(Vector2::new(50.0, 50.0)));
        assert!(g.query_radius(1.0, 1.0, 5.0).is_empty());
    }

    #[test]
    fn update_is_idempotent() {
        let mut g = grid(8.0, 32);
        let dot = Dot {
            id: 9,
            pos: DVec3::new(12.0, 0.0, -3.0),
        };
        g.update(&dot);
        let once = (g.len(), g.cell_of(9), ids(g.query_radius(12.0, -3.0, 1.0)));
        g.update(&dot);
        let twice = (g.len(), g.cell_of(9), ids(g.query_radius(12.0, -3.0, 1.0)));
        assert_eq!(once, twice);
        let total: usize = g.buckets.iter().map(Vec::len).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn remove_clears_bucket_and_lookup() {
        let mut g = grid(10.0, 64);
        let dot = Dot {
            id: 3,
            pos: DVec3::new(4.0, 0.0, 4.0),
        };
        g.update(&dot);
        g.remove(&dot);
        assert!(!g.contains(3));
        assert!(g.query_radius(4.0, 4.0, 10.0).is_empty());
        assert!(g.buckets.iter().all(Vec::is_empty));

        // Removing again is a no-op.
        g.remove(&dot);
        g.remove_id(42);
        assert!(g.is_empty());
    }

    #[test]
    fn zero_radius_matches_exact_point_only() {
        let mut g = grid(10.0, 64);
        g.update_position(1, Vector2::new(5.0, 5.0));
        g.update_position(2, Vector2::new(5.0, 5.1));
        assert_eq!(ids(g.query_radius(5.0, 5.0, 0.0)), vec![1]);
    }

    #[test]
    fn negative_radius_is_empty() {
        let mut g = grid(10.0, 64);
        g.update_position(1, Vector2::new(5.0, 5.0));
        assert!(g.query_radius(5.0, 5.0, -1.0).is_empty());
    }

    #[test]
    fn predicate_filters_results() {
        let mut g = grid(10.0, 64);
        for id in 0..10 {
            g.update_position(id, Vector2::new(id as f64, 0.0));
        }
        let even = g.query_radius_filter(0.0, 0.0, 100.0, |n| n.id % 2 == 0);
        assert_eq!(ids(even), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn colliding_cells_do_not_duplicate() {
        // One bucket: every cell collides.
        let mut g = grid(1.0, 1);
        g.update_position(1, Vector2::new(0.5, 0.5));
        g.update_position(2, Vector2::new(3.5, 0.5));
        g.update_position(3, Vector2::new(-2.5, -2.5));
        assert_eq!(ids(g.query_radius(0.5, 0.5, 3.0)), vec![1, 2]);
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = fastrand::Rng::with_seed(1234);
        let mut g = grid(7.5, 97);
        let mut positions = Vec::new();
        for id in 0..400u32 {
            let p = Vector2::new(rng.f64() * 200.0 - 100.0, rng.f64() * 200.0 - 100.0);
            g.update_position(id, p);
            positions.push(p);
        }
        // Move a subset so the reverse table gets exercised.
        for id in (0..400u32).step_by(3) {
            let p = Vector2::new(rng.f64() * 200.0 - 100.0, rng.f64() * 200.0 - 100.0);
            g.update_position(id, p);
            positions[id as usize] = p;
        }
        for id in (0..400u32).step_by(7) {
            g.remove_id(id);
        }

        for _ in 0..100 {
            let center = Vector2::new(rng.f64() * 220.0 - 110.0, rng.f64() * 220.0 - 110.0);
            let radius = rng.f64() * 40.0;
            let keep = |id: u32| id % 5 != 0;

            let mut expected: Vec<u32> = positions
                .iter()
                .enumerate()
                .map(|(i, p)| (i as u32, *p))
                .filter(|(id, p)| id % 7 != 0 && p.distance_squared_to(center) <= radius * radius && keep(*id))
                .map(|(id, _)| id)
                .collect();
            expected.sort_unstable();

            let found = g.query_radius_filter(center.x, center.z, radius, |n| keep(n.id));
            assert_eq!(ids(found), expected);
        }
    }

    #[test]
    fn huge_radius_scans_buckets_instead_of_cells() {
        let mut rng = fastrand::Rng::with_seed(77);
        let mut g = grid(1.0, 64);
        let mut positions = Vec::new();
        for id in 0..50u32 {
            let p = Vector2::new(rng.f64() * 2000.0 - 1000.0, rng.f64() * 2000.0 - 1000.0);
            g.update_position(id, p);
            positions.push(p);
        }

        for radius in [5_000.0, 700.0, f64::INFINITY] {
            let mut expected: Vec<u32> = positions
                .iter()
                .enumerate()
                .filter(|(_, p)| p.distance_squared_to(Vector2::ZERO) <= radius * radius)
                .map(|(i, _)| i as u32)
                .collect();
            expected.sort_unstable();
            assert_eq!(ids(g.query_radius(0.0, 0.0, radius)), expected);
        }
        assert_eq!(g.query_radius(0.0, 0.0, f64::INFINITY).len(), 50);
    }

    #[test]
    fn retain_drops_rejected_ids() {
        let mut g = grid(10.0, 8);
        for id in 0..20u32 {
            g.update_position(id, Vector2::new(id as f64 * 3.0, 0.0));
        }
        g.retain(|id| id % 4 == 0);
        assert_eq!(g.len(), 5);
        assert!(g.contains(8));
        assert!(!g.contains(9));
        assert_eq!(g.position_of(9), None);
        let total: usize = g.buckets.iter().map(Vec::len).sum();
        assert_eq!(total, 5);
        assert_eq!(ids(g.query_radius(0.0, 0.0, 1_000.0)), vec![0, 4, 8, 12, 16]);
    }

    #[test]
    fn rejects_bad_config() {
        assert!(SpatialHashGrid::<u32>::new(GridConfig {
            cell_size: -1.0,
            table_size: 16
        })
        .is_err());
        assert!(SpatialHashGrid::<u32>::new(GridConfig {
            cell_size: 4.0,
            table_size: 0
        })
        .is_err());
    }
}
