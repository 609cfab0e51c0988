pub mod behavior;
pub mod movement;
pub mod perception;
pub mod spatial;

use crate::behavior::BehaviorController;
use crate::debug::timer::{SystemPhase, SystemTimers};
use crate::ecs::events::EventBus;
use crate::perception::PerceptionSystem;
use crate::spatial::SpatialHashGrid;
use spatial::Snapshots;

/// Long-lived state the systems share between ticks.
pub struct SimResources {
    pub grid: SpatialHashGrid<hecs::Entity>,
    pub snapshots: Snapshots,
    pub perception: PerceptionSystem,
    pub controller: BehaviorController,
    pub events: EventBus,
    /// World-wide alarm passed to every behavior context.
    pub elevated_threat: bool,
    pub half_extent: f64,
    /// Simulation clock in seconds.
    pub now: f64,
}

/// Run all simulation systems for one fixed tick.
///
/// Grid writes finish before any perception query, and positions only move
/// after every creature has steered, so no agent sees another's
/// already-updated position within the same tick.
pub fn tick(
    world: &mut hecs::World,
    res: &mut SimResources,
    dt: f64,
    rng: &mut fastrand::Rng,
    timers: &mut SystemTimers,
) {
    res.now += dt;

    // 1. Commit positions to the grid
    timers.begin();
    spatial::sync(world, &mut res.grid, &mut res.snapshots);
    timers.end(SystemPhase::SpatialSync);

    // 2. Perception (read-only against the grid)
    timers.begin();
    perception::update(world, &res.perception, &res.grid, &res.snapshots, res.now);
    timers.end(SystemPhase::Perception);

    // 3. Behavior state machines + steering
    timers.begin();
    behavior::update(
        world,
        &res.controller,
        &mut res.events,
        res.elevated_threat,
        dt,
        rng,
    );
    timers.end(SystemPhase::Behavior);

    // 4. Movement integration
    timers.begin();
    movement::integrate(world, dt, res.half_extent);
    timers.end(SystemPhase::Movement);
}
