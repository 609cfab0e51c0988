use instant::Instant;

use crate::behavior::{AgentState, BehaviorController, ExternalEvent};
use crate::config::SimConfig;
use crate::creature;
use crate::debug::ring::RingBuffer;
use crate::debug::timer::SystemTimers;
use crate::ecs::components::{Creature, Mind};
use crate::ecs::events::{EventBus, SimEvent};
use crate::ecs::systems::{self, spatial, SimResources};
use crate::error::ConfigError;
use crate::perception::PerceptionSystem;
use crate::spatial::SpatialHashGrid;

/// Number of tick durations kept for the stats window.
const TICK_HISTORY_LEN: usize = 256;

// ---------------------------------------------------------------------------
// Tick timing
// ---------------------------------------------------------------------------

struct TickStats {
    tick_count: u64,
    tick_times: RingBuffer<f64>,
    /// Simulated seconds since the last stats line.
    since_log: f64,
}

impl TickStats {
    fn new() -> Self {
        Self {
            tick_count: 0,
            tick_times: RingBuffer::new(TICK_HISTORY_LEN),
            since_log: 0.0,
        }
    }

    /// Returns true when a stats line is due.
    fn record_tick(&mut self, wall_secs: f64, dt: f64, interval: f64) -> bool {
        self.tick_count += 1;
        self.tick_times.push(wall_secs);
        self.since_log += dt;
        if self.since_log >= interval {
            self.since_log = 0.0;
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Headless simulation: a world of creatures and players stepped at a fixed rate.
pub struct App {
    config: SimConfig,
    world: hecs::World,
    res: SimResources,
    rng: fastrand::Rng,
    timers: SystemTimers,
    stats: TickStats,
}

impl App {
    /// Validate `config` and populate the world.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let res = SimResources {
            grid: SpatialHashGrid::new(config.grid)?,
            snapshots: Default::default(),
            perception: PerceptionSystem::new(config.perception)?,
            controller: BehaviorController::new(config.behavior, config.steering)?,
            events: EventBus::new(),
            elevated_threat: false,
            half_extent: config.world.half_extent,
            now: 0.0,
        };

        let mut rng = fastrand::Rng::with_seed(seed);
        let mut world = hecs::World::new();
        let world_cfg = config.world;
        creature::spawn_creatures(&mut world, world_cfg.creatures, world_cfg.half_extent, &mut rng);
        creature::spawn_players(
            &mut world,
            world_cfg.players,
            world_cfg.half_extent,
            world_cfg.player_speed,
            &mut rng,
        );
        log::info!(
            "Spawned {} creatures and {} players (seed {seed})",
            world_cfg.creatures,
            world_cfg.players
        );

        Ok(Self {
            config,
            world,
            res,
            rng,
            timers: SystemTimers::new(),
            stats: TickStats::new(),
        })
    }

    /// Advance one fixed tick.
    pub fn step(&mut self) {
        let dt = self.config.world.dt();
        let started = Instant::now();
        systems::tick(&mut self.world, &mut self.res, dt, &mut self.rng, &mut self.timers);
        let wall = started.elapsed().as_secs_f64();

        if self
            .stats
            .record_tick(wall, dt, self.config.world.stats_interval)
        {
            self.log_stats();
        }
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
        log::info!(
            "Finished {} ticks ({:.1}s simulated)",
            self.stats.tick_count,
            self.res.now
        );
    }

    fn log_stats(&self) {
        let Some((min, avg, max)) = self.stats.tick_times.stats() else {
            return;
        };
        let census = self
            .census()
            .into_iter()
            .filter(|&(_, n)| n > 0)
            .map(|(state, n)| format!("{} {n}", state.label()))
            .collect::<Vec<_>>()
            .join(", ");
        log::info!(
            "t={:.0}s | tick avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | {} | {}",
            self.res.now,
            avg * 1000.0,
            min * 1000.0,
            max * 1000.0,
            self.timers.summary(),
            census,
        );
    }

    /// Number of creatures in each behavior state.
    pub fn census(&self) -> Vec<(AgentState, usize)> {
        let mut counts = [0usize; AgentState::ALL.len()];
        for (_, mind) in self.world.query::<&Mind>().iter() {
            counts[mind.0.state() as usize] += 1;
        }
        AgentState::ALL.into_iter().zip(counts).collect()
    }

    /// Raise or clear the world-wide alarm (e.g. an escaped apex predator).
    pub fn set_elevated_threat(&mut self, elevated: bool) {
        if self.res.elevated_threat != elevated {
            log::info!("Elevated threat {}", if elevated { "raised" } else { "cleared" });
        }
        self.res.elevated_threat = elevated;
    }

    /// Forward a host-side outcome to a creature's controller.
    /// Returns whether its state changed.
    pub fn apply_external(&mut self, entity: hecs::Entity, event: ExternalEvent) -> bool {
        let Ok((creature, mind)) = self.world.query_one_mut::<(&Creature, &mut Mind)>(entity) else {
            return false;
        };
        let from = mind.0.state();
        if !self.res.controller.apply_external(&mut mind.0, event) {
            return false;
        }
        let changed = SimEvent::StateChanged {
            entity,
            species: creature.species,
            from,
            to: mind.0.state(),
            animation: mind.0.animation(),
        };
        self.res.events.dispatch(&changed);
        true
    }

    /// Remove an entity from the world and the grid.
    pub fn despawn(&mut self, entity: hecs::Entity) -> bool {
        let removed = spatial::despawn(
            &mut self.world,
            &mut self.res.grid,
            &mut self.res.snapshots,
            entity,
        );
        if removed {
            self.res.events.dispatch(&SimEvent::Despawned { entity });
        }
        removed
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.res.events
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    pub fn grid(&self) -> &SpatialHashGrid<hecs::Entity> {
        &self.res.grid
    }

    pub fn tick_count(&self) -> u64 {
        self.stats.tick_count
    }

    /// Simulated seconds elapsed.
    pub fn now(&self) -> f64 {
        self.res.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Position;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn small_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.world.half_extent = 64.0;
        config.world.creatures = 60;
        config.world.players = 2;
        config
    }

    #[test]
    fn runs_and_stays_in_bounds() {
        let mut app = App::new(small_config(), 7).unwrap();
        app.run(300);
        assert_eq!(app.tick_count(), 300);
        assert!((app.now() - 15.0).abs() < 1e-6);
        assert_eq!(app.grid().len(), 62);
        for (_, pos) in app.world().query::<&Position>().iter() {
            assert!(pos.0.x.abs() <= 64.0 && pos.0.z.abs() <= 64.0);
        }
        let total: usize = app.census().iter().map(|(_, n)| n).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn same_seed_same_outcome() {
        let positions = |seed| {
            let mut app = App::new(small_config(), seed).unwrap();
            app.run(100);
            let mut out: Vec<(f64, f64)> = app
                .world()
                .query::<&Position>()
                .iter()
                .map(|(_, p)| (p.0.x, p.0.z))
                .collect();
            out.sort_by(|a, b| a.partial_cmp(b).unwrap());
            out
        };
        assert_eq!(positions(3), positions(3));
    }

    #[test]
    fn external_events_reach_listeners() {
        let mut app = App::new(small_config(), 11).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        app.events_mut().subscribe("test", move |event| sink.borrow_mut().push(*event));

        let entity = app
            .world()
            .query::<&Creature>()
            .iter()
            .map(|(e, _)| e)
            .next()
            .unwrap();
        assert!(app.apply_external(entity, ExternalEvent::Captured));
        assert!(!app.apply_external(entity, ExternalEvent::Revived));

        app.run(50);
        let mind = app.world().get::<&Mind>(entity).unwrap().0;
        assert_eq!(mind.state(), AgentState::Captured);

        assert!(app.despawn(entity));
        assert!(!app.grid().contains(entity));
        assert!(!app.despawn(entity));

        let seen = seen.borrow();
        assert!(seen.iter().any(|e| matches!(
            e,
            SimEvent::StateChanged { entity: who, to: AgentState::Captured, .. } if *who == entity
        )));
        assert!(matches!(seen.last(), Some(SimEvent::Despawned { .. })));
    }

    #[test]
    fn grid_follows_direct_world_despawns() {
        let mut config = small_config();
        config.world.creatures = 10;
        config.world.players = 0;
        let mut app = App::new(config, 13).unwrap();
        app.run(2);
        assert_eq!(app.grid().len(), 10);

        let herd: Vec<hecs::Entity> = app.world().iter().map(|e| e.entity()).collect();
        for e in herd {
            app.world_mut().despawn(e).unwrap();
        }
        app.run(20);
        assert_eq!(app.world().len(), 0);
        assert!(app.grid().is_empty());
    }

    #[test]
    fn bad_config_is_rejected() {
        let mut config = small_config();
        config.grid.cell_size = 0.0;
        assert!(App::new(config, 1).is_err());
    }
}
