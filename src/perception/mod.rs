pub mod classify;

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::hash::{BuildHasher, Hash};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::creature::Species;
use crate::error::{self, ConfigError};
use crate::spatial::{SpatialEntity, SpatialHashGrid};
use crate::vector::Vector2;

pub use classify::Relationship;

/// Sensory channel through which something was noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerceptionType {
    Sight,
    Sound,
    Scent,
}

/// What an observed entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Creature(Species),
    Player,
}

/// Per-tick state the host hands the core for one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshot<Id> {
    pub id: Id,
    pub position: DVec3,
    pub velocity: Vector2,
    /// Heading in radians, same convention as [`Vector2::angle`].
    pub facing: f64,
    pub kind: EntityKind,
    pub health: f64,
}

impl<Id> EntitySnapshot<Id> {
    /// Position on the (x, z) plane.
    pub fn ground(&self) -> Vector2 {
        Vector2::new(self.position.x, self.position.z)
    }

    pub fn species(&self) -> Option<Species> {
        match self.kind {
            EntityKind::Creature(species) => Some(species),
            EntityKind::Player => None,
        }
    }
}

impl<Id: Copy + Eq + Hash> SpatialEntity for EntitySnapshot<Id> {
    type Id = Id;

    fn id(&self) -> Id {
        self.id
    }

    fn position(&self) -> DVec3 {
        self.position
    }
}

/// Resolves ids returned by the grid to full snapshots.
pub trait EntityLookup<Id> {
    fn snapshot(&self, id: Id) -> Option<&EntitySnapshot<Id>>;
}

impl<Id: Eq + Hash, S: BuildHasher> EntityLookup<Id> for HashMap<Id, EntitySnapshot<Id>, S> {
    fn snapshot(&self, id: Id) -> Option<&EntitySnapshot<Id>> {
        self.get(&id)
    }
}

/// Immutable record of one entity noticed this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceivedEntity<Id> {
    pub id: Id,
    pub position: Vector2,
    pub velocity: Vector2,
    pub distance: f64,
    pub perception_type: PerceptionType,
    /// In [0, 1].
    pub threat_level: f64,
    pub last_seen_time: f64,
}

/// Classified view of the world for one agent and one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionData<Id> {
    threats: Vec<PerceivedEntity<Id>>,
    allies: Vec<PerceivedEntity<Id>>,
    prey: Vec<PerceivedEntity<Id>>,
    neutrals: Vec<PerceivedEntity<Id>>,
    target: Option<(PerceivedEntity<Id>, Relationship)>,
}

impl<Id> Default for PerceptionData<Id> {
    fn default() -> Self {
        Self {
            threats: Vec::new(),
            allies: Vec::new(),
            prey: Vec::new(),
            neutrals: Vec::new(),
            target: None,
        }
    }
}

impl<Id: Copy> PerceptionData<Id> {
    pub fn threats(&self) -> &[PerceivedEntity<Id>] {
        &self.threats
    }

    pub fn allies(&self) -> &[PerceivedEntity<Id>] {
        &self.allies
    }

    pub fn prey(&self) -> &[PerceivedEntity<Id>] {
        &self.prey
    }

    pub fn neutrals(&self) -> &[PerceivedEntity<Id>] {
        &self.neutrals
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&PerceivedEntity<Id>> {
        self.target.as_ref().map(|(entity, _)| entity)
    }

    /// Which bucket the target was picked from (prey or threat).
    pub fn target_relationship(&self) -> Option<Relationship> {
        self.target.as_ref().map(|(_, rel)| *rel)
    }

    pub fn nearest_threat(&self) -> Option<&PerceivedEntity<Id>> {
        nearest(&self.threats)
    }

    pub fn highest_threat(&self) -> Option<&PerceivedEntity<Id>> {
        let mut best: Option<&PerceivedEntity<Id>> = None;
        for e in &self.threats {
            if best.map_or(true, |b| e.threat_level > b.threat_level) {
                best = Some(e);
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.threats.len() + self.allies.len() + self.prey.len() + self.neutrals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every perceived entity with its bucket.
    pub fn iter(&self) -> impl Iterator<Item = (Relationship, &PerceivedEntity<Id>)> {
        self.threats
            .iter()
            .map(|e| (Relationship::Threat, e))
            .chain(self.allies.iter().map(|e| (Relationship::Ally, e)))
            .chain(self.prey.iter().map(|e| (Relationship::Prey, e)))
            .chain(self.neutrals.iter().map(|e| (Relationship::Neutral, e)))
    }

    fn push(&mut self, relationship: Relationship, entity: PerceivedEntity<Id>) {
        match relationship {
            Relationship::Threat => self.threats.push(entity),
            Relationship::Ally => self.allies.push(entity),
            Relationship::Prey => self.prey.push(entity),
            Relationship::Neutral => self.neutrals.push(entity),
        }
    }
}

/// Strictly nearest; earlier entries win ties.
fn nearest<Id>(entities: &[PerceivedEntity<Id>]) -> Option<&PerceivedEntity<Id>> {
    let mut best: Option<&PerceivedEntity<Id>> = None;
    for e in entities {
        if best.map_or(true, |b| e.distance < b.distance) {
            best = Some(e);
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Sight range before the per-species speed factor.
    pub base_sight_range: f64,
    pub hearing_range: f64,
    pub scent_range: f64,
    /// Full cone width, in degrees.
    pub fov_degrees: f64,
    /// Players closer than this count as threats to territorial creatures.
    pub territorial_radius: f64,
    pub baseline_threat: f64,
    pub apex_threat_level: f64,
    pub player_threat_level: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            base_sight_range: 48.0,
            hearing_range: 24.0,
            scent_range: 32.0,
            fov_degrees: 120.0,
            territorial_radius: 12.0,
            baseline_threat: 0.1,
            apex_threat_level: 0.8,
            player_threat_level: 0.5,
        }
    }
}

impl PerceptionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::ensure_non_negative("perception.base_sight_range", self.base_sight_range)?;
        error::ensure_non_negative("perception.hearing_range", self.hearing_range)?;
        error::ensure_non_negative("perception.scent_range", self.scent_range)?;
        error::ensure_positive("perception.fov_degrees", self.fov_degrees)?;
        if self.fov_degrees > 360.0 {
            return Err(ConfigError::invalid(
                "perception.fov_degrees",
                "must not exceed 360",
            ));
        }
        error::ensure_non_negative("perception.territorial_radius", self.territorial_radius)?;
        error::ensure_unit("perception.baseline_threat", self.baseline_threat)?;
        error::ensure_unit("perception.apex_threat_level", self.apex_threat_level)?;
        error::ensure_unit("perception.player_threat_level", self.player_threat_level)?;
        Ok(())
    }
}

/// Builds a classified [`PerceptionData`] for an agent from the grid.
///
/// Read-only against the grid; safe to call for many agents once all
/// position updates for the tick are committed.
#[derive(Debug, Clone)]
pub struct PerceptionSystem {
    config: PerceptionConfig,
    half_fov: f64,
}

impl PerceptionSystem {
    pub fn new(config: PerceptionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            half_fov: config.fov_degrees.to_radians() * 0.5,
            config,
        })
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn sight_range(&self, species: Species) -> f64 {
        self.config.base_sight_range * species.profile().speed_factor
    }

    /// Everything `agent` notices this tick.
    ///
    /// Players don't perceive; their data is always empty. Grid entries
    /// without a snapshot are skipped.
    pub fn perceive<Id, L>(
        &self,
        agent: &EntitySnapshot<Id>,
        grid: &SpatialHashGrid<Id>,
        lookup: &L,
        now: f64,
    ) -> PerceptionData<Id>
    where
        Id: Copy + Eq + Hash,
        L: EntityLookup<Id> + ?Sized,
    {
        let mut data = PerceptionData::default();
        let Some(species) = agent.species() else {
            return data;
        };

        let sight_range = self.sight_range(species);
        let max_range = sight_range
            .max(self.config.hearing_range)
            .max(self.config.scent_range);
        let origin = agent.ground();

        grid.visit_radius(origin.x, origin.z, max_range, |neighbor| {
            if neighbor.id == agent.id {
                return;
            }
            let Some(other) = lookup.snapshot(neighbor.id) else {
                return;
            };

            let to_other = neighbor.position - origin;
            let Some(perception_type) = self.sense(agent.facing, to_other, neighbor.distance, sight_range) else {
                return;
            };

            let relationship = classify::classify(species, other.kind, neighbor.distance, &self.config);
            let threat_level = classify::threat_level(
                species,
                agent.health,
                other.kind,
                other.health,
                relationship,
                &self.config,
            );

            data.push(
                relationship,
                PerceivedEntity {
                    id: neighbor.id,
                    position: neighbor.position,
                    velocity: other.velocity,
                    distance: neighbor.distance,
                    perception_type,
                    threat_level,
                    last_seen_time: now,
                },
            );
        });

        data.target = select_target(species, &data);
        data
    }

    /// Which sense picks up something at `offset`. Sight wins over sound and scent.
    fn sense(&self, facing: f64, offset: Vector2, distance: f64, sight_range: f64) -> Option<PerceptionType> {
        if distance <= sight_range && in_field_of_view(facing, offset, self.half_fov) {
            Some(PerceptionType::Sight)
        } else if distance <= self.config.hearing_range {
            Some(PerceptionType::Sound)
        } else if distance <= self.config.scent_range {
            Some(PerceptionType::Scent)
        } else {
            None
        }
    }
}

/// Hunters lock onto the nearest prey; anyone falls back to the nearest threat.
///
/// Recomputed from scratch every tick, no hysteresis.
fn select_target<Id: Copy>(species: Species, data: &PerceptionData<Id>) -> Option<(PerceivedEntity<Id>, Relationship)> {
    if species.category().is_hunter() {
        if let Some(prey) = nearest(&data.prey) {
            return Some((*prey, Relationship::Prey));
        }
    }
    nearest(&data.threats).map(|threat| (*threat, Relationship::Threat))
}

/// True when `offset` lies within `half_fov` radians of `facing`.
/// A zero offset is always in view.
pub fn in_field_of_view(facing: f64, offset: Vector2, half_fov: f64) -> bool {
    if offset.is_zero() {
        return true;
    }
    wrap_angle(offset.angle() - facing).abs() <= half_fov
}

/// Normalize to (-π, π].
pub fn wrap_angle(radians: f64) -> f64 {
    let mut a = radians % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}
