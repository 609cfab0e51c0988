//! Relationship and threat rule tables.
//!
//! Pure functions of (observer species, observed kind, distance); no state.

use crate::creature::{DietCategory, Species, Temperament};

use super::{EntityKind, PerceptionConfig};

/// Bucket a perceived entity lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    Ally,
    Threat,
    Prey,
    Neutral,
}

/// Decide which bucket `other` belongs to from `observer`'s point of view.
pub fn classify(observer: Species, other: EntityKind, distance: f64, config: &PerceptionConfig) -> Relationship {
    match other {
        // Same species short-circuits every other rule.
        EntityKind::Creature(species) if species == observer => Relationship::Ally,
        EntityKind::Creature(species) => classify_creature(observer.category(), species.category()),
        EntityKind::Player => classify_player(observer.temperament(), distance, config.territorial_radius),
    }
}

/// Food-chain rules between two different species.
pub fn classify_creature(observer: DietCategory, other: DietCategory) -> Relationship {
    use DietCategory::*;
    match (observer, other) {
        (Herbivore, Predator | Apex) => Relationship::Threat,
        (Predator | Apex, Herbivore) => Relationship::Prey,
        (Predator, Apex) => Relationship::Threat,
        _ => Relationship::Neutral,
    }
}

/// Temperament rules for players.
///
/// Passive and skittish creatures land in the threat bucket exactly like
/// aggressive ones. Behavior code keys flight off temperament, so they
/// still run rather than fight.
pub fn classify_player(temperament: Temperament, distance: f64, territorial_radius: f64) -> Relationship {
    match temperament {
        Temperament::Territorial => {
            if distance <= territorial_radius {
                Relationship::Threat
            } else {
                Relationship::Neutral
            }
        }
        Temperament::Neutral => Relationship::Neutral,
        Temperament::Passive | Temperament::Skittish | Temperament::Aggressive => Relationship::Threat,
    }
}

/// Scalar danger in [0, 1] of `other` as judged by `observer`.
pub fn threat_level(
    observer: Species,
    observer_health: f64,
    other: EntityKind,
    other_health: f64,
    relationship: Relationship,
    config: &PerceptionConfig,
) -> f64 {
    let level = match other {
        EntityKind::Creature(species) if species == observer => 0.0,
        EntityKind::Creature(species) => {
            match (observer.category(), species.category()) {
                (DietCategory::Herbivore, DietCategory::Predator | DietCategory::Apex) => {
                    let relative = other_health.max(0.0) / observer_health.max(1.0);
                    0.3 + 0.5 * relative
                }
                (DietCategory::Predator, DietCategory::Apex) => config.apex_threat_level,
                _ => config.baseline_threat,
            }
        }
        EntityKind::Player if relationship == Relationship::Threat => config.player_threat_level,
        EntityKind::Player => config.baseline_threat,
    };
    level.clamp(0.0, 1.0)
}
