use serde::{Deserialize, Serialize};

/// Where a species sits in the food chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietCategory {
    Herbivore,
    Predator,
    Apex,
}

impl DietCategory {
    /// Hunts other creatures.
    pub fn is_hunter(self) -> bool {
        matches!(self, DietCategory::Predator | DietCategory::Apex)
    }
}

/// How a species reacts to players and to danger in general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temperament {
    Passive,
    Skittish,
    Neutral,
    Territorial,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Triceratops,
    Stegosaurus,
    Parasaurolophus,
    Compsognathus,
    Velociraptor,
    Dilophosaurus,
    TyrannosaurusRex,
    Spinosaurus,
}

/// Static tuning for one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesProfile {
    pub category: DietCategory,
    pub temperament: Temperament,
    /// Multiplier on base sight range.
    pub speed_factor: f64,
    /// Top speed in blocks/second.
    pub max_speed: f64,
    pub max_health: f64,
}

impl Species {
    pub const ALL: [Species; 8] = [
        Self::Triceratops,
        Self::Stegosaurus,
        Self::Parasaurolophus,
        Self::Compsognathus,
        Self::Velociraptor,
        Self::Dilophosaurus,
        Self::TyrannosaurusRex,
        Self::Spinosaurus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Triceratops => "Triceratops",
            Self::Stegosaurus => "Stegosaurus",
            Self::Parasaurolophus => "Parasaurolophus",
            Self::Compsognathus => "Compsognathus",
            Self::Velociraptor => "Velociraptor",
            Self::Dilophosaurus => "Dilophosaurus",
            Self::TyrannosaurusRex => "Tyrannosaurus Rex",
            Self::Spinosaurus => "Spinosaurus",
        }
    }

    pub fn profile(self) -> SpeciesProfile {
        use DietCategory::*;
        use Temperament::*;
        let (category, temperament, speed_factor, max_speed, max_health) = match self {
            Self::Triceratops => (Herbivore, Territorial, 0.9, 6.0, 800.0),
            Self::Stegosaurus => (Herbivore, Neutral, 0.8, 4.5, 700.0),
            Self::Parasaurolophus => (Herbivore, Skittish, 1.1, 9.0, 350.0),
            Self::Compsognathus => (Herbivore, Passive, 1.0, 7.0, 40.0),
            Self::Velociraptor => (Predator, Aggressive, 1.25, 11.0, 180.0),
            Self::Dilophosaurus => (Predator, Territorial, 1.0, 8.0, 220.0),
            Self::TyrannosaurusRex => (Apex, Aggressive, 1.0, 8.5, 1600.0),
            Self::Spinosaurus => (Apex, Territorial, 0.95, 7.5, 1400.0),
        };
        SpeciesProfile {
            category,
            temperament,
            speed_factor,
            max_speed,
            max_health,
        }
    }

    pub fn category(self) -> DietCategory {
        self.profile().category
    }

    pub fn temperament(self) -> Temperament {
        self.profile().temperament
    }
}
