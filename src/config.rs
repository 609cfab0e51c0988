use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorConfig;
use crate::error::{self, ConfigError};
use crate::perception::PerceptionConfig;
use crate::spatial::GridConfig;
use crate::steering::SteeringConfig;

/// Size and population of the headless world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Creatures and players stay inside `[-half_extent, half_extent]²`.
    pub half_extent: f64,
    pub creatures: usize,
    pub players: usize,
    pub player_speed: f64,
    /// Fixed simulation rate in ticks per second.
    pub tick_rate: f64,
    /// Seconds of simulated time between stats lines.
    pub stats_interval: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            half_extent: 256.0,
            creatures: 200,
            players: 4,
            player_speed: 4.0,
            tick_rate: 20.0,
            stats_interval: 5.0,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::ensure_positive("world.half_extent", self.half_extent)?;
        error::ensure_positive("world.tick_rate", self.tick_rate)?;
        error::ensure_positive("world.stats_interval", self.stats_interval)?;
        error::ensure_non_negative("world.player_speed", self.player_speed)
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate
    }
}

/// Everything the simulation can be tuned with. Missing JSON keys fall back
/// to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub perception: PerceptionConfig,
    pub steering: SteeringConfig,
    pub behavior: BehaviorConfig,
    pub world: WorldConfig,
}

impl SimConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.perception.validate()?;
        self.steering.validate()?;
        self.behavior.validate()?;
        self.world.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimConfig::from_json(
            r#"{ "world": { "creatures": 12 }, "perception": { "fov_degrees": 90.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.world.creatures, 12);
        assert_eq!(config.world.half_extent, WorldConfig::default().half_extent);
        assert_eq!(config.perception.fov_degrees, 90.0);
        assert_eq!(config.grid, GridConfig::default());
    }

    #[test]
    fn dump_parses_back() {
        let config = SimConfig::default();
        let text = config.to_json_pretty().unwrap();
        assert_eq!(SimConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SimConfig::from_json(r#"{ "world": { "tick_rate": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "world.tick_rate",
                ..
            }
        ));
        let err = SimConfig::from_json(r#"{ "grid": { "cell_size": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SimConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.json"));
    }
}
