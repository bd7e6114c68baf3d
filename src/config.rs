use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// When an agent's deposit strength is topped back up to the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositRefresh {
    /// Any visit to a home cell or a food-bearing cell refreshes, before role logic.
    /// Deposits are also skipped while standing on the landmark the role is leaving.
    OnLandmark,
    /// Only delivering food at home refreshes.
    OnTransition,
}

/// What happens at the grid boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Off-grid sensing reads zero, off-grid moves turn the agent around.
    Bounded,
    /// Coordinates wrap on both axes.
    Toroidal,
}

/// Which trail each role follows when steering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteeringPolicy {
    /// Searching agents follow the home trail, carriers follow the food trail.
    OwnTrail,
    /// Searching agents follow the food trail, carriers follow the home trail.
    CrossTrail,
}

/// Food units placed on every cell of a food source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodQuantity {
    /// Uniform integer in `min..=max`.
    Random { min: u32, max: u32 },
    Fixed(u32),
}

/// Landmark center as fractions of the grid half-extents, relative to the grid center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSite {
    pub x: f32,
    pub y: f32,
}

impl LandmarkSite {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    LandmarkRefresh,
    TransitionRefresh,
}

impl Preset {
    pub fn config(self) -> SimConfig {
        match self {
            Preset::LandmarkRefresh => SimConfig::landmark_refresh(),
            Preset::TransitionRefresh => SimConfig::transition_refresh(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("population must be greater than zero")]
    EmptyPopulation,
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("{name} is {value}%, expected 0..=100")]
    RateOutOfRange { name: &'static str, value: u32 },
    #[error("{name} must be a finite, non-negative number, got {value}")]
    InvalidAmount { name: &'static str, value: f32 },
    #[error("{name} is {value} degrees, expected 0..=180")]
    AngleOutOfRange { name: &'static str, value: f32 },
    #[error("steer band [{low}, {high}) is empty")]
    EmptySteerBand { low: f32, high: f32 },
    #[error("food range {min}..={max} is empty or starts at zero")]
    InvalidFoodRange { min: u32, max: u32 },
    #[error("failed to read config {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    pub population: usize,
    pub seed: u64,

    // Pheromone parameters, integer percentages
    pub food_diffusion_rate: u32,
    pub food_evaporation_rate: u32,
    pub home_diffusion_rate: u32,
    pub home_evaporation_rate: u32,

    // Ant behavior parameters
    pub default_deposit_strength: f32,
    pub initial_deposit_strength: f32,
    pub deposit_decrement: f32,
    pub deposit_refresh: DepositRefresh,
    pub home_sensor_angle: f32,
    pub food_sensor_angle: f32,
    pub wiggle_angle: f32,
    /// Trail concentration ahead must fall in `[low, high)` for steering to kick in.
    pub steer_band: (f32, f32),
    pub steering: SteeringPolicy,
    pub edge_policy: EdgePolicy,

    // Landmarks
    pub landmark_radius: f32,
    pub homes: Vec<LandmarkSite>,
    pub food_sources: Vec<LandmarkSite>,
    pub food_per_cell: FoodQuantity,

    /// Ticks between progress log lines, 0 disables them.
    pub log_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::landmark_refresh()
    }
}

impl SimConfig {
    /// Deposit strength refreshes on every landmark visit and drains by 3 per step.
    pub fn landmark_refresh() -> Self {
        Self {
            grid_width: 71,
            grid_height: 71,
            population: 100,
            seed: 1997,

            food_diffusion_rate: 20,
            food_evaporation_rate: 8,
            home_diffusion_rate: 10,
            home_evaporation_rate: 2,

            default_deposit_strength: 100.0,
            initial_deposit_strength: 0.0,
            deposit_decrement: 3.0,
            deposit_refresh: DepositRefresh::OnLandmark,
            home_sensor_angle: 60.0,
            food_sensor_angle: 45.0,
            wiggle_angle: 40.0,
            steer_band: (0.05, 2.0),
            steering: SteeringPolicy::OwnTrail,
            edge_policy: EdgePolicy::Bounded,

            landmark_radius: 3.0,
            homes: vec![LandmarkSite::new(-0.35, 0.2), LandmarkSite::new(0.1, -0.3)],
            food_sources: vec![
                LandmarkSite::new(0.6, -0.1),
                LandmarkSite::new(0.4, -0.9),
                LandmarkSite::new(0.8, 0.85),
                LandmarkSite::new(-0.9, 0.7),
            ],
            food_per_cell: FoodQuantity::Random { min: 1, max: 5 },

            log_interval: 100,
        }
    }

    /// Deposit strength starts full, refreshes only on pickup/delivery and drains by 1 per step.
    pub fn transition_refresh() -> Self {
        let base = Self::landmark_refresh();
        Self {
            initial_deposit_strength: base.default_deposit_strength,
            deposit_decrement: 1.0,
            deposit_refresh: DepositRefresh::OnTransition,
            home_sensor_angle: 35.0,
            food_sensor_angle: 35.0,
            ..base
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }

        for (name, value) in [
            ("food_diffusion_rate", self.food_diffusion_rate),
            ("food_evaporation_rate", self.food_evaporation_rate),
            ("home_diffusion_rate", self.home_diffusion_rate),
            ("home_evaporation_rate", self.home_evaporation_rate),
        ] {
            if value > 100 {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }

        for (name, value) in [
            ("default_deposit_strength", self.default_deposit_strength),
            ("initial_deposit_strength", self.initial_deposit_strength),
            ("deposit_decrement", self.deposit_decrement),
            ("wiggle_angle", self.wiggle_angle),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidAmount { name, value });
            }
        }
        if !self.landmark_radius.is_finite() || self.landmark_radius <= 0.0 {
            return Err(ConfigError::InvalidAmount {
                name: "landmark_radius",
                value: self.landmark_radius,
            });
        }

        for (name, value) in [
            ("home_sensor_angle", self.home_sensor_angle),
            ("food_sensor_angle", self.food_sensor_angle),
        ] {
            if !(0.0..=180.0).contains(&value) {
                return Err(ConfigError::AngleOutOfRange { name, value });
            }
        }

        let (low, high) = self.steer_band;
        if low.is_nan() || high.is_nan() || low >= high {
            return Err(ConfigError::EmptySteerBand { low, high });
        }

        if let FoodQuantity::Random { min, max } = self.food_per_cell {
            if min == 0 || min > max {
                return Err(ConfigError::InvalidFoodRange { min, max });
            }
        }

        Ok(())
    }

    /// Diffusion rates as fractions, the form the fields consume.
    pub fn food_diffusion(&self) -> f32 {
        self.food_diffusion_rate as f32 / 100.0
    }

    pub fn home_diffusion(&self) -> f32 {
        self.home_diffusion_rate as f32 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert!(SimConfig::landmark_refresh().validate().is_ok());
        assert!(SimConfig::transition_refresh().validate().is_ok());
    }

    #[test]
    fn presets_differ_only_in_deposit_and_sensing() {
        let a = SimConfig::landmark_refresh();
        let b = SimConfig::transition_refresh();
        assert_eq!(a.deposit_refresh, DepositRefresh::OnLandmark);
        assert_eq!(b.deposit_refresh, DepositRefresh::OnTransition);
        assert_eq!(a.deposit_decrement, 3.0);
        assert_eq!(b.deposit_decrement, 1.0);
        assert_eq!((a.home_sensor_angle, a.food_sensor_angle), (60.0, 45.0));
        assert_eq!((b.home_sensor_angle, b.food_sensor_angle), (35.0, 35.0));
        assert_eq!(a.food_diffusion_rate, b.food_diffusion_rate);
        assert_eq!(a.homes, b.homes);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = SimConfig::default();
        config.population = 0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPopulation)));

        let mut config = SimConfig::default();
        config.food_evaporation_rate = 101;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RateOutOfRange { name: "food_evaporation_rate", value: 101 })
        ));

        let mut config = SimConfig::default();
        config.default_deposit_strength = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAmount { .. })));

        let mut config = SimConfig::default();
        config.home_sensor_angle = 270.0;
        assert!(matches!(config.validate(), Err(ConfigError::AngleOutOfRange { .. })));

        let mut config = SimConfig::default();
        config.food_per_cell = FoodQuantity::Random { min: 4, max: 2 };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFoodRange { .. })));

        let mut config = SimConfig::default();
        config.grid_height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGrid { .. })));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: SimConfig = toml::from_str(
            r#"
            population = 20
            grid_width = 10
            grid_height = 10
            deposit_refresh = "on_transition"
            food_per_cell = { fixed = 5 }
            "#,
        )
        .unwrap();
        assert_eq!(config.population, 20);
        assert_eq!(config.grid_width, 10);
        assert_eq!(config.deposit_refresh, DepositRefresh::OnTransition);
        assert_eq!(config.food_per_cell, FoodQuantity::Fixed(5));
        assert_eq!(config.food_diffusion_rate, 20);
        assert_eq!(config.homes.len(), 2);
    }
}
