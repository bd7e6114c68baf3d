//! Grid-based ant foraging: agents relay food from scattered sources back to
//! home sites, steering by two diffusing, evaporating pheromone trails.

pub mod ant;
pub mod components;
pub mod config;
pub mod environment;
pub mod pheromones;
pub mod simulation;
pub mod snapshot;
pub mod systems;

pub use ant::{Agent, Role, StepOutcome};
pub use components::{ForagingStats, SimRng, TickCounter};
pub use config::{ConfigError, DepositRefresh, EdgePolicy, FoodQuantity, LandmarkSite, Preset, SimConfig, SteeringPolicy};
pub use environment::{Cell, Environment};
pub use pheromones::{Field, PheromoneType};
pub use simulation::{ColonyPlugin, ColonyTick, Simulation};
pub use snapshot::{ColonySnapshot, SnapshotError};
