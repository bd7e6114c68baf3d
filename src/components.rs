use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// The single random source every draw in the simulation goes through.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Index of the tick currently being simulated.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter(pub u64);

#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct ForagingStats {
    pub food_picked_up: u64,
    pub food_delivered: u64,
    pub active_agents: usize,
    pub carrying_agents: usize,
}

/// Headless runs stop after this many ticks.
#[derive(Resource, Debug, Clone, Copy)]
pub struct RunLimit(pub u64);

/// Where the final snapshot is written, if anywhere.
#[derive(Resource, Debug, Clone, Default)]
pub struct SnapshotTarget(pub Option<PathBuf>);
