use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;

use antcolony::components::{RunLimit, SnapshotTarget};
use antcolony::config::{Preset, SimConfig};
use antcolony::systems::exit_system;
use antcolony::{ColonyPlugin, ColonyTick};

/// Headless ant colony foraging run.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Parameter preset used when no config file is given
    #[arg(long, value_enum, default_value_t = Preset::LandmarkRefresh)]
    preset: Preset,

    /// TOML config file; keys it omits keep their default values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    population: Option<usize>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Ticks between progress lines, 0 to silence them
    #[arg(long)]
    log_interval: Option<u64>,

    /// Write the final state as JSON to this path
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl Args {
    fn sim_config(&self) -> anyhow::Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => self.preset.config(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(population) = self.population {
            config.population = population;
        }
        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(interval) = self.log_interval {
            config.log_interval = interval;
        }

        config.validate().context("invalid simulation config")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.sim_config()?;

    let exit = App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
        .add_plugins(LogPlugin {
            level: Level::INFO,
            filter: "antcolony=info".into(),
            ..default()
        })
        .add_plugins(ColonyPlugin { config })
        .insert_resource(RunLimit(args.ticks.max(1)))
        .insert_resource(SnapshotTarget(args.snapshot.clone()))
        .add_systems(Update, exit_system.after(ColonyTick))
        .run();

    if let AppExit::Error(code) = exit {
        bail!("simulation exited with code {code}");
    }
    Ok(())
}
