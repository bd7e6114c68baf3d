use bevy::prelude::*;

use crate::ant::Agent;
use crate::components::*;
use crate::config::{ConfigError, SimConfig};
use crate::environment::Environment;
use crate::snapshot::ColonySnapshot;
use crate::systems::*;

/// Installs the colony resources, spawns the agents and registers the tick chain.
pub struct ColonyPlugin {
    pub config: SimConfig,
}

impl Plugin for ColonyPlugin {
    fn build(&self, app: &mut App) {
        let mut rng = SimRng::seeded(self.config.seed);
        let environment = Environment::from_config(&self.config, &mut rng);

        app.insert_resource(self.config.clone())
            .insert_resource(environment)
            .insert_resource(rng)
            .init_resource::<TickCounter>()
            .init_resource::<ForagingStats>()
            .add_systems(
                Update,
                (
                    agent_step_system,
                    field_update_system,
                    tick_advance_system,
                    progress_report_system,
                )
                    .chain()
                    .in_set(ColonyTick),
            );

        spawn_agents(app.world_mut());
    }
}

/// The per-tick chain, for ordering anything that must run after a full tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColonyTick;

/// Drives a colony in-process, one `App::update` per tick.
pub struct Simulation {
    app: App,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut app = App::new();
        app.add_plugins(ColonyPlugin { config });
        app.finish();
        app.cleanup();

        Ok(Self { app })
    }

    pub fn tick(&mut self) {
        self.app.update();
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Number of ticks completed so far.
    pub fn current_tick(&self) -> u64 {
        self.app.world().resource::<TickCounter>().0
    }

    pub fn environment(&self) -> &Environment {
        self.app.world().resource::<Environment>()
    }

    pub fn stats(&self) -> &ForagingStats {
        self.app.world().resource::<ForagingStats>()
    }

    /// Agents in creation order.
    pub fn agents(&mut self) -> Vec<Agent> {
        let world = self.app.world_mut();
        let mut agents: Vec<Agent> = world.query::<&Agent>().iter(world).cloned().collect();
        agents.sort_by_key(|agent| agent.activation_tick);
        agents
    }

    pub fn snapshot(&mut self) -> ColonySnapshot {
        let agents = self.agents();
        ColonySnapshot::capture(self.current_tick(), self.environment(), agents.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ant::Role;

    #[test]
    fn rejects_invalid_config() {
        let config = SimConfig {
            population: 0,
            ..SimConfig::default()
        };
        assert!(matches!(Simulation::new(config), Err(ConfigError::EmptyPopulation)));
    }

    #[test]
    fn setup_creates_population_in_order() {
        let config = SimConfig {
            population: 12,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        let agents = sim.agents();

        assert_eq!(sim.current_tick(), 0);
        assert_eq!(agents.len(), 12);
        for (i, agent) in agents.iter().enumerate() {
            assert_eq!(agent.activation_tick, i as u64);
            assert_eq!(agent.role, Role::Searching);
            assert_eq!(agent.position, sim.environment().center());
            assert_eq!(agent.deposit_strength, 0.0);
        }
    }

    #[test]
    fn agents_launch_one_per_tick() {
        let config = SimConfig {
            population: 10,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        let center = sim.environment().center();

        for tick in 0..5u64 {
            sim.tick();
            assert_eq!(sim.stats().active_agents, tick as usize + 1);
            let agents = sim.agents();
            for agent in agents.iter().filter(|a| a.activation_tick > tick) {
                assert_eq!(agent.position, center);
            }
        }
        assert_eq!(sim.current_tick(), 5);
    }

    #[test]
    fn same_seed_same_run() {
        let config = SimConfig {
            population: 30,
            seed: 11,
            ..SimConfig::transition_refresh()
        };
        let mut a = Simulation::new(config.clone()).unwrap();
        let mut b = Simulation::new(config).unwrap();
        a.run(60);
        b.run(60);
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
