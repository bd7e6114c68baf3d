use bevy::prelude::*;
use rand::Rng;

use crate::ant::{Agent, Role, StepOutcome};
use crate::components::*;
use crate::config::*;
use crate::environment::Environment;
use crate::snapshot::ColonySnapshot;

/// Spawns the whole population at the grid center, one activation tick apart.
pub fn spawn_agents(world: &mut World) {
    let (population, initial_strength) = {
        let config = world.resource::<SimConfig>();
        (config.population, config.initial_deposit_strength)
    };
    let center = world.resource::<Environment>().center();

    let agents: Vec<Agent> = {
        let mut rng = world.resource_mut::<SimRng>();
        (0..population)
            .map(|i| Agent::new(center, rng.0.gen_range(0.0..360.0), initial_strength, i as u64))
            .collect()
    };
    world.spawn_batch(agents);

    info!("Spawned {} agents at ({:.1}, {:.1})", population, center.x, center.y);
}

/// Runs every agent's step in creation order against the current tick.
pub fn agent_step_system(
    mut agents: Query<&mut Agent>,
    mut environment: ResMut<Environment>,
    mut rng: ResMut<SimRng>,
    mut stats: ResMut<ForagingStats>,
    config: Res<SimConfig>,
    tick: Res<TickCounter>,
) {
    let mut ordered: Vec<Mut<Agent>> = agents.iter_mut().collect();
    ordered.sort_by_key(|agent| agent.activation_tick);

    let mut active = 0;
    for mut agent in ordered {
        match agent.step(&mut environment, &config, &mut rng, tick.0) {
            StepOutcome::Idle => continue,
            StepOutcome::PickedUp => stats.food_picked_up += 1,
            StepOutcome::Delivered { .. } => stats.food_delivered += 1,
            StepOutcome::Moved | StepOutcome::Reversed => {}
        }
        active += 1;
    }

    stats.active_agents = active;
    stats.carrying_agents = agents.iter().filter(|a| a.role == Role::Carrying).count();
}

/// Diffuses and evaporates both trails once all agents have moved.
pub fn field_update_system(mut environment: ResMut<Environment>, config: Res<SimConfig>) {
    environment.tick_fields(
        config.food_diffusion(),
        config.food_evaporation_rate,
        config.home_diffusion(),
        config.home_evaporation_rate,
    );
}

pub fn tick_advance_system(mut tick: ResMut<TickCounter>) {
    tick.0 += 1;
}

pub fn progress_report_system(
    tick: Res<TickCounter>,
    stats: Res<ForagingStats>,
    environment: Res<Environment>,
    config: Res<SimConfig>,
) {
    if config.log_interval == 0 || tick.0 % config.log_interval != 0 {
        return;
    }
    info!(
        "tick {}: {} active, {} carrying, {} picked up, {} delivered, {} food left",
        tick.0,
        stats.active_agents,
        stats.carrying_agents,
        stats.food_picked_up,
        stats.food_delivered,
        environment.total_food()
    );
}

/// Ends a headless run once the tick limit is reached, exporting the final state if asked.
pub fn exit_system(
    tick: Res<TickCounter>,
    limit: Res<RunLimit>,
    stats: Res<ForagingStats>,
    target: Res<SnapshotTarget>,
    environment: Res<Environment>,
    agents: Query<&Agent>,
    mut exit: EventWriter<AppExit>,
) {
    if tick.0 < limit.0 {
        return;
    }

    info!(
        "Run finished after {} ticks: {} picked up, {} delivered",
        tick.0, stats.food_picked_up, stats.food_delivered
    );

    if let Some(path) = &target.0 {
        let mut ordered: Vec<&Agent> = agents.iter().collect();
        ordered.sort_by_key(|agent| agent.activation_tick);
        let snapshot = ColonySnapshot::capture(tick.0, &environment, ordered);
        match snapshot.write_json(path) {
            Ok(()) => info!("Snapshot written to {}", path.display()),
            Err(err) => {
                error!("Snapshot export failed: {err}");
                exit.send(AppExit::error());
                return;
            }
        }
    }

    exit.send(AppExit::Success);
}
