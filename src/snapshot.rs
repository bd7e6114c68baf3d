use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;

use crate::ant::{Agent, Role};
use crate::environment::Environment;
use crate::pheromones::PheromoneType;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to write snapshot")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize snapshot")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub food_trail: f32,
    pub home_trail: f32,
    pub food_count: u32,
    pub is_home: bool,
    pub source_id: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub position: [f32; 2],
    pub heading: f32,
    pub role: Role,
}

/// Read-only view of one tick, row-major cells and agents in creation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColonySnapshot {
    pub tick: u64,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellSnapshot>,
    pub agents: Vec<AgentSnapshot>,
}

impl ColonySnapshot {
    pub fn capture<'a>(tick: u64, env: &Environment, agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let food = env.trail(PheromoneType::Food).values();
        let home = env.trail(PheromoneType::Home).values();
        let cells = env
            .cells()
            .iter()
            .enumerate()
            .map(|(i, cell)| CellSnapshot {
                food_trail: food[i],
                home_trail: home[i],
                food_count: cell.food_count,
                is_home: cell.is_home,
                source_id: cell.source_id,
            })
            .collect();
        let agents = agents
            .into_iter()
            .map(|agent| AgentSnapshot {
                position: agent.position.to_array(),
                heading: agent.heading,
                role: agent.role,
            })
            .collect();

        Self {
            tick,
            width: env.width(),
            height: env.height(),
            cells,
            agents,
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> &CellSnapshot {
        &self.cells[y * self.width + x]
    }

    /// Writes the snapshot as pretty JSON, stamped with the export time.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        #[derive(Serialize)]
        struct Export<'a> {
            generated_at: String,
            #[serde(flatten)]
            snapshot: &'a ColonySnapshot,
        }

        let writer = BufWriter::new(File::create(path)?);
        let export = Export {
            generated_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            snapshot: self,
        };
        serde_json::to_writer_pretty(writer, &export)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgePolicy;
    use bevy::math::Vec2;

    #[test]
    fn capture_mirrors_environment_and_agents() {
        let mut env = Environment::new(3, 2, EdgePolicy::Bounded);
        env.deposit(4, PheromoneType::Food, 2.5);
        env.deposit(1, PheromoneType::Home, 0.5);
        env.cell_mut(0).is_home = true;
        env.cell_mut(5).food_count = 4;
        env.cell_mut(5).source_id = Some(2);

        let agents = [Agent::new(Vec2::new(1.2, 0.4), 45.0, 0.0, 0)];
        let snapshot = ColonySnapshot::capture(12, &env, agents.iter());

        assert_eq!(snapshot.tick, 12);
        assert_eq!(snapshot.cells.len(), 6);
        assert_eq!(snapshot.cell(1, 1).food_trail, 2.5);
        assert_eq!(snapshot.cell(1, 0).home_trail, 0.5);
        assert!(snapshot.cell(0, 0).is_home);
        assert_eq!(snapshot.cell(2, 1).food_count, 4);
        assert_eq!(snapshot.cell(2, 1).source_id, Some(2));
        assert_eq!(snapshot.agents[0].position, [1.2, 0.4]);
        assert_eq!(snapshot.agents[0].role, Role::Searching);
    }

    #[test]
    fn json_export_carries_timestamp_and_roles() {
        let env = Environment::new(2, 2, EdgePolicy::Bounded);
        let agents = [Agent::new(Vec2::new(1.0, 1.0), 0.0, 0.0, 0)];
        let snapshot = ColonySnapshot::capture(3, &env, agents.iter());

        let path = std::env::temp_dir().join(format!("antcolony-snapshot-{}.json", std::process::id()));
        snapshot.write_json(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["tick"], 3);
        assert_eq!(value["agents"][0]["role"], "searching");
        assert_eq!(value["cells"].as_array().map(|c| c.len()), Some(4));
    }
}
