use bevy::prelude::*;
use rand::Rng;
use serde::Serialize;

use crate::components::SimRng;
use crate::config::{DepositRefresh, SimConfig, SteeringPolicy};
use crate::environment::Environment;
use crate::pheromones::PheromoneType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Not holding food.
    Searching,
    /// Holding one food unit.
    Carrying,
}

/// What an agent's step amounted to, for bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not yet activated.
    Idle,
    /// Took one food unit; no movement this tick.
    PickedUp,
    /// Dropped food on a home cell, then moved or reversed.
    Delivered { moved: bool },
    Moved,
    /// Blocked by the edge and turned around in place.
    Reversed,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Vec2,
    /// Degrees clockwise from north, kept in `[0, 360)`.
    pub heading: f32,
    pub role: Role,
    pub deposit_strength: f32,
    pub activation_tick: u64,
}

impl Agent {
    pub fn new(position: Vec2, heading: f32, deposit_strength: f32, activation_tick: u64) -> Self {
        Self {
            position,
            heading: normalize_heading(heading),
            role: Role::Searching,
            deposit_strength: deposit_strength.max(0.0),
            activation_tick,
        }
    }

    pub fn is_active(&self, tick: u64) -> bool {
        tick >= self.activation_tick
    }

    pub fn turn(&mut self, degrees: f32) {
        self.heading = normalize_heading(self.heading + degrees);
    }

    pub fn reverse(&mut self) {
        self.turn(180.0);
    }

    /// One tick of behavior: landmark refresh, role logic, wiggle, move.
    pub fn step(&mut self, env: &mut Environment, config: &SimConfig, rng: &mut SimRng, tick: u64) -> StepOutcome {
        if !self.is_active(tick) {
            return StepOutcome::Idle;
        }

        // Agents only ever stand on the grid, but stay total if one does not.
        let Some(idx) = env.cell_index(self.position) else {
            return self.wiggle_and_move(env, config, rng);
        };
        let refresh_on_landmark = config.deposit_refresh == DepositRefresh::OnLandmark;

        if refresh_on_landmark {
            let cell = env.cell(idx);
            if cell.is_home || cell.food_count > 0 {
                self.deposit_strength = config.default_deposit_strength;
            }
        }

        let mut delivered = false;
        match self.role {
            Role::Searching => {
                if env.cell(idx).food_count > 0 {
                    env.cell_mut(idx).food_count -= 1;
                    self.role = Role::Carrying;
                    self.reverse();
                    return StepOutcome::PickedUp;
                }
                if !(refresh_on_landmark && env.cell(idx).is_home) {
                    env.deposit(idx, PheromoneType::Home, self.deposit_strength);
                }
                self.drain(config);
                self.follow_trail(env, config, rng, self.steering_trail(config));
            }
            Role::Carrying => {
                if env.cell(idx).is_home {
                    self.role = Role::Searching;
                    self.reverse();
                    if !refresh_on_landmark {
                        self.deposit_strength = config.default_deposit_strength;
                    }
                    delivered = true;
                } else {
                    if !(refresh_on_landmark && env.cell(idx).food_count > 0) {
                        env.deposit(idx, PheromoneType::Food, self.deposit_strength);
                    }
                    self.drain(config);
                    self.follow_trail(env, config, rng, self.steering_trail(config));
                }
            }
        }

        match self.wiggle_and_move(env, config, rng) {
            StepOutcome::Moved if delivered => StepOutcome::Delivered { moved: true },
            StepOutcome::Reversed if delivered => StepOutcome::Delivered { moved: false },
            outcome => outcome,
        }
    }

    fn drain(&mut self, config: &SimConfig) {
        self.deposit_strength = (self.deposit_strength - config.deposit_decrement).max(0.0);
    }

    /// Trail this agent steers by in its current role.
    pub fn steering_trail(&self, config: &SimConfig) -> PheromoneType {
        match (config.steering, self.role) {
            (SteeringPolicy::OwnTrail, Role::Searching) | (SteeringPolicy::CrossTrail, Role::Carrying) => PheromoneType::Home,
            (SteeringPolicy::OwnTrail, Role::Carrying) | (SteeringPolicy::CrossTrail, Role::Searching) => PheromoneType::Food,
        }
    }

    /// Steers by `trail` only while the concentration ahead sits inside the steer band.
    fn follow_trail(&mut self, env: &Environment, config: &SimConfig, rng: &mut SimRng, trail: PheromoneType) {
        let ahead = env.sense(self.position, self.heading, 0.0, trail);
        let (low, high) = config.steer_band;
        if ahead >= low && ahead < high {
            self.steer(env, config, rng, trail);
        }
    }

    /// Turns toward the stronger side reading if either side beats the reading ahead.
    pub fn steer(&mut self, env: &Environment, config: &SimConfig, rng: &mut SimRng, trail: PheromoneType) {
        let offset = match trail {
            PheromoneType::Home => config.home_sensor_angle,
            PheromoneType::Food => config.food_sensor_angle,
        };
        let ahead = env.sense(self.position, self.heading, 0.0, trail);
        let right = env.sense(self.position, self.heading, offset, trail);
        let left = env.sense(self.position, self.heading, -offset, trail);

        if right > ahead || left > ahead {
            let amount = random_angle(rng, offset);
            if right > left {
                self.turn(amount);
            } else {
                self.turn(-amount);
            }
        }
    }

    fn wiggle_and_move(&mut self, env: &Environment, config: &SimConfig, rng: &mut SimRng) -> StepOutcome {
        self.turn(random_angle(rng, config.wiggle_angle));
        self.turn(-random_angle(rng, config.wiggle_angle));

        match env.step_target(self.position, self.heading) {
            Some(target) => {
                self.position = target;
                StepOutcome::Moved
            }
            None => {
                self.reverse();
                StepOutcome::Reversed
            }
        }
    }
}

/// Wraps into `[0, 360)`; `rem_euclid` can round a tiny negative up to 360.
fn normalize_heading(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Uniform draw in `[0, max)`, zero for an empty range.
fn random_angle(rng: &mut SimRng, max: f32) -> f32 {
    if max > 0.0 {
        rng.0.gen_range(0.0..max)
    } else {
        0.0
    }
}
