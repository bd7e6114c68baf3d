use bevy::prelude::*;
use rand::Rng;

use crate::components::SimRng;
use crate::config::{EdgePolicy, FoodQuantity, LandmarkSite, SimConfig};
use crate::pheromones::{resolve_cell, Field, PheromoneType};

/// Static layout and food stock of one grid location. Trail concentrations live in the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub food_count: u32,
    pub is_home: bool,
    pub source_id: Option<u8>,
}

/// Unit vector for a heading in degrees, clockwise from north (+y).
pub fn heading_vector(heading: f32) -> Vec2 {
    let radians = heading.to_radians();
    Vec2::new(radians.sin(), radians.cos())
}

#[derive(Resource, Debug, Clone)]
pub struct Environment {
    width: usize,
    height: usize,
    edge: EdgePolicy,
    cells: Vec<Cell>,
    food_trail: Field,
    home_trail: Field,
}

impl Environment {
    pub fn new(width: usize, height: usize, edge: EdgePolicy) -> Self {
        Self {
            width,
            height,
            edge,
            cells: vec![Cell::default(); width * height],
            food_trail: Field::new(width, height),
            home_trail: Field::new(width, height),
        }
    }

    /// Empty grid sized and edged per `config`, landmarks placed.
    pub fn from_config(config: &SimConfig, rng: &mut SimRng) -> Self {
        let mut environment = Self::new(config.grid_width, config.grid_height, config.edge_policy);
        environment.setup_landmarks(config, rng);
        environment
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Continuous center of the grid; agents are released from here.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }

    pub fn landmark_center(&self, site: LandmarkSite) -> Vec2 {
        let half = self.center();
        half + Vec2::new(site.x * half.x, site.y * half.y)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub(crate) fn cell_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    pub fn cell_at(&self, x: usize, y: usize) -> &Cell {
        &self.cells[y * self.width + x]
    }

    /// Index of the cell containing `position`, or `None` off a bounded grid.
    pub fn cell_index(&self, position: Vec2) -> Option<usize> {
        if !position.is_finite() {
            return None;
        }
        resolve_cell(
            position.x.floor() as i64,
            position.y.floor() as i64,
            self.width,
            self.height,
            self.edge,
        )
    }

    pub fn trail(&self, trail: PheromoneType) -> &Field {
        match trail {
            PheromoneType::Food => &self.food_trail,
            PheromoneType::Home => &self.home_trail,
        }
    }

    pub fn trail_mut(&mut self, trail: PheromoneType) -> &mut Field {
        match trail {
            PheromoneType::Food => &mut self.food_trail,
            PheromoneType::Home => &mut self.home_trail,
        }
    }

    pub fn deposit(&mut self, idx: usize, trail: PheromoneType, amount: f32) {
        self.trail_mut(trail).deposit(idx, amount);
    }

    pub fn total_food(&self) -> u64 {
        self.cells.iter().map(|c| c.food_count as u64).sum()
    }

    pub fn total_trail(&self, trail: PheromoneType) -> f32 {
        self.trail(trail).total()
    }

    /// Marks home cells and food-source cells within the landmark radius of each
    /// configured site. Home cells never receive food.
    pub fn setup_landmarks(&mut self, config: &SimConfig, rng: &mut SimRng) {
        let radius = config.landmark_radius;
        let homes: Vec<Vec2> = config.homes.iter().map(|s| self.landmark_center(*s)).collect();
        let sources: Vec<Vec2> = config.food_sources.iter().map(|s| self.landmark_center(*s)).collect();

        for y in 0..self.height {
            for x in 0..self.width {
                let patch = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let cell = &mut self.cells[y * self.width + x];

                if homes.iter().any(|h| patch.distance(*h) < radius) {
                    cell.is_home = true;
                    continue;
                }

                // Later sources win on overlap
                for (i, source) in sources.iter().enumerate() {
                    if patch.distance(*source) < radius {
                        cell.source_id = Some((i + 1) as u8);
                    }
                }

                if cell.source_id.is_some() {
                    cell.food_count = match config.food_per_cell {
                        FoodQuantity::Random { min, max } => rng.0.gen_range(min..=max),
                        FoodQuantity::Fixed(n) => n,
                    };
                }
            }
        }

        let home_cells = self.cells.iter().filter(|c| c.is_home).count();
        let food_cells = self.cells.iter().filter(|c| c.source_id.is_some()).count();
        info!(
            "Landmarks placed: {} home cells, {} food cells holding {} units",
            home_cells,
            food_cells,
            self.total_food()
        );
    }

    /// Diffuses both trails, then evaporates both. Diffusion rates are fractions
    /// in `[0, 1]`, evaporation rates integer percentages.
    pub fn tick_fields(&mut self, food_diffusion: f32, food_evaporation: u32, home_diffusion: f32, home_evaporation: u32) {
        self.food_trail.diffuse(food_diffusion, self.edge);
        self.home_trail.diffuse(home_diffusion, self.edge);
        self.food_trail.decay(food_evaporation);
        self.home_trail.decay(home_evaporation);
    }

    /// Trail concentration one unit ahead of `position`, `angle_offset` degrees
    /// clockwise of `heading`. Zero when that spot is off the grid.
    pub fn sense(&self, position: Vec2, heading: f32, angle_offset: f32, trail: PheromoneType) -> f32 {
        let sample = position + heading_vector(heading + angle_offset);
        match self.cell_index(sample) {
            Some(idx) => self.trail(trail).get(idx),
            None => 0.0,
        }
    }

    /// Where one unit forward along `heading` lands, or `None` if that leaves a bounded grid.
    pub fn step_target(&self, position: Vec2, heading: f32) -> Option<Vec2> {
        let target = position + heading_vector(heading);
        match self.edge {
            EdgePolicy::Bounded => self.cell_index(target).map(|_| target),
            EdgePolicy::Toroidal => Some(Vec2::new(
                wrap_coord(target.x, self.width as f32),
                wrap_coord(target.y, self.height as f32),
            )),
        }
    }
}

// `rem_euclid` rounds tiny negatives up to `extent` itself.
fn wrap_coord(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
