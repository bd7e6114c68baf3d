use crate::config::EdgePolicy;

const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PheromoneType {
    /// Laid by carriers, leads toward food.
    Food,
    /// Laid by searching agents, leads toward home.
    Home,
}

/// Maps integer cell coordinates to a row-major index, honoring the edge policy.
pub(crate) fn resolve_cell(x: i64, y: i64, width: usize, height: usize, edge: EdgePolicy) -> Option<usize> {
    let (w, h) = (width as i64, height as i64);
    let (x, y) = match edge {
        EdgePolicy::Bounded => {
            if x < 0 || y < 0 || x >= w || y >= h {
                return None;
            }
            (x, y)
        }
        EdgePolicy::Toroidal => (x.rem_euclid(w), y.rem_euclid(h)),
    };
    Some(y as usize * width + x as usize)
}

/// One scalar quantity over the grid.
#[derive(Debug, Clone)]
pub struct Field {
    width: usize,
    height: usize,
    values: Vec<f32>,

    // Pre-diffusion snapshot
    buffer: Vec<f32>,
}

impl Field {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            values: vec![0.0; size],
            buffer: vec![0.0; size],
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> f32 {
        self.values[idx]
    }

    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    /// Total mass over the grid.
    pub fn total(&self) -> f32 {
        self.values.iter().sum()
    }

    /// Adds `amount` to one cell. Negative (or NaN) amounts deposit nothing.
    pub fn deposit(&mut self, idx: usize, amount: f32) {
        self.values[idx] += amount.max(0.0);
    }

    /// Every cell hands `rate` of its value out in eight equal shares, one per
    /// neighbor slot. Shares aimed past a bounded edge are lost. All cells read
    /// from the same pre-diffusion snapshot.
    pub fn diffuse(&mut self, rate: f32, edge: EdgePolicy) {
        let rate = rate.clamp(0.0, 1.0);
        if rate == 0.0 {
            return;
        }

        self.buffer.copy_from_slice(&self.values);
        let keep = 1.0 - rate;
        for val in self.values.iter_mut() {
            *val *= keep;
        }

        for y in 0..self.height {
            for x in 0..self.width {
                let source = self.buffer[y * self.width + x];
                if source <= 0.0 {
                    continue;
                }
                let share = source * rate / 8.0;
                for (dx, dy) in NEIGHBOR_OFFSETS {
                    if let Some(idx) = resolve_cell(x as i64 + dx, y as i64 + dy, self.width, self.height, edge) {
                        self.values[idx] += share;
                    }
                }
            }
        }
    }

    /// Multiplies every cell by `(100 - rate) / 100`.
    pub fn decay(&mut self, rate: u32) {
        let factor = (100 - rate.min(100)) as f32 / 100.0;
        for val in self.values.iter_mut() {
            *val *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(width: usize, height: usize, x: usize, y: usize, amount: f32) -> Field {
        let mut field = Field::new(width, height);
        field.deposit(y * width + x, amount);
        field
    }

    #[test]
    fn deposit_accumulates_without_clamp() {
        let mut field = Field::new(3, 3);
        field.deposit(4, 150.0);
        field.deposit(4, 150.0);
        field.deposit(4, -20.0);
        assert_eq!(field.at(1, 1), 300.0);
    }

    #[test]
    fn interior_diffusion_conserves_mass() {
        let mut field = spike(5, 5, 2, 2, 80.0);
        field.diffuse(0.5, EdgePolicy::Bounded);
        assert!((field.total() - 80.0).abs() < 1e-4);
        assert!((field.at(2, 2) - 40.0).abs() < 1e-4);
        assert!((field.at(1, 1) - 5.0).abs() < 1e-4);
        assert!((field.at(3, 2) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn corner_diffusion_leaks_off_grid() {
        let mut field = spike(4, 4, 0, 0, 80.0);
        field.diffuse(1.0, EdgePolicy::Bounded);
        // Only three of the eight shares land on the grid.
        assert!((field.total() - 30.0).abs() < 1e-4);
        assert_eq!(field.at(0, 0), 0.0);
        assert!((field.at(1, 1) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn toroidal_diffusion_wraps_without_loss() {
        let mut field = spike(4, 4, 0, 0, 80.0);
        field.diffuse(1.0, EdgePolicy::Toroidal);
        assert!((field.total() - 80.0).abs() < 1e-4);
        assert!((field.at(3, 3) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn diffusion_reads_a_single_snapshot() {
        // Two adjacent spikes exchange exactly the same share in both directions.
        let mut field = Field::new(3, 1);
        field.deposit(0, 16.0);
        field.deposit(1, 16.0);
        field.diffuse(0.5, EdgePolicy::Bounded);
        assert!((field.at(0, 0) - 9.0).abs() < 1e-4);
        assert!((field.at(1, 0) - 9.0).abs() < 1e-4);
        assert!((field.at(2, 0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn decay_scales_by_percentage() {
        let mut field = spike(2, 2, 1, 1, 50.0);
        field.decay(8);
        assert!((field.at(1, 1) - 46.0).abs() < 1e-4);
        field.decay(100);
        assert_eq!(field.at(1, 1), 0.0);
    }

    #[test]
    fn zero_rates_leave_field_untouched() {
        let mut field = Field::new(4, 3);
        for (i, amount) in [3.5, 0.25, 12.0, 7.0].into_iter().enumerate() {
            field.deposit(i * 3, amount);
        }
        let before = field.values().to_vec();
        field.decay(0);
        field.diffuse(0.0, EdgePolicy::Bounded);
        assert_eq!(field.values(), before.as_slice());
    }

    #[test]
    fn repeated_cycles_stay_non_negative_and_shrink() {
        let mut field = spike(6, 6, 0, 3, 100.0);
        field.deposit(20, 40.0);
        let mut last = field.total();
        for _ in 0..50 {
            field.diffuse(0.2, EdgePolicy::Bounded);
            field.decay(8);
            assert!(field.values().iter().all(|v| *v >= 0.0));
            let total = field.total();
            assert!(total <= last + 1e-3, "mass grew from {last} to {total}");
            last = total;
        }
    }
}
