//! Radial distribution function g(r) of a two-dimensional configuration.
//!
//! Pair distances are histogrammed up to half the shorter cell side, where the
//! minimum-image annulus still fits inside the cell. `normalize` divides each
//! shell count by the count an ideal gas at the same density would produce.

use crate::cell::SimulationCell;
use crate::error::ConfigurationError;
use itertools::Itertools;
use nalgebra::Vector2;
use std::f64::consts::PI;

/// Shift applied before binning so distances computed a rounding error short
/// of a bin edge still land in the upper bin.
const BIN_EPSILON: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq)]
pub struct RadialDistribution {
    cell: SimulationCell,
    bin_width: f64,
    max_radius: f64,
    bins: Vec<u64>,
    sample_count: u64,
    n_particles: usize,
    periodic: bool,
}

impl RadialDistribution {
    /// Histogram for an `lx` x `ly` cell with shells of width `bin_width`.
    pub fn new(lx: f64, ly: f64, bin_width: f64) -> Result<Self, ConfigurationError> {
        Self::for_cell(SimulationCell::new(lx, ly)?, bin_width)
    }

    pub fn for_cell(cell: SimulationCell, bin_width: f64) -> Result<Self, ConfigurationError> {
        if !(bin_width > 0.0 && bin_width.is_finite()) {
            return Err(ConfigurationError::NonPositiveBinWidth(bin_width));
        }
        let max_radius = 0.5 * cell.min_length();
        let n_bins = ((max_radius / bin_width).ceil() as usize).max(1);

        Ok(Self {
            cell,
            bin_width,
            max_radius,
            bins: vec![0; n_bins],
            sample_count: 0,
            n_particles: 0,
            periodic: true,
        })
    }

    /// Bin holding distance `r`; the last bin is closed at `max_radius`.
    pub fn bin_index(&self, r: f64) -> Option<usize> {
        if !(r >= 0.0) || r > self.max_radius {
            return None;
        }
        let index = ((r + BIN_EPSILON) / self.bin_width) as usize;
        Some(index.min(self.bins.len() - 1))
    }

    /// Fold one configuration into the histogram.
    pub fn accumulate(&mut self, positions: &[Vector2<f64>]) {
        self.n_particles = positions.len();
        self.sample_count += 1;

        for (a, b) in positions.iter().tuple_combinations() {
            let separation = if self.periodic {
                self.cell.separation(a, b)
            } else {
                a - b
            };
            if let Some(index) = self.bin_index(separation.norm()) {
                self.bins[index] += 1;
            }
        }
    }

    /// Same as [`accumulate`](Self::accumulate) for separate coordinate slices.
    pub fn accumulate_coordinates(
        &mut self,
        xs: &[f64],
        ys: &[f64],
    ) -> Result<(), ConfigurationError> {
        if xs.len() != ys.len() {
            return Err(ConfigurationError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let positions: Vec<Vector2<f64>> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| Vector2::new(x, y))
            .collect();
        self.accumulate(&positions);
        Ok(())
    }

    /// Normalized g(r), one value per bin. All zeros before the first sample.
    pub fn normalize(&self) -> Vec<f64> {
        if self.sample_count == 0 || self.n_particles == 0 {
            return vec![0.0; self.bins.len()];
        }

        let n = self.n_particles as f64;
        let density = n / self.cell.area();
        let norm = 0.5 * density * self.sample_count as f64 * n;
        let bw = self.bin_width;

        self.bins
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let r = i as f64 * bw;
                // the last bin stops at max_radius when bw does not divide it
                let outer = (r + bw).min(self.max_radius);
                let shell = PI * (outer * outer - r * r);
                count as f64 / (shell * norm)
            })
            .collect()
    }

    /// Lower edge of every bin
    pub fn radii(&self) -> Vec<f64> {
        (0..self.bins.len())
            .map(|i| i as f64 * self.bin_width)
            .collect()
    }

    /// g(r) in the first bin whose lower edge is at or beyond `diameter`.
    ///
    /// A bin straddling the diameter is partly inside the hard core and is skipped.
    pub fn contact_value(&self, diameter: f64) -> f64 {
        let index = ((diameter - BIN_EPSILON) / self.bin_width).ceil().max(0.0) as usize;
        self.normalize().get(index).copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|count| *count = 0);
        self.sample_count = 0;
    }

    /// Switch minimum-image folding of pair separations on or off.
    pub fn set_periodic(&mut self, periodic: bool) {
        self.periodic = periodic;
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn cell(&self) -> &SimulationCell {
        &self.cell
    }
}

/// Hard-disk compressibility factor PA/NkT from the contact value of g(r).
pub fn hard_disk_pressure(g_contact: f64, density: f64, diameter: f64) -> f64 {
    1.0 + 0.5 * PI * density * diameter * diameter * g_contact
}
