//! Hard-disk Monte Carlo in a periodic cell.
//!
//! Disks of equal radius move by random single-particle displacements; a trial
//! position is rejected when it would bring the disk closer than one diameter
//! to any other disk (minimum-image convention). Between sweeps the radius can
//! be scaled by a compression factor, which packs the system towards higher
//! area fractions without moving any particle.

mod statistics;

pub use statistics::MoveStatistics;

use crate::cell::SimulationCell;
use crate::error::{ConfigurationError, Result};
use crate::lattice::{hexagonal_lattice, random_positions, rectangular_lattice, Layout};
use nalgebra::Vector2;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Slack allowed when checking that a lattice is overlap-free.
const CONTACT_TOLERANCE: f64 = 1e-12;

/// Common interface of the single-particle Monte Carlo ensembles.
pub trait MonteCarloEnsemble {
    /// Attempt one trial move per particle.
    fn one_sweep(&mut self);

    fn positions(&self) -> &[Vector2<f64>];

    fn cell(&self) -> &SimulationCell;

    fn statistics(&self) -> &MoveStatistics;

    /// Completed sweeps since the last reset.
    fn sweeps(&self) -> u64;

    /// Clear move counters, sweep count and any accumulated averages.
    fn reset_statistics(&mut self);

    fn n_particles(&self) -> usize {
        self.positions().len()
    }

    /// Number density N / A
    fn density(&self) -> f64 {
        self.n_particles() as f64 / self.cell().area()
    }

    fn acceptance_ratio(&self) -> f64 {
        self.statistics().acceptance_ratio()
    }
}

/// Seeded generator, or one drawn from OS entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Setup of a hard-disk run.
#[derive(Debug, Clone, PartialEq)]
pub struct HardDiskParams {
    pub n_particles: usize,
    pub cell: SimulationCell,
    pub layout: Layout,
    /// Disk radius; overlap means a separation below twice this value
    pub radius: f64,
    /// Maximum displacement per axis of a trial move
    pub step_size: f64,
    /// Radius scale factor applied after every sweep
    pub compression_factor: f64,
    /// Smallest separation accepted by random placement
    pub placement_distance: f64,
    /// Candidate sites tried per particle by random placement
    pub max_placement_attempts: usize,
}

impl HardDiskParams {
    pub fn new(n_particles: usize, cell: SimulationCell, radius: f64, layout: Layout) -> Self {
        Self {
            n_particles,
            cell,
            layout,
            radius,
            step_size: 0.1,
            compression_factor: 1.0,
            placement_distance: 1.0,
            max_placement_attempts: 10_000,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.n_particles == 0 {
            return Err(ConfigurationError::NoParticles);
        }
        SimulationCell::new(self.cell.lx, self.cell.ly)?;
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(ConfigurationError::NonPositiveRadius(self.radius));
        }
        validate_step_size(self.step_size)?;
        validate_scale_factor(self.compression_factor)?;
        if self.layout == Layout::Random && self.max_placement_attempts == 0 {
            return Err(ConfigurationError::NoPlacementAttempts);
        }
        Ok(())
    }
}

pub(crate) fn validate_step_size(step_size: f64) -> std::result::Result<(), ConfigurationError> {
    if step_size >= 0.0 && step_size.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NegativeStepSize(step_size))
    }
}

fn validate_scale_factor(factor: f64) -> std::result::Result<(), ConfigurationError> {
    if factor > 0.0 && factor.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveScaleFactor(factor))
    }
}

/// A proposed single-particle displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialMove {
    pub index: usize,
    /// Trial position, already wrapped into the cell
    pub position: Vector2<f64>,
    pub overlap: bool,
}

#[derive(Debug)]
pub struct HardDiskEnsemble {
    cell: SimulationCell,
    positions: Vec<Vector2<f64>>,
    radius: f64,
    step_size: f64,
    compression_factor: f64,
    equivalent_cell_length: f64,
    stats: MoveStatistics,
    sweeps: u64,
    rng: StdRng,
}

impl HardDiskEnsemble {
    /// Square cell of side `length` with default step size and no compression.
    pub fn initialize(
        n_particles: usize,
        length: f64,
        radius: f64,
        layout: Layout,
    ) -> Result<Self> {
        let cell = SimulationCell::square(length)?;
        Self::from_params(
            &HardDiskParams::new(n_particles, cell, radius, layout),
            make_rng(None),
        )
    }

    /// Build the initial configuration described by `params`.
    pub fn from_params(params: &HardDiskParams, mut rng: StdRng) -> Result<Self> {
        params.validate()?;

        let cell = params.cell;
        let diameter = 2.0 * params.radius;
        let positions = match params.layout {
            Layout::Hexagonal => hexagonal_lattice(params.n_particles, &cell),
            Layout::Rectangular => rectangular_lattice(params.n_particles, &cell),
            Layout::Random => random_positions(
                params.n_particles,
                &cell,
                params.placement_distance.max(diameter),
                params.max_placement_attempts,
                &mut rng,
            )
            .inspect_err(|err| warn!("Random placement failed: {}", err))?,
        };

        let min_separation = cell.min_separation(&positions);
        if params.n_particles > 1 && min_separation + CONTACT_TOLERANCE < diameter {
            return Err(ConfigurationError::LatticeOverlap {
                min_separation,
                diameter,
            }
            .into());
        }

        debug!(
            "Placed {} disks on a {} layout in a {} x {} cell",
            params.n_particles, params.layout, cell.lx, cell.ly
        );

        Ok(Self {
            cell,
            positions,
            radius: params.radius,
            step_size: params.step_size,
            compression_factor: params.compression_factor,
            equivalent_cell_length: equivalent_cell_length(cell.lx, params.radius),
            stats: MoveStatistics::new(),
            sweeps: 0,
            rng,
        })
    }

    /// Propose a move of one randomly chosen disk.
    ///
    /// Only the random number generator advances; positions and counters are untouched.
    pub fn trial_move(&mut self) -> TrialMove {
        let index = self.rng.gen_range(0..self.positions.len());
        let displacement = Vector2::new(
            self.step_size * (2.0 * self.rng.gen::<f64>() - 1.0),
            self.step_size * (2.0 * self.rng.gen::<f64>() - 1.0),
        );
        let position = self.cell.wrap(self.positions[index] + displacement);
        let overlap = self.overlaps(index, &position);

        TrialMove {
            index,
            position,
            overlap,
        }
    }

    /// True if a disk at `position` would overlap any disk other than `index`.
    pub fn overlaps(&self, index: usize, position: &Vector2<f64>) -> bool {
        let diameter2 = (2.0 * self.radius).powi(2);
        self.positions
            .iter()
            .enumerate()
            .any(|(j, other)| j != index && self.cell.distance_squared(position, other) < diameter2)
    }

    /// Make one trial move and commit it when it does not overlap.
    pub fn step(&mut self) -> bool {
        let trial = self.trial_move();
        let accepted = !trial.overlap;
        if accepted {
            self.positions[trial.index] = trial.position;
        }
        self.stats.record(accepted);
        accepted
    }

    /// Scale the disk radius.
    ///
    /// Growing (`scale_factor > 1`) is capped at half the closest pair distance so
    /// the configuration stays overlap-free; this costs an O(N^2) scan.
    pub fn compress(&mut self, scale_factor: f64) -> std::result::Result<(), ConfigurationError> {
        validate_scale_factor(scale_factor)?;
        self.apply_compression(scale_factor);
        Ok(())
    }

    fn apply_compression(&mut self, scale_factor: f64) {
        self.radius *= scale_factor;
        if scale_factor > 1.0 {
            let limit = 0.5 * self.cell.min_separation(&self.positions);
            if self.radius > limit {
                debug!(
                    "Compression clamped radius {:.6} to contact {:.6}",
                    self.radius, limit
                );
                self.radius = limit;
            }
        }
        self.equivalent_cell_length = equivalent_cell_length(self.cell.lx, self.radius);
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn set_step_size(&mut self, step_size: f64) -> std::result::Result<(), ConfigurationError> {
        validate_step_size(step_size)?;
        self.step_size = step_size;
        Ok(())
    }

    pub fn compression_factor(&self) -> f64 {
        self.compression_factor
    }

    pub fn set_compression_factor(
        &mut self,
        factor: f64,
    ) -> std::result::Result<(), ConfigurationError> {
        validate_scale_factor(factor)?;
        self.compression_factor = factor;
        Ok(())
    }

    /// Side length of the cell holding unit-diameter disks at the current area fraction.
    pub fn equivalent_cell_length(&self) -> f64 {
        self.equivalent_cell_length
    }

    /// Number density in units of the disk diameter, N sigma^2 / A.
    ///
    /// In a square cell this is `N / equivalent_cell_length^2`.
    pub fn reduced_density(&self) -> f64 {
        let diameter = 2.0 * self.radius;
        self.positions.len() as f64 * diameter * diameter / self.cell.area()
    }

    /// Fraction of the cell area covered by disks
    pub fn area_fraction(&self) -> f64 {
        self.positions.len() as f64 * PI * self.radius * self.radius / self.cell.area()
    }

    /// Closest approach between disks, periodic images included; never above the shorter side.
    pub fn min_separation(&self) -> f64 {
        self.cell.min_separation(&self.positions)
    }
}

impl MonteCarloEnsemble for HardDiskEnsemble {
    /// N trial moves, then the compression rule.
    fn one_sweep(&mut self) {
        for _ in 0..self.positions.len() {
            self.step();
        }
        self.apply_compression(self.compression_factor);
        self.sweeps += 1;
    }

    fn positions(&self) -> &[Vector2<f64>] {
        &self.positions
    }

    fn cell(&self) -> &SimulationCell {
        &self.cell
    }

    fn statistics(&self) -> &MoveStatistics {
        &self.stats
    }

    fn sweeps(&self) -> u64 {
        self.sweeps
    }

    fn reset_statistics(&mut self) {
        self.stats.reset();
        self.sweeps = 0;
    }
}

fn equivalent_cell_length(length: f64, radius: f64) -> f64 {
    length * (0.25 / (radius * radius)).sqrt()
}
