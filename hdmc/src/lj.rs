//! Metropolis Monte Carlo for a two-dimensional Lennard-Jones fluid.
//!
//! Reduced units throughout (epsilon = sigma = k_B = 1). The full minimum-image
//! pair sum is used without a cutoff; potential energy and virial are updated
//! incrementally from the energy change of each accepted move.

use crate::cell::SimulationCell;
use crate::ensemble::{make_rng, validate_step_size, MonteCarloEnsemble, MoveStatistics};
use crate::error::{ConfigurationError, Result};
use crate::lattice::{hexagonal_lattice, random_positions, rectangular_lattice, Layout};
use itertools::Itertools;
use nalgebra::Vector2;
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::warn;

/// Squared closest approach used for random placement, the potential minimum 2^(1/6) squared.
pub fn random_min_distance_squared() -> f64 {
    2.0_f64.powf(1.0 / 3.0)
}

/// Pair energy and virial term `r . F` at squared separation `r2`.
#[inline]
fn pair_terms(r2: f64) -> (f64, f64) {
    let inv_r2 = 1.0 / r2;
    let inv_r6 = inv_r2 * inv_r2 * inv_r2;
    let energy = 4.0 * (inv_r6 * inv_r6 - inv_r6);
    let virial = 48.0 * inv_r6 * (inv_r6 - 0.5);
    (energy, virial)
}

/// Total potential energy and virial of a configuration.
pub fn total_energy_and_virial(cell: &SimulationCell, positions: &[Vector2<f64>]) -> (f64, f64) {
    positions
        .iter()
        .tuple_combinations()
        .map(|(a, b)| pair_terms(cell.distance_squared(a, b)))
        .fold((0.0, 0.0), |(e, w), (de, dw)| (e + de, w + dw))
}

#[derive(Debug, Clone, PartialEq)]
pub struct LennardJonesParams {
    pub n_particles: usize,
    pub cell: SimulationCell,
    pub layout: Layout,
    pub temperature: f64,
    pub step_size: f64,
    pub max_placement_attempts: usize,
}

impl LennardJonesParams {
    pub fn new(n_particles: usize, cell: SimulationCell, temperature: f64, layout: Layout) -> Self {
        Self {
            n_particles,
            cell,
            layout,
            temperature,
            step_size: 0.1,
            max_placement_attempts: 10_000,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.n_particles == 0 {
            return Err(ConfigurationError::NoParticles);
        }
        SimulationCell::new(self.cell.lx, self.cell.ly)?;
        validate_temperature(self.temperature)?;
        validate_step_size(self.step_size)?;
        if self.layout == Layout::Random && self.max_placement_attempts == 0 {
            return Err(ConfigurationError::NoPlacementAttempts);
        }
        Ok(())
    }
}

fn validate_temperature(temperature: f64) -> std::result::Result<(), ConfigurationError> {
    if temperature > 0.0 && temperature.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveTemperature(temperature))
    }
}

/// Proposed displacement together with the energy and virial it would change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyTrialMove {
    pub index: usize,
    pub position: Vector2<f64>,
    pub delta_energy: f64,
    pub delta_virial: f64,
}

#[derive(Debug)]
pub struct LennardJonesEnsemble {
    cell: SimulationCell,
    positions: Vec<Vector2<f64>>,
    temperature: f64,
    step_size: f64,
    potential_energy: f64,
    virial: f64,
    /// Sum of the virial after every trial
    virial_sum: f64,
    /// Sums of U and U^2 taken once per sweep
    energy_sum: f64,
    energy_squared_sum: f64,
    sweeps: u64,
    stats: MoveStatistics,
    rng: StdRng,
}

impl LennardJonesEnsemble {
    pub fn initialize(
        n_particles: usize,
        cell: SimulationCell,
        temperature: f64,
        layout: Layout,
    ) -> Result<Self> {
        Self::from_params(
            &LennardJonesParams::new(n_particles, cell, temperature, layout),
            make_rng(None),
        )
    }

    pub fn from_params(params: &LennardJonesParams, mut rng: StdRng) -> Result<Self> {
        params.validate()?;

        let cell = params.cell;
        let positions = match params.layout {
            Layout::Hexagonal => hexagonal_lattice(params.n_particles, &cell),
            Layout::Rectangular => rectangular_lattice(params.n_particles, &cell),
            Layout::Random => random_positions(
                params.n_particles,
                &cell,
                random_min_distance_squared().sqrt(),
                params.max_placement_attempts,
                &mut rng,
            )
            .inspect_err(|err| warn!("Random placement failed: {}", err))?,
        };
        let (potential_energy, virial) = total_energy_and_virial(&cell, &positions);

        Ok(Self {
            cell,
            positions,
            temperature: params.temperature,
            step_size: params.step_size,
            potential_energy,
            virial,
            virial_sum: 0.0,
            energy_sum: 0.0,
            energy_squared_sum: 0.0,
            sweeps: 0,
            stats: MoveStatistics::new(),
            rng,
        })
    }

    /// Propose a displacement and evaluate its energy change without committing it.
    pub fn trial_move(&mut self) -> EnergyTrialMove {
        let index = self.rng.gen_range(0..self.positions.len());
        let displacement = Vector2::new(
            self.step_size * (2.0 * self.rng.gen::<f64>() - 1.0),
            self.step_size * (2.0 * self.rng.gen::<f64>() - 1.0),
        );
        let old = self.positions[index];
        let position = self.cell.wrap(old + displacement);

        let (delta_energy, delta_virial) = self
            .positions
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .fold((0.0, 0.0), |(de, dw), (_, other)| {
                let (e_new, w_new) = pair_terms(self.cell.distance_squared(&position, other));
                let (e_old, w_old) = pair_terms(self.cell.distance_squared(&old, other));
                (de + e_new - e_old, dw + w_new - w_old)
            });

        EnergyTrialMove {
            index,
            position,
            delta_energy,
            delta_virial,
        }
    }

    /// One Metropolis trial move.
    pub fn step(&mut self) -> bool {
        let trial = self.trial_move();
        let accepted = trial.delta_energy < 0.0
            || (-trial.delta_energy / self.temperature).exp() > self.rng.gen::<f64>();

        if accepted {
            self.positions[trial.index] = trial.position;
            self.potential_energy += trial.delta_energy;
            self.virial += trial.delta_virial;
        }
        self.stats.record(accepted);

        self.virial_sum += self.virial;
        if self.stats.trials % self.positions.len() as u64 == 0 {
            self.energy_sum += self.potential_energy;
            self.energy_squared_sum += self.potential_energy * self.potential_energy;
            self.sweeps += 1;
        }

        accepted
    }

    pub fn potential_energy(&self) -> f64 {
        self.potential_energy
    }

    pub fn virial(&self) -> f64 {
        self.virial
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Change the bath temperature; accumulated averages are kept.
    pub fn set_temperature(
        &mut self,
        temperature: f64,
    ) -> std::result::Result<(), ConfigurationError> {
        validate_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn set_step_size(&mut self, step_size: f64) -> std::result::Result<(), ConfigurationError> {
        validate_step_size(step_size)?;
        self.step_size = step_size;
        Ok(())
    }

    /// Compressibility factor PV/NkT
    pub fn mean_pressure(&self) -> f64 {
        if self.stats.trials == 0 {
            return 0.0;
        }
        let mean_virial = self.virial_sum / self.stats.trials as f64;
        1.0 + 0.5 * mean_virial / (self.positions.len() as f64 * self.temperature)
    }

    /// Heat capacity per particle from potential-energy fluctuations
    pub fn specific_heat(&self) -> f64 {
        if self.sweeps == 0 {
            return 0.0;
        }
        let n_samples = self.sweeps as f64;
        let mean = self.energy_sum / n_samples;
        let mean_squared = self.energy_squared_sum / n_samples;
        (mean_squared - mean * mean)
            / (self.temperature * self.temperature * self.positions.len() as f64)
    }

    pub fn mean_energy_per_particle(&self) -> f64 {
        if self.sweeps == 0 {
            return 0.0;
        }
        self.energy_sum / self.sweeps as f64 / self.positions.len() as f64
    }
}

impl MonteCarloEnsemble for LennardJonesEnsemble {
    fn one_sweep(&mut self) {
        for _ in 0..self.positions.len() {
            self.step();
        }
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
        self.virial_sum = 0.0;
        self.energy_sum = 0.0;
        self.energy_squared_sum = 0.0;
        self.sweeps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seeded(params: &LennardJonesParams, seed: u64) -> LennardJonesEnsemble {
        LennardJonesEnsemble::from_params(params, make_rng(Some(seed))).unwrap()
    }

    #[test]
    fn test_pair_terms_at_minimum() {
        let r2 = random_min_distance_squared();
        let (energy, virial) = pair_terms(r2);
        assert_relative_eq!(energy, -1.0, epsilon = 1e-12);
        // no force at the potential minimum
        assert_relative_eq!(virial, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_particle_energy() {
        let cell = SimulationCell::square(10.0).unwrap();
        let positions = [Vector2::new(1.0, 1.0), Vector2::new(9.0, 1.0)];
        let (energy, virial) = total_energy_and_virial(&cell, &positions);
        // separated by 2 through the boundary
        let inv_r6 = 1.0 / 64.0;
        assert_relative_eq!(energy, 4.0 * (inv_r6 * inv_r6 - inv_r6), epsilon = 1e-12);
        assert_relative_eq!(virial, 48.0 * inv_r6 * (inv_r6 - 0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_temperature() {
        let cell = SimulationCell::square(10.0).unwrap();
        let params = LennardJonesParams::new(16, cell, 0.0, Layout::Hexagonal);
        assert_eq!(
            params.validate(),
            Err(ConfigurationError::NonPositiveTemperature(0.0))
        );
    }

    #[test]
    fn test_set_temperature_validates() {
        let cell = SimulationCell::square(10.0).unwrap();
        let params = LennardJonesParams::new(16, cell, 1.0, Layout::Hexagonal);
        let mut lj = seeded(&params, 2);

        lj.set_temperature(2.5).unwrap();
        assert_eq!(lj.temperature(), 2.5);

        assert_eq!(
            lj.set_temperature(-1.0),
            Err(ConfigurationError::NonPositiveTemperature(-1.0))
        );
        assert!(lj.set_temperature(f64::INFINITY).is_err());
        assert_eq!(lj.temperature(), 2.5);
    }

    #[test]
    fn test_incremental_energy_matches_recomputation() {
        let cell = SimulationCell::square(8.0).unwrap();
        let mut params = LennardJonesParams::new(25, cell, 1.0, Layout::Hexagonal);
        params.step_size = 0.2;
        let mut lj = seeded(&params, 17);

        for _ in 0..40 {
            lj.one_sweep();
        }

        let (energy, virial) = total_energy_and_virial(lj.cell(), lj.positions());
        assert_relative_eq!(lj.potential_energy(), energy, epsilon = 1e-8, max_relative = 1e-8);
        assert_relative_eq!(lj.virial(), virial, epsilon = 1e-8, max_relative = 1e-8);
    }

    #[test]
    fn test_sweep_bookkeeping() {
        let cell = SimulationCell::square(9.0).unwrap();
        let params = LennardJonesParams::new(16, cell, 1.5, Layout::Random);
        let mut lj = seeded(&params, 4);

        assert_eq!(lj.mean_pressure(), 0.0);
        assert_eq!(lj.specific_heat(), 0.0);

        for _ in 0..25 {
            lj.one_sweep();
        }
        assert_eq!(lj.sweeps(), 25);
        assert_eq!(lj.statistics().trials, 25 * 16);
        assert!(lj.statistics().accepted > 0);
        assert!(lj.specific_heat() >= 0.0);
        assert!(lj.mean_pressure().is_finite());
        assert!(lj.positions().iter().all(|p| lj.cell().contains(p)));

        lj.reset_statistics();
        assert_eq!(lj.sweeps(), 0);
        assert_eq!(lj.mean_energy_per_particle(), 0.0);
    }

    #[test]
    fn test_dilute_gas_is_nearly_ideal() {
        let cell = SimulationCell::square(40.0).unwrap();
        let mut params = LennardJonesParams::new(16, cell, 2.0, Layout::Rectangular);
        params.step_size = 1.0;
        let mut lj = seeded(&params, 99);

        for _ in 0..200 {
            lj.one_sweep();
        }
        assert!((lj.mean_pressure() - 1.0).abs() < 0.1);
        assert!(lj.mean_energy_per_particle().abs() < 0.1);
    }
}
