//! Sampling loops shared by single runs and independent replica sets.

use crate::cell::SimulationCell;
use crate::ensemble::{make_rng, HardDiskEnsemble, HardDiskParams, MonteCarloEnsemble};
use crate::error::Result;
use crate::lj::{LennardJonesEnsemble, LennardJonesParams};
use crate::rdf::{hard_disk_pressure, RadialDistribution};
use rayon::prelude::*;
use serde::Serialize;

/// Run `sweeps` sweeps without sampling.
pub fn equilibrate<E: MonteCarloEnsemble>(ensemble: &mut E, sweeps: usize) {
    for _ in 0..sweeps {
        ensemble.one_sweep();
    }
}

/// Run `sweeps` sweeps, folding every configuration into `rdf`.
pub fn sample_rdf<E: MonteCarloEnsemble>(
    ensemble: &mut E,
    rdf: &mut RadialDistribution,
    sweeps: usize,
) {
    for _ in 0..sweeps {
        ensemble.one_sweep();
        rdf.accumulate(ensemble.positions());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SystemParams {
    HardDisks(HardDiskParams),
    LennardJones(LennardJonesParams),
}

/// One independent run: a system, its g(r) settings and a seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Replica {
    pub system: SystemParams,
    pub bin_width: f64,
    /// Minimum-image pair separations in g(r)
    pub periodic: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Observables {
    HardDisks {
        radius: f64,
        area_fraction: f64,
        contact_pressure: f64,
    },
    LennardJones {
        mean_pressure: f64,
        specific_heat: f64,
        mean_energy_per_particle: f64,
    },
}

/// Results from one replica
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicaResult {
    pub density: f64,
    pub acceptance_ratio: f64,
    pub sweeps: u64,
    pub radii: Vec<f64>,
    pub g_of_r: Vec<f64>,
    pub observables: Observables,
}

impl Replica {
    /// Equilibrate, reset the counters, then sample g(r) over `production` sweeps.
    pub fn run(&self, equilibration: usize, production: usize) -> Result<ReplicaResult> {
        let rng = make_rng(self.seed);
        match &self.system {
            SystemParams::HardDisks(params) => {
                let mut ensemble = HardDiskEnsemble::from_params(params, rng)?;
                let mut rdf = self.distribution(params.cell)?;
                equilibrate(&mut ensemble, equilibration);
                ensemble.reset_statistics();
                sample_rdf(&mut ensemble, &mut rdf, production);

                let diameter = 2.0 * ensemble.radius();
                let observables = Observables::HardDisks {
                    radius: ensemble.radius(),
                    area_fraction: ensemble.area_fraction(),
                    contact_pressure: hard_disk_pressure(
                        rdf.contact_value(diameter),
                        ensemble.density(),
                        diameter,
                    ),
                };
                Ok(summarize(&ensemble, &rdf, observables))
            }
            SystemParams::LennardJones(params) => {
                let mut ensemble = LennardJonesEnsemble::from_params(params, rng)?;
                let mut rdf = self.distribution(params.cell)?;
                equilibrate(&mut ensemble, equilibration);
                ensemble.reset_statistics();
                sample_rdf(&mut ensemble, &mut rdf, production);

                let observables = Observables::LennardJones {
                    mean_pressure: ensemble.mean_pressure(),
                    specific_heat: ensemble.specific_heat(),
                    mean_energy_per_particle: ensemble.mean_energy_per_particle(),
                };
                Ok(summarize(&ensemble, &rdf, observables))
            }
        }
    }

    fn distribution(&self, cell: SimulationCell) -> Result<RadialDistribution> {
        let mut rdf = RadialDistribution::for_cell(cell, self.bin_width)?;
        rdf.set_periodic(self.periodic);
        Ok(rdf)
    }
}

fn summarize<E: MonteCarloEnsemble>(
    ensemble: &E,
    rdf: &RadialDistribution,
    observables: Observables,
) -> ReplicaResult {
    ReplicaResult {
        density: ensemble.density(),
        acceptance_ratio: ensemble.acceptance_ratio(),
        sweeps: ensemble.sweeps(),
        radii: rdf.radii(),
        g_of_r: rdf.normalize(),
        observables,
    }
}

/// Run independent replicas in parallel; results come back in input order.
pub fn run_replicas(
    replicas: &[Replica],
    equilibration: usize,
    production: usize,
) -> Vec<Result<ReplicaResult>> {
    replicas
        .par_iter()
        .map(|replica| replica.run(equilibration, production))
        .collect()
}
