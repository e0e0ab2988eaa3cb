use super::report::report_progress;
use crate::config::Config;
use hdmc::{MonteCarloEnsemble, RadialDistribution};
use tracing::info;

/// Sweep counts of one run
#[derive(Debug, Clone, Copy)]
pub struct RunSchedule {
    pub equilibration: usize,
    pub production: usize,
    pub report_interval: usize,
}

impl RunSchedule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            equilibration: config.equilibration_sweeps(),
            production: config.production_sweeps(),
            report_interval: config.report_interval().max(1),
        }
    }
}

/// Equilibrate, clear the counters, then fold one configuration per sweep into `rdf`.
pub fn run_ensemble<E: MonteCarloEnsemble>(
    ensemble: &mut E,
    rdf: &mut RadialDistribution,
    schedule: &RunSchedule,
) {
    info!("\nEquilibrating for {} sweeps...", schedule.equilibration);
    for sweep in 1..=schedule.equilibration {
        ensemble.one_sweep();
        if sweep % schedule.report_interval == 0 {
            report_progress("Equilibration", sweep, ensemble);
        }
    }

    ensemble.reset_statistics();
    rdf.reset();

    info!("\nSampling g(r) over {} sweeps...", schedule.production);
    for sweep in 1..=schedule.production {
        ensemble.one_sweep();
        rdf.accumulate(ensemble.positions());
        if sweep % schedule.report_interval == 0 {
            report_progress("Production", sweep, ensemble);
        }
    }
}
