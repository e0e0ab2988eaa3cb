use hdmc::{
    hard_disk_pressure, HardDiskEnsemble, LennardJonesEnsemble, MonteCarloEnsemble, Observables,
    RadialDistribution, ReplicaResult,
};
use tracing::{info, warn};

pub fn report_progress<E: MonteCarloEnsemble>(phase: &str, sweep: usize, ensemble: &E) {
    info!(
        "{} sweep {:>8}: acceptance ratio {:.4}",
        phase,
        sweep,
        ensemble.acceptance_ratio()
    );
}

pub fn report_hard_disks(ensemble: &HardDiskEnsemble, rdf: &RadialDistribution) {
    let diameter = 2.0 * ensemble.radius();
    let g_contact = rdf.contact_value(diameter);

    info!("\nHard-disk run finished.");
    info!("  Particles:              {}", ensemble.n_particles());
    info!("  Number density:         {:.6}", ensemble.density());
    info!("  Disk radius:            {:.6}", ensemble.radius());
    info!("  Area fraction:          {:.6}", ensemble.area_fraction());
    info!("  Equivalent cell length: {:.6}", ensemble.equivalent_cell_length());
    info!("  Reduced density:        {:.6}", ensemble.reduced_density());
    info!("  Acceptance ratio:       {:.6}", ensemble.acceptance_ratio());
    info!("  g(contact):             {:.6}", g_contact);
    info!(
        "  PA/NkT:                 {:.6}",
        hard_disk_pressure(g_contact, ensemble.density(), diameter)
    );
}

pub fn report_lennard_jones(ensemble: &LennardJonesEnsemble) {
    info!("\nLennard-Jones run finished.");
    info!("  Particles:              {}", ensemble.n_particles());
    info!("  Temperature:            {:.6}", ensemble.temperature());
    info!("  Number density:         {:.6}", ensemble.density());
    info!("  Acceptance ratio:       {:.6}", ensemble.acceptance_ratio());
    info!("  PV/NkT:                 {:.6}", ensemble.mean_pressure());
    info!("  Specific heat:          {:.6}", ensemble.specific_heat());
    info!(
        "  Energy per particle:    {:.6}",
        ensemble.mean_energy_per_particle()
    );
}

pub fn report_replicas(results: &[hdmc::Result<ReplicaResult>]) {
    info!("\nReplica summary:");
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(result) => {
                let observables = match &result.observables {
                    Observables::HardDisks {
                        radius,
                        area_fraction,
                        contact_pressure,
                    } => format!(
                        "radius {:.4}, area fraction {:.4}, PA/NkT {:.4}",
                        radius, area_fraction, contact_pressure
                    ),
                    Observables::LennardJones {
                        mean_pressure,
                        specific_heat,
                        mean_energy_per_particle,
                    } => format!(
                        "PV/NkT {:.4}, C {:.4}, U/N {:.4}",
                        mean_pressure, specific_heat, mean_energy_per_particle
                    ),
                };
                info!(
                    "  Replica {:>2}: density {:.4}, acceptance {:.4}, {}",
                    i + 1,
                    result.density,
                    result.acceptance_ratio,
                    observables
                );
            }
            Err(err) => warn!("  Replica {:>2} failed: {}", i + 1, err),
        }
    }
}
