//! Two-dimensional Monte Carlo of hard disks and Lennard-Jones particles in a
//! periodic cell, with a radial distribution function accumulator.

pub mod cell;
pub mod ensemble;
pub mod error;
pub mod lattice;
pub mod lj;
pub mod rdf;
pub mod sweep;

pub use cell::SimulationCell;
pub use ensemble::{
    make_rng, HardDiskEnsemble, HardDiskParams, MonteCarloEnsemble, MoveStatistics, TrialMove,
};
pub use error::{ConfigurationError, PlacementError, Result, SimulationError};
pub use lattice::Layout;
pub use lj::{LennardJonesEnsemble, LennardJonesParams};
pub use rdf::{hard_disk_pressure, RadialDistribution};
pub use sweep::{run_replicas, Observables, Replica, ReplicaResult, SystemParams};
