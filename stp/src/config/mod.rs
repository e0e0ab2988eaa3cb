//! Configuration management for Monte Carlo runs
//!
//! This module handles the YAML run description, its defaults and validation,
//! and the translation into ensemble parameters.

mod args;

pub use args::Args;

use hdmc::{
    HardDiskParams, Layout, LennardJonesParams, Replica, SimulationCell, SystemParams,
};
use serde::{Deserialize, Serialize};

const DEFAULT_RADIUS: f64 = 0.5;
const DEFAULT_TEMPERATURE: f64 = 1.0;
const DEFAULT_STEP_SIZE: f64 = 0.1;
const DEFAULT_COMPRESSION_FACTOR: f64 = 1.0;
const DEFAULT_PLACEMENT_ATTEMPTS: usize = 10_000;
const DEFAULT_EQUILIBRATION_SWEEPS: usize = 100;
const DEFAULT_PRODUCTION_SWEEPS: usize = 1000;
const DEFAULT_REPORT_INTERVAL: usize = 100;
const DEFAULT_BIN_WIDTH: f64 = 0.1;

/// Main configuration structure for a run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub system: SystemConfig,
    #[serde(default)]
    pub run: RunParams,
    #[serde(default)]
    pub rdf: RdfParams,
    /// Independent runs that differ from `system` in cell size, radius or temperature
    #[serde(default)]
    pub replicas: Vec<ReplicaOverrides>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemKind {
    HardDisks,
    LennardJones,
}

/// Particles and cell
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemConfig {
    pub kind: SystemKind,
    pub n_particles: usize,
    pub lx: f64,
    /// Defaults to `lx` (square cell)
    pub ly: Option<f64>,
    pub layout: Option<Layout>,
    pub radius: Option<f64>,
    pub temperature: Option<f64>,
    pub step_size: Option<f64>,
    pub compression_factor: Option<f64>,
    pub max_placement_attempts: Option<usize>,
}

impl SystemConfig {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.ly.is_none() {
            self.ly = Some(self.lx);
        }
        if self.layout.is_none() {
            self.layout = Some(Layout::Hexagonal);
        }
        if self.radius.is_none() {
            self.radius = Some(DEFAULT_RADIUS);
        }
        if self.temperature.is_none() {
            self.temperature = Some(DEFAULT_TEMPERATURE);
        }
        if self.step_size.is_none() {
            self.step_size = Some(DEFAULT_STEP_SIZE);
        }
        if self.compression_factor.is_none() {
            self.compression_factor = Some(DEFAULT_COMPRESSION_FACTOR);
        }
        if self.max_placement_attempts.is_none() {
            self.max_placement_attempts = Some(DEFAULT_PLACEMENT_ATTEMPTS);
        }
        self
    }
}

/// Sweep counts and seeding
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunParams {
    pub equilibration_sweeps: Option<usize>,
    pub production_sweeps: Option<usize>,
    /// Sweeps between progress reports
    pub report_interval: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        RunParams {
            equilibration_sweeps: Some(DEFAULT_EQUILIBRATION_SWEEPS),
            production_sweeps: Some(DEFAULT_PRODUCTION_SWEEPS),
            report_interval: Some(DEFAULT_REPORT_INTERVAL),
            seed: None,
        }
    }
}

impl RunParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.equilibration_sweeps.is_none() {
            self.equilibration_sweeps = defaults.equilibration_sweeps;
        }
        if self.production_sweeps.is_none() {
            self.production_sweeps = defaults.production_sweeps;
        }
        if self.report_interval.is_none() {
            self.report_interval = defaults.report_interval;
        }
        self
    }
}

/// Radial distribution function parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RdfParams {
    pub bin_width: Option<f64>,
    pub periodic: Option<bool>,
}

impl Default for RdfParams {
    fn default() -> Self {
        RdfParams {
            bin_width: Some(DEFAULT_BIN_WIDTH),
            periodic: Some(true),
        }
    }
}

impl RdfParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.bin_width.is_none() {
            self.bin_width = defaults.bin_width;
        }
        if self.periodic.is_none() {
            self.periodic = defaults.periodic;
        }
        self
    }
}

/// Per-replica changes to the base system
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReplicaOverrides {
    pub lx: Option<f64>,
    pub ly: Option<f64>,
    pub radius: Option<f64>,
    pub temperature: Option<f64>,
    pub seed: Option<u64>,
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.system = self.system.with_defaults();
        self.run = self.run.with_defaults();
        self.rdf = self.rdf.with_defaults();
        self
    }

    /// Command-line values take precedence over the file
    pub fn with_overrides(mut self, args: &Args) -> Self {
        if let Some(sweeps) = args.sweeps {
            self.run.production_sweeps = Some(sweeps);
        }
        if let Some(sweeps) = args.equilibration {
            self.run.equilibration_sweeps = Some(sweeps);
        }
        if let Some(step_size) = args.step_size {
            self.system.step_size = Some(step_size);
        }
        if args.seed.is_some() {
            self.run.seed = args.seed;
        }
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        let system = &self.system;
        if system.n_particles == 0 {
            return Err("Number of particles must be positive".to_string());
        }
        if system.lx <= 0.0 || self.ly() <= 0.0 {
            return Err("Cell lengths must be positive".to_string());
        }
        match system.kind {
            SystemKind::HardDisks => {
                if self.radius() <= 0.0 {
                    return Err("Disk radius must be positive".to_string());
                }
                if self.compression_factor() <= 0.0 {
                    return Err("Compression factor must be positive".to_string());
                }
            }
            SystemKind::LennardJones => {
                if self.temperature() <= 0.0 {
                    return Err("Temperature must be positive".to_string());
                }
            }
        }
        if self.step_size() < 0.0 {
            return Err("Step size must not be negative".to_string());
        }
        if self.bin_width() <= 0.0 {
            return Err("Bin width must be positive".to_string());
        }
        if self.production_sweeps() == 0 {
            return Err("Production sweeps must be positive".to_string());
        }
        if self.report_interval() == 0 {
            return Err("Report interval must be positive".to_string());
        }

        for (i, replica) in self.replicas.iter().enumerate() {
            let values = [replica.lx, replica.ly, replica.radius, replica.temperature];
            if values.iter().flatten().any(|&value| value <= 0.0) {
                return Err(format!("Replica {} has a non-positive override", i + 1));
            }
            match system.kind {
                SystemKind::HardDisks if replica.temperature.is_some() => {
                    return Err(format!(
                        "Replica {} overrides temperature, which hard disks do not use",
                        i + 1
                    ));
                }
                SystemKind::LennardJones if replica.radius.is_some() => {
                    return Err(format!(
                        "Replica {} overrides radius, which Lennard-Jones particles do not use",
                        i + 1
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn ly(&self) -> f64 {
        self.system.ly.unwrap_or(self.system.lx)
    }

    pub fn layout(&self) -> Layout {
        self.system.layout.unwrap_or(Layout::Hexagonal)
    }

    pub fn radius(&self) -> f64 {
        self.system.radius.unwrap_or(DEFAULT_RADIUS)
    }

    pub fn temperature(&self) -> f64 {
        self.system.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn step_size(&self) -> f64 {
        self.system.step_size.unwrap_or(DEFAULT_STEP_SIZE)
    }

    pub fn compression_factor(&self) -> f64 {
        self.system
            .compression_factor
            .unwrap_or(DEFAULT_COMPRESSION_FACTOR)
    }

    pub fn max_placement_attempts(&self) -> usize {
        self.system
            .max_placement_attempts
            .unwrap_or(DEFAULT_PLACEMENT_ATTEMPTS)
    }

    pub fn equilibration_sweeps(&self) -> usize {
        self.run
            .equilibration_sweeps
            .unwrap_or(DEFAULT_EQUILIBRATION_SWEEPS)
    }

    pub fn production_sweeps(&self) -> usize {
        self.run
            .production_sweeps
            .unwrap_or(DEFAULT_PRODUCTION_SWEEPS)
    }

    pub fn report_interval(&self) -> usize {
        self.run.report_interval.unwrap_or(DEFAULT_REPORT_INTERVAL)
    }

    pub fn bin_width(&self) -> f64 {
        self.rdf.bin_width.unwrap_or(DEFAULT_BIN_WIDTH)
    }

    pub fn periodic_rdf(&self) -> bool {
        self.rdf.periodic.unwrap_or(true)
    }

    /// Ensemble parameters of the base system
    pub fn system_params(&self) -> hdmc::Result<SystemParams> {
        self.params_with(&ReplicaOverrides::default())
    }

    /// Ensemble parameters with one replica's overrides applied
    pub fn params_with(&self, overrides: &ReplicaOverrides) -> hdmc::Result<SystemParams> {
        let lx = overrides.lx.unwrap_or(self.system.lx);
        // a replica that only changes lx keeps the base aspect ratio
        let ly = overrides
            .ly
            .unwrap_or_else(|| lx * self.ly() / self.system.lx);
        let cell = SimulationCell::new(lx, ly)?;
        let n = self.system.n_particles;

        let params = match self.system.kind {
            SystemKind::HardDisks => {
                let radius = overrides.radius.unwrap_or_else(|| self.radius());
                let mut params = HardDiskParams::new(n, cell, radius, self.layout());
                params.step_size = self.step_size();
                params.compression_factor = self.compression_factor();
                params.max_placement_attempts = self.max_placement_attempts();
                params.validate()?;
                SystemParams::HardDisks(params)
            }
            SystemKind::LennardJones => {
                let temperature = overrides.temperature.unwrap_or_else(|| self.temperature());
                let mut params = LennardJonesParams::new(n, cell, temperature, self.layout());
                params.step_size = self.step_size();
                params.max_placement_attempts = self.max_placement_attempts();
                params.validate()?;
                SystemParams::LennardJones(params)
            }
        };
        Ok(params)
    }

    /// One replica per override entry; unseeded entries derive a seed from the run seed.
    pub fn replica_set(&self) -> hdmc::Result<Vec<Replica>> {
        self.replicas
            .iter()
            .enumerate()
            .map(|(i, overrides)| {
                Ok(Replica {
                    system: self.params_with(overrides)?,
                    bin_width: self.bin_width(),
                    periodic: self.periodic_rdf(),
                    seed: overrides
                        .seed
                        .or_else(|| self.run.seed.map(|seed| seed.wrapping_add(i as u64))),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = "
system:
  kind: hard_disks
  n_particles: 64
  lx: 16.0
";

    fn parse(yaml: &str) -> Config {
        serde_yml::from_str::<Config>(yaml).unwrap().with_defaults()
    }

    #[test]
    fn test_defaults_fill_missing_values() {
        let config = parse(MINIMAL);
        assert_eq!(config.system.ly, Some(16.0));
        assert_eq!(config.layout(), Layout::Hexagonal);
        assert_eq!(config.radius(), 0.5);
        assert_eq!(config.step_size(), 0.1);
        assert_eq!(config.equilibration_sweeps(), 100);
        assert_eq!(config.production_sweeps(), 1000);
        assert_eq!(config.bin_width(), 0.1);
        assert!(config.periodic_rdf());
        assert!(config.replicas.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "
system:
  kind: lennard_jones
  n_particles: 25
  lx: 10.0
  ly: 8.0
  layout: triangular
  temperature: 2.0
  step_size: 0.3
run:
  equilibration_sweeps: 10
  production_sweeps: 50
  report_interval: 5
  seed: 7
rdf:
  bin_width: 0.05
  periodic: false
replicas:
  - temperature: 1.0
  - temperature: 3.0
    seed: 99
"
        )
        .unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let config = parse(&content);
        assert!(config.validate().is_ok());
        assert_eq!(config.system.kind, SystemKind::LennardJones);
        assert_eq!(config.layout(), Layout::Hexagonal);
        assert!(!config.periodic_rdf());

        match config.system_params().unwrap() {
            SystemParams::LennardJones(params) => {
                assert_eq!(params.cell, SimulationCell::new(10.0, 8.0).unwrap());
                assert_eq!(params.temperature, 2.0);
                assert_eq!(params.step_size, 0.3);
            }
            other => panic!("unexpected system {other:?}"),
        }

        let replicas = config.replica_set().unwrap();
        assert_eq!(replicas.len(), 2);
        assert_eq!(replicas[0].seed, Some(7));
        assert_eq!(replicas[1].seed, Some(99));
        assert_eq!(replicas[0].bin_width, 0.05);
    }

    #[test]
    fn test_validation() {
        let mut config = parse(MINIMAL);

        config.system.radius = Some(-0.5);
        assert!(config.validate().is_err());
        config.system.radius = Some(0.5);

        config.rdf.bin_width = Some(0.0);
        assert!(config.validate().is_err());
        config.rdf.bin_width = Some(0.1);

        config.system.n_particles = 0;
        assert!(config.validate().is_err());
        config.system.n_particles = 64;

        config.replicas.push(ReplicaOverrides {
            lx: Some(-3.0),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_replica_overrides_must_match_system_kind() {
        let mut config = parse(MINIMAL);
        config.replicas.push(ReplicaOverrides {
            radius: Some(0.6),
            ..Default::default()
        });
        assert!(config.validate().is_ok());

        config.replicas.push(ReplicaOverrides {
            temperature: Some(2.0),
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.contains("Replica 2"), "{err}");

        config.system.kind = SystemKind::LennardJones;
        config.replicas.remove(0);
        assert!(config.validate().is_ok());

        config.replicas.push(ReplicaOverrides {
            radius: Some(0.6),
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.contains("radius"), "{err}");
    }

    #[test]
    fn test_command_line_overrides() {
        let args = Args::parse_from([
            "stp",
            "--sweeps",
            "20",
            "--equilibration",
            "3",
            "--step-size",
            "0.25",
            "--seed",
            "11",
        ]);
        let config = parse(MINIMAL).with_overrides(&args);
        assert_eq!(config.production_sweeps(), 20);
        assert_eq!(config.equilibration_sweeps(), 3);
        assert_eq!(config.step_size(), 0.25);
        assert_eq!(config.run.seed, Some(11));
    }

    #[test]
    fn test_replica_keeps_aspect_ratio() {
        let mut config = parse(MINIMAL);
        config.system.ly = Some(8.0);
        let overrides = ReplicaOverrides {
            lx: Some(32.0),
            radius: Some(0.6),
            ..Default::default()
        };
        match config.params_with(&overrides).unwrap() {
            SystemParams::HardDisks(params) => {
                assert_eq!(params.cell, SimulationCell::new(32.0, 16.0).unwrap());
                assert_eq!(params.radius, 0.6);
            }
            other => panic!("unexpected system {other:?}"),
        }
    }
}
