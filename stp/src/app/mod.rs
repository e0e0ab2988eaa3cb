mod report;
mod runner;

use self::report::{report_hard_disks, report_lennard_jones, report_replicas};
use self::runner::{run_ensemble, RunSchedule};
use crate::config::{Args, Config};
use crate::io::{setup_output, write_positions, write_rdf_table, write_to_file};
use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use hdmc::{
    make_rng, run_replicas, HardDiskEnsemble, LennardJonesEnsemble, MonteCarloEnsemble,
    RadialDistribution, SimulationCell, SystemParams,
};
use std::fs;
use tracing::info;

pub struct StpApplication {
    args: Args,
    config: Config,
}

impl StpApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Configuration loaded:\n{:?}", self.config);

        if self.config.replicas.is_empty() {
            self.run_single()
        } else {
            self.run_replica_set()
        }
    }

    fn run_single(&self) -> Result<()> {
        let schedule = RunSchedule::from_config(&self.config);
        let rng = make_rng(self.config.run.seed);

        match self.config.system_params()? {
            SystemParams::HardDisks(params) => {
                let mut ensemble = HardDiskEnsemble::from_params(&params, rng)?;
                let mut rdf = self.distribution(params.cell)?;
                run_ensemble(&mut ensemble, &mut rdf, &schedule);
                report_hard_disks(&ensemble, &rdf);
                self.write_outputs(&ensemble, &rdf)
            }
            SystemParams::LennardJones(params) => {
                let mut ensemble = LennardJonesEnsemble::from_params(&params, rng)?;
                let mut rdf = self.distribution(params.cell)?;
                run_ensemble(&mut ensemble, &mut rdf, &schedule);
                report_lennard_jones(&ensemble);
                self.write_outputs(&ensemble, &rdf)
            }
        }
    }

    fn run_replica_set(&self) -> Result<()> {
        let replicas = self.config.replica_set()?;
        info!(
            "Running {} replicas: {} equilibration and {} production sweeps each",
            replicas.len(),
            self.config.equilibration_sweeps(),
            self.config.production_sweeps()
        );

        let results = run_replicas(
            &replicas,
            self.config.equilibration_sweeps(),
            self.config.production_sweeps(),
        );
        report_replicas(&results);

        if let Some(path) = &self.args.gr_output {
            for (i, result) in results.iter().enumerate() {
                if let Ok(result) = result {
                    write_to_file(&format!("{}.{}", path, i + 1), |w| {
                        write_rdf_table(w, &result.radii, &result.g_of_r)
                    })?;
                }
            }
        }

        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed > 0 {
            return Err(eyre!("{} of {} replicas failed", failed, results.len()));
        }
        Ok(())
    }

    fn distribution(&self, cell: SimulationCell) -> Result<RadialDistribution> {
        let mut rdf = RadialDistribution::for_cell(cell, self.config.bin_width())?;
        rdf.set_periodic(self.config.periodic_rdf());
        Ok(rdf)
    }

    fn write_outputs<E: MonteCarloEnsemble>(
        &self,
        ensemble: &E,
        rdf: &RadialDistribution,
    ) -> Result<()> {
        if let Some(path) = &self.args.gr_output {
            write_to_file(path, |w| write_rdf_table(w, &rdf.radii(), &rdf.normalize()))?;
        }
        if let Some(path) = &self.args.positions_output {
            write_to_file(path, |w| write_positions(w, ensemble.positions()))?;
        }
        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults()
        .with_overrides(args);

    config
        .validate()
        .map_err(|msg| eyre!("Invalid configuration: {}", msg))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_load_config_applies_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "system:\n  kind: hard_disks\n  n_particles: 4\n  lx: 10.0\n  layout: rectangular"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let args = Args::parse_from(["stp", "--config-file", path, "--sweeps", "30"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.production_sweeps(), 30);
        assert_eq!(config.equilibration_sweeps(), 100);
    }

    #[test]
    fn test_load_config_errors() {
        let args = Args::parse_from(["stp", "--config-file", "/nonexistent/run.yaml"]);
        assert!(load_config(&args).is_err());

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "system:\n  kind: hard_disks\n  n_particles: 0\n  lx: 10.0").unwrap();
        let args = Args::parse_from(["stp", "--config-file", file.path().to_str().unwrap()]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_single_run_writes_tables() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("run.yaml");
        fs::write(
            &config_path,
            "system:\n  kind: hard_disks\n  n_particles: 4\n  lx: 10.0\n  layout: rectangular\n\
             run:\n  equilibration_sweeps: 5\n  production_sweeps: 20\n  report_interval: 10\n  seed: 42\n",
        )
        .unwrap();
        let gr_path = dir.path().join("gr.dat");
        let positions_path = dir.path().join("positions.dat");

        let args = Args::parse_from([
            "stp",
            "--config-file",
            config_path.to_str().unwrap(),
            "--gr-output",
            gr_path.to_str().unwrap(),
            "--positions-output",
            positions_path.to_str().unwrap(),
        ]);
        let config = load_config(&args).unwrap();
        let app = StpApplication { args, config };
        app.run_single().unwrap();

        let table = fs::read_to_string(&gr_path).unwrap();
        // header plus 50 bins
        assert_eq!(table.lines().count(), 51);
        let positions = fs::read_to_string(&positions_path).unwrap();
        assert_eq!(positions.lines().count(), 5);
    }
}
