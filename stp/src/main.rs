//! Headless driver for the hard-disk and Lennard-Jones Monte Carlo programs.
//!
//! Reads a YAML run description, equilibrates, samples g(r) and writes the
//! normalized table.

use color_eyre::eyre::Result;

mod app;
mod config;
mod io;

use app::StpApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    StpApplication::from_cli()?.run()
}
