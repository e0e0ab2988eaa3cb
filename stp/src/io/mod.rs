//! Input/Output operations for Monte Carlo runs
//!
//! This module handles logging setup and the g(r) and position tables.

mod output;

pub use output::{setup_output, write_positions, write_rdf_table, write_to_file};
