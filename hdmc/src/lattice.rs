//! Initial particle configurations.
//!
//! Lattices are filled line by line with `ceil(sqrt(N))` sites per line, so a
//! particle count that is not a perfect square leaves the last line partially
//! filled.

use crate::cell::SimulationCell;
use crate::error::PlacementError;
use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[serde(alias = "triangular")]
    Hexagonal,
    Rectangular,
    Random,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hexagonal" | "triangular" => Ok(Layout::Hexagonal),
            "rectangular" => Ok(Layout::Rectangular),
            "random" => Ok(Layout::Random),
            other => Err(format!("unknown layout: {other}")),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Hexagonal => "hexagonal",
            Layout::Rectangular => "rectangular",
            Layout::Random => "random",
        };
        f.write_str(name)
    }
}

/// Number of lattice sites per line for `n` particles.
pub fn sites_per_line(n: usize) -> usize {
    let root = (n as f64).sqrt();
    let mut ns = root as usize;
    if root - ns as f64 > 0.001 {
        ns += 1;
    }
    ns.max(1)
}

/// Rectangular lattice; site `k` sits in column `k / ns`, row `k % ns`.
pub fn rectangular_lattice(n: usize, cell: &SimulationCell) -> Vec<Vector2<f64>> {
    let ns = sites_per_line(n);
    let dx = cell.lx / ns as f64;
    let dy = cell.ly / ns as f64;

    (0..n)
        .map(|k| {
            let (ix, iy) = (k / ns, k % ns);
            Vector2::new(dx * (ix as f64 + 0.5), dy * (iy as f64 + 0.5))
        })
        .collect()
}

/// Hexagonal (triangular) lattice; odd rows are shifted by half a spacing.
pub fn hexagonal_lattice(n: usize, cell: &SimulationCell) -> Vec<Vector2<f64>> {
    let ns = sites_per_line(n);
    let ax = cell.lx / ns as f64;
    let ay = cell.ly / ns as f64;

    (0..n)
        .map(|k| {
            let (iy, ix) = (k / ns, k % ns);
            let shift = if iy % 2 == 0 { 0.25 } else { 0.75 };
            Vector2::new(ax * (ix as f64 + shift), ay * (iy as f64 + 0.5))
        })
        .collect()
}

/// Place `n` particles uniformly at random, no two closer than `min_distance`.
///
/// Each particle gets at most `max_attempts` candidate sites.
pub fn random_positions<R: Rng + ?Sized>(
    n: usize,
    cell: &SimulationCell,
    min_distance: f64,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Vec<Vector2<f64>>, PlacementError> {
    let min_r2 = min_distance * min_distance;
    let mut positions: Vec<Vector2<f64>> = Vec::with_capacity(n);

    for index in 0..n {
        let site = (0..max_attempts)
            .map(|_| cell.random_position(rng))
            .find(|candidate| {
                positions
                    .iter()
                    .all(|placed| cell.distance_squared(candidate, placed) >= min_r2)
            })
            .ok_or(PlacementError {
                index,
                attempts: max_attempts,
            })?;
        positions.push(site);
    }

    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sites_per_line() {
        assert_eq!(sites_per_line(1), 1);
        assert_eq!(sites_per_line(4), 2);
        assert_eq!(sites_per_line(5), 3);
        assert_eq!(sites_per_line(64), 8);
        assert_eq!(sites_per_line(65), 9);
    }

    #[test]
    fn test_rectangular_lattice_two_by_two() {
        let cell = SimulationCell::square(10.0).unwrap();
        let positions = rectangular_lattice(4, &cell);
        let expected = [(2.5, 2.5), (2.5, 7.5), (7.5, 2.5), (7.5, 7.5)];
        for (pos, (x, y)) in positions.iter().zip(expected) {
            assert_relative_eq!(pos.x, x, epsilon = 1e-12);
            assert_relative_eq!(pos.y, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rectangular_lattice_partial_line() {
        let cell = SimulationCell::square(9.0).unwrap();
        let positions = rectangular_lattice(7, &cell);
        assert_eq!(positions.len(), 7);
        // the third column only holds one site
        let last_column = positions.iter().filter(|p| p.x > 6.0).count();
        assert_eq!(last_column, 1);
        assert_relative_eq!(cell.min_separation(&positions), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hexagonal_lattice_rows_are_staggered() {
        let cell = SimulationCell::square(8.0).unwrap();
        let positions = hexagonal_lattice(16, &cell);
        assert_eq!(positions.len(), 16);
        assert_relative_eq!(positions[0].x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(positions[0].y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(positions[4].x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(positions[4].y, 3.0, epsilon = 1e-12);
        assert!(positions.iter().all(|p| cell.contains(p)));
    }

    #[test]
    fn test_random_positions_respect_min_distance() {
        let cell = SimulationCell::square(20.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let positions = random_positions(50, &cell, 1.0, 10_000, &mut rng).unwrap();
        assert_eq!(positions.len(), 50);
        assert!(cell.min_separation(&positions) >= 1.0);
        assert!(positions.iter().all(|p| cell.contains(p)));
    }

    #[test]
    fn test_random_positions_give_up() {
        let cell = SimulationCell::square(2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = random_positions(10, &cell, 1.5, 100, &mut rng).unwrap_err();
        assert_eq!(err.attempts, 100);
        assert!(err.index >= 1);
    }

    #[test]
    fn test_layout_parsing() {
        assert_eq!("triangular".parse::<Layout>(), Ok(Layout::Hexagonal));
        assert_eq!("Random".parse::<Layout>(), Ok(Layout::Random));
        assert!("cubic".parse::<Layout>().is_err());
    }
}
