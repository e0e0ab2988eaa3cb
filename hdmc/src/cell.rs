use crate::error::ConfigurationError;
use itertools::Itertools;
use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Periodic rectangular simulation cell spanning `[0, lx) x [0, ly)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationCell {
    pub lx: f64,
    pub ly: f64,
}

impl SimulationCell {
    pub fn new(lx: f64, ly: f64) -> Result<Self, ConfigurationError> {
        for (axis, value) in [('x', lx), ('y', ly)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigurationError::NonPositiveLength { axis, value });
            }
        }
        Ok(Self { lx, ly })
    }

    pub fn square(length: f64) -> Result<Self, ConfigurationError> {
        Self::new(length, length)
    }

    pub fn lengths(&self) -> Vector2<f64> {
        Vector2::new(self.lx, self.ly)
    }

    pub fn area(&self) -> f64 {
        self.lx * self.ly
    }

    pub fn min_length(&self) -> f64 {
        self.lx.min(self.ly)
    }

    /// Uniformly distributed point inside the cell.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector2<f64> {
        self.wrap(Vector2::new(
            self.lx * rng.gen::<f64>(),
            self.ly * rng.gen::<f64>(),
        ))
    }

    /// Minimum-image separation vector `a - b`.
    pub fn separation(&self, a: &Vector2<f64>, b: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            minimum_image(a.x - b.x, self.lx),
            minimum_image(a.y - b.y, self.ly),
        )
    }

    pub fn distance_squared(&self, a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
        self.separation(a, b).norm_squared()
    }

    pub fn wrap(&self, pos: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(wrap_coordinate(pos.x, self.lx), wrap_coordinate(pos.y, self.ly))
    }

    pub fn contains(&self, pos: &Vector2<f64>) -> bool {
        (0.0..self.lx).contains(&pos.x) && (0.0..self.ly).contains(&pos.y)
    }

    /// Smallest minimum-image distance over all pairs, capped at the shorter cell side.
    ///
    /// The cap holds for any N: a particle is never farther than `min_length` from
    /// its own periodic image, so this is the closest approach including images.
    /// With fewer than two particles it is exactly `min_length`. O(N^2).
    pub fn min_separation(&self, positions: &[Vector2<f64>]) -> f64 {
        positions
            .iter()
            .tuple_combinations()
            .map(|(a, b)| self.distance_squared(a, b))
            .fold(self.min_length().powi(2), f64::min)
            .sqrt()
    }
}

/// Fold a coordinate difference into `[-L/2, L/2]` with a single shift.
///
/// Differences between wrapped coordinates lie in `(-L, L)`, so one shift is enough.
pub fn minimum_image(ds: f64, length: f64) -> f64 {
    if ds > 0.5 * length {
        ds - length
    } else if ds < -0.5 * length {
        ds + length
    } else {
        ds
    }
}

/// Map a coordinate into `[0, L)`.
pub fn wrap_coordinate(s: f64, length: f64) -> f64 {
    let wrapped = s.rem_euclid(length);
    // rem_euclid rounds tiny negative inputs up to `length`
    if wrapped >= length {
        0.0
    } else {
        wrapped
    }
}
