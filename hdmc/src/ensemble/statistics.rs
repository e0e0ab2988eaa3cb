use serde::Serialize;

/// Trial/acceptance counters of a Monte Carlo run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MoveStatistics {
    /// Number of trial moves attempted
    pub trials: u64,
    /// Number of trial moves accepted
    pub accepted: u64,
}

impl MoveStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, accepted: bool) {
        self.trials += 1;
        if accepted {
            self.accepted += 1;
        }
    }

    /// Fraction of accepted trial moves, zero before the first trial
    pub fn acceptance_ratio(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.accepted as f64 / self.trials as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_acceptance_ratio() {
        let mut stats = MoveStatistics::new();
        assert_eq!(stats.acceptance_ratio(), 0.0);

        stats.record(true);
        stats.record(false);
        stats.record(true);
        stats.record(true);
        assert_eq!(stats.trials, 4);
        assert_eq!(stats.accepted, 3);
        assert_relative_eq!(stats.acceptance_ratio(), 0.75);

        stats.reset();
        assert_eq!(stats, MoveStatistics::default());
    }
}
