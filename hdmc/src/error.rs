use thiserror::Error;

/// Parameters that cannot describe a valid configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("an ensemble needs at least one particle")]
    NoParticles,
    #[error("cell length along {axis} must be positive, got {value}")]
    NonPositiveLength { axis: char, value: f64 },
    #[error("particle radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("step size must be non-negative, got {0}")]
    NegativeStepSize(f64),
    #[error("scale factor must be positive, got {0}")]
    NonPositiveScaleFactor(f64),
    #[error("temperature must be positive, got {0}")]
    NonPositiveTemperature(f64),
    #[error("bin width must be positive, got {0}")]
    NonPositiveBinWidth(f64),
    #[error("random placement needs at least one attempt per particle")]
    NoPlacementAttempts,
    #[error("closest pair at {min_separation:.6} is inside the disk diameter {diameter:.6}")]
    LatticeOverlap { min_separation: f64, diameter: f64 },
    #[error("coordinate slices differ in length: {xs} x values, {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },
}

/// Random placement ran out of attempts for one particle.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("no free site for particle {index} after {attempts} attempts")]
pub struct PlacementError {
    pub index: usize,
    pub attempts: usize,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
