//! Error type shared by quadrature and scaling code
use thiserror::Error;

pub type CollocationResult<T> = std::result::Result<T, CollocationError>;

#[derive(Debug, Error)]
pub enum CollocationError {
    // ---- quadrature ----
    #[error("quadrature order must be at least 2, got {0}")]
    InvalidOrder(usize),
    #[error("unsupported quadrature scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Legendre root finding did not converge (degree {degree}, root #{index})")]
    RootFindingFailed { degree: usize, index: usize },
    #[error("singular {0} matrix")]
    SingularMatrix(&'static str),

    // ---- scaling ----
    #[error("unsupported scaling method: {0}")]
    UnsupportedMethod(String),
    #[error("not supported: {0}")]
    NotSupported(&'static str),
    #[error("zero-width bounds for variable slot {slot} (lower = upper = {value})")]
    DegenerateBounds { slot: usize, value: f64 },
    #[error("invalid bounds for slot {slot}: lower = {lower}, upper = {upper}")]
    InvalidBounds { slot: usize, lower: f64, upper: f64 },
    #[error("objective gradient norm is {0} at the guess, objective scale cannot be computed")]
    DegenerateGradient(f64),
    #[error("dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    // ---- mesh and configuration ----
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("csv output failed: {0}")]
    Csv(#[from] csv::Error),
}

impl CollocationError {
    pub(crate) fn dimension(what: &'static str, expected: usize, found: usize) -> Self {
        CollocationError::DimensionMismatch {
            what,
            expected,
            found,
        }
    }
}

/// `Ok(())` if `found == expected`, `DimensionMismatch` otherwise
pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> CollocationResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(CollocationError::dimension(what, expected, found))
    }
}
