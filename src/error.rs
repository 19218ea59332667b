//! Error types.
//!
//! Domain errors are small `thiserror` enums, one per failure class:
//!
//! - `ConfigurationError`: coefficients or run settings that cannot produce a
//!   valid simulation (fatal, raised before any sampling)
//! - `SamplingError`: a malformed structural model (fatal, raised when the
//!   model is constructed)
//! - `EstimationError`: a single estimator failed on a single replicate
//!   (recovered locally as a missing cell)
//! - `AggregationError`: a model column cannot be summarized (reported per row)
//!
//! The binary boundary keeps a single `AppError` carrying an exit code.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("negative residual variance {residual:.6} for '{variable}' (explained variance exceeds 1)")]
    NegativeResidualVariance { variable: String, residual: f64 },

    #[error("pass-through variable '{variable}' explains {explained:.6} of its variance (must be exactly 1)")]
    PassThroughNotUnit { variable: String, explained: f64 },

    #[error("sample size must be > 0")]
    EmptySample,

    #[error("precision must be <= {max} decimals, got {got}")]
    Precision { got: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    #[error("duplicate variable '{0}'")]
    DuplicateVariable(String),

    #[error("variable '{variable}' references unknown parent '{parent}'")]
    UnknownParent { variable: String, parent: String },

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("structural model has a cycle through: {}", .remaining.join(", "))]
    Cycle { remaining: Vec<String> },

    #[error("reporting transform given before any variable was declared")]
    ReportWithoutVariable,

    #[error("variable '{variable}' has {parents} parents but {coefficients} coefficients")]
    CoefficientMismatch {
        variable: String,
        parents: usize,
        coefficients: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("{model}: design has {rows} rows for {columns} columns")]
    TooFewRows {
        model: &'static str,
        rows: usize,
        columns: usize,
    },

    #[error("{model}: least squares system is singular or ill-conditioned")]
    Singular { model: &'static str },

    #[error("{model}: non-finite estimate")]
    NonFinite { model: &'static str },

    #[error("{model}: missing column '{column}'")]
    MissingColumn { model: &'static str, column: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("{model}: only {available} non-missing estimates (need at least {required})")]
    TooFewValues {
        model: String,
        available: usize,
        required: usize,
    },
}

/// Fatal errors surfaced by the simulation pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("sampling error: {0}")]
    Sampling(#[from] SamplingError),

    #[error("simulation driver already ran; create a new driver for another run")]
    AlreadyRan,
}

impl SimError {
    pub fn exit_code(&self) -> u8 {
        match self {
            SimError::Configuration(_) => 2,
            SimError::Sampling(_) => 3,
            SimError::AlreadyRan => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl From<ConfigurationError> for AppError {
    fn from(err: ConfigurationError) -> Self {
        SimError::from(err).into()
    }
}

impl From<SamplingError> for AppError {
    fn from(err: SamplingError) -> Self {
        SimError::from(err).into()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_errors_map_to_exit_codes() {
        let err: AppError = ConfigurationError::EmptySample.into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("sample size"));

        let err: AppError = SamplingError::Cycle {
            remaining: vec!["a".to_string(), "b".to_string()],
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("a, b"), "got: {err}");
    }
}
