//! Unified error type for the traffic morphing toolkit.
//!
//! Every crate in the workspace returns `Result<T, MorphError>` (or a
//! crate-local alias of it) so that `morph-cli` can map any failure to a
//! single diagnostic line and a distinct process exit code.

use thiserror::Error;

/// Tolerance used when validating that a probability vector sums to 1,
/// or that a matrix column sums to 1. Shared by `morph-dist` and
/// `morph-matrix` so the two validation paths agree on what "close
/// enough" means.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-5;

/// Values below this magnitude are clamped to zero when reading back an
/// LP solver's solution vector, per spec's numerical-tolerance policy.
pub const SOLVER_ZERO_CLAMP: f64 = 1e-9;

/// Tolerance for LP equality constraints (column-sum = 1, M*S = T).
pub const LP_EQUALITY_TOLERANCE: f64 = 1e-6;

/// Errors that can occur anywhere in the morphing pipeline, from
/// distribution parsing through LP solving to runtime sampling.
#[derive(Debug, Error)]
pub enum MorphError {
    /// A distribution or matrix text file did not match the expected
    /// `<index> <value>` line format.
    #[error("bad format: {0}")]
    BadFormat(String),

    /// A distribution's probabilities did not sum to 1 within tolerance.
    #[error("distribution not normalized: sum = {sum}, expected 1.0 +/- {tolerance}")]
    NotNormalized { sum: f64, tolerance: f64 },

    /// A matrix column did not sum to 1 within tolerance.
    #[error("matrix not column-stochastic: column {column} sums to {sum}")]
    NotStochastic { column: usize, sum: f64 },

    /// A distribution's length is not divisible by the requested partition count.
    #[error("cannot partition distribution of length {len} into {k} partitions")]
    BadPartition { len: usize, k: usize },

    /// The linear program has no feasible solution.
    #[error("linear program is infeasible")]
    Infeasible,

    /// The LP backend failed for a reason other than infeasibility.
    #[error("solver error: {0}")]
    SolverError(String),

    /// A filesystem or stream I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The caller passed an out-of-range index, negative probability, etc.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias used throughout the workspace.
pub type MorphResult<T> = Result<T, MorphError>;

/// Distinct process exit codes, one per [`MorphError`] variant, used by
/// the CLI binaries to satisfy the "distinct non-zero code per error
/// kind" requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    BadFormat = 1,
    NotNormalized = 2,
    NotStochastic = 3,
    BadPartition = 4,
    Infeasible = 5,
    SolverError = 6,
    IoError = 7,
    InvalidArgument = 8,
}

impl From<&MorphError> for ExitCode {
    fn from(err: &MorphError) -> Self {
        match err {
            MorphError::BadFormat(_) => ExitCode::BadFormat,
            MorphError::NotNormalized { .. } => ExitCode::NotNormalized,
            MorphError::NotStochastic { .. } => ExitCode::NotStochastic,
            MorphError::BadPartition { .. } => ExitCode::BadPartition,
            MorphError::Infeasible => ExitCode::Infeasible,
            MorphError::SolverError(_) => ExitCode::SolverError,
            MorphError::IoError(_) => ExitCode::IoError,
            MorphError::InvalidArgument(_) => ExitCode::InvalidArgument,
        }
    }
}
