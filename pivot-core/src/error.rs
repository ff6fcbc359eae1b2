//! Error types for the core engine.

use thiserror::Error;

/// Structural model defects detected before solving.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The objective name is empty or has no definition in `variables`.
    #[error("missing objective: {0}")]
    MissingObjective(String),

    /// A constraint, flag, or combination references an unknown name.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// A variable carries mutually exclusive domain flags.
    #[error("conflicting domain for variable {0}")]
    ConflictingDomain(String),

    /// A constraint record is empty or internally inconsistent.
    #[error("malformed constraint {name}: {detail}")]
    MalformedConstraint {
        /// Constraint key.
        name: String,
        /// What is wrong with it.
        detail: String,
    },
}

/// Errors raised to the caller by `solve` entry points.
///
/// Solver-state outcomes (infeasible, unbounded, cycle, timeout) are never
/// errors; they are reported in-band through [`crate::SolveStatus`].
#[derive(Error, Debug)]
pub enum SolveError {
    /// Model validation failed.
    #[error("invalid model: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, SolveError>;
