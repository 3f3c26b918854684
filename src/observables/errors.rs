//! observables::errors — error type for feature maps and their diagnostics.
//!
//! Purpose
//! -------
//! Collect every failure an observable can report (construction, numeric
//! evaluation, algebra, configuration parsing, finite-difference checks) in
//! one enum so that callers and the Python layer see a uniform surface.
//!
//! Key behaviors
//! -------------
//! - [`ObsError`] variants carry the offending sizes or names, with a
//!   human-readable `Display`.
//! - `From<SymbolicError>` and `From<ndarray::ShapeError>` let internal code
//!   use `?` across the symbolic and array layers.
//! - With `python-bindings`, `From<ObsError> for PyErr` raises `ValueError`.
//!
//! Conventions
//! -----------
//! - Sizes are reported as `expected` / `found` pairs.
//! - Backend errors are flattened to their message (`text`) so `ObsError`
//!   stays `Clone + PartialEq`.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::symbolic::errors::SymbolicError;

/// Result alias for observable operations.
pub type ObsResult<T> = Result<T, ObsError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ObsError {
    // ---- Construction ----
    /// Expression row references a variable that was not declared.
    UndeclaredVariable {
        name: String,
        row: usize,
    },

    /// The same variable name was declared twice.
    DuplicateVariable {
        name: String,
    },

    /// A combination needs at least one child.
    EmptyCombination,

    // ---- Evaluation ----
    /// State length differs from the declared input dimension.
    StateDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Observable does not provide a Jacobian.
    GradientNotSupported {
        observable: String,
    },

    /// Child Jacobian column count differs from the state length.
    JacobianColumnMismatch {
        child: usize,
        expected: usize,
        found: usize,
    },

    // ---- Algebra ----
    /// Elementwise operation between observables with different row counts.
    LengthMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    // ---- Diagnostics ----
    /// Jacobian entry is NaN or infinite.
    NonFiniteJacobian {
        row: usize,
        col: usize,
        value: f64,
    },

    /// Gradient-check tolerance must be finite and positive.
    InvalidTolerance {
        tol: f64,
        reason: &'static str,
    },

    // ---- Configuration ----
    /// Unknown option name.
    InvalidOption {
        name: String,
        reason: &'static str,
    },

    // ---- Backends ----
    Symbolic {
        text: String,
    },
    ArrayShape {
        text: String,
    },
}

impl std::error::Error for ObsError {}

impl std::fmt::Display for ObsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            ObsError::UndeclaredVariable { name, row } => {
                write!(f, "Expression at row {row} references undeclared variable '{name}'")
            }
            ObsError::DuplicateVariable { name } => {
                write!(f, "Variable '{name}' is declared more than once")
            }
            ObsError::EmptyCombination => {
                write!(f, "A combined observable needs at least one child")
            }

            // ---- Evaluation ----
            ObsError::StateDimMismatch { expected, found } => {
                write!(f, "State dimension mismatch: expected {expected}, found {found}")
            }
            ObsError::GradientNotSupported { observable } => {
                write!(f, "Observable '{observable}' does not provide a gradient")
            }
            ObsError::JacobianColumnMismatch { child, expected, found } => {
                write!(
                    f,
                    "Jacobian of child {child} has {found} columns, expected {expected} (state length)"
                )
            }

            // ---- Algebra ----
            ObsError::LengthMismatch { op, left, right } => {
                write!(f, "Cannot {op} observables of lengths {left} and {right}")
            }

            // ---- Diagnostics ----
            ObsError::NonFiniteJacobian { row, col, value } => {
                write!(f, "Non-finite Jacobian entry at ({row}, {col}): {value}")
            }
            ObsError::InvalidTolerance { tol, reason } => {
                write!(f, "Invalid tolerance {tol}: {reason}")
            }

            // ---- Configuration ----
            ObsError::InvalidOption { name, reason } => {
                write!(f, "Invalid option '{name}': {reason}")
            }

            // ---- Backends ----
            ObsError::Symbolic { text } => write!(f, "Symbolic error: {text}"),
            ObsError::ArrayShape { text } => write!(f, "Array shape error: {text}"),
        }
    }
}

impl From<SymbolicError> for ObsError {
    fn from(err: SymbolicError) -> Self {
        match err {
            SymbolicError::ArityMismatch { expected, found } => {
                ObsError::StateDimMismatch { expected, found }
            }
            other => ObsError::Symbolic { text: other.to_string() },
        }
    }
}

impl From<ndarray::ShapeError> for ObsError {
    fn from(err: ndarray::ShapeError) -> Self {
        ObsError::ArrayShape { text: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ObsError> for PyErr {
    fn from(err: ObsError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
