//! observables::validation — shared input guards for feature maps.
//!
//! Purpose
//! -------
//! Centralize the checks every observable performs before touching compiled
//! evaluators or finite-difference routines, so error variants stay
//! consistent across symbolic, identity, and block observables.
//!
//! Key behaviors
//! -------------
//! - [`validate_state_dim`] rejects states whose length differs from the
//!   declared input dimension.
//! - [`validate_tolerance`] enforces finite, strictly positive tolerances.
//! - [`validate_jacobian`] checks shape and finiteness of a Jacobian.
//!
//! Conventions
//! -----------
//! - Pure functions, no allocation beyond error construction.
//! - Only the first offending entry is reported.
use crate::observables::{
    errors::{ObsError, ObsResult},
    types::Jacobian,
};

/// Fail with [`ObsError::StateDimMismatch`] unless `found == expected`.
pub fn validate_state_dim(expected: usize, found: usize) -> ObsResult<()> {
    if expected != found {
        return Err(ObsError::StateDimMismatch { expected, found });
    }
    Ok(())
}

/// Tolerances must be finite and strictly positive.
pub fn validate_tolerance(tol: f64) -> ObsResult<()> {
    if !tol.is_finite() {
        return Err(ObsError::InvalidTolerance { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(ObsError::InvalidTolerance {
            tol,
            reason: "Tolerance must be strictly positive.",
        });
    }
    Ok(())
}

/// Check that `jac` is `rows × cols` with all entries finite.
///
/// # Errors
/// - [`ObsError::ArrayShape`] on a shape mismatch.
/// - [`ObsError::NonFiniteJacobian`] for the first NaN or infinite entry.
pub fn validate_jacobian(jac: &Jacobian, rows: usize, cols: usize) -> ObsResult<()> {
    if jac.dim() != (rows, cols) {
        return Err(ObsError::ArrayShape {
            text: format!("Jacobian is {:?}, expected ({rows}, {cols})", jac.dim()),
        });
    }
    if let Some(((row, col), &value)) = jac.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(ObsError::NonFiniteJacobian { row, col, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover every error branch plus one success path per guard.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // State dimension guard passes equal sizes and rejects others.
    //
    // Given
    // -----
    // - `(3, 3)` and `(3, 2)`.
    //
    // Expect
    // ------
    // - `Ok(())` then `StateDimMismatch { 3, 2 }`.
    fn state_dim_guard() {
        // Act / Assert
        assert!(validate_state_dim(3, 3).is_ok());
        assert_eq!(
            validate_state_dim(3, 2),
            Err(ObsError::StateDimMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Tolerances must be finite and strictly positive.
    //
    // Given
    // -----
    // - `1e-6`, `0.0`, `-1.0`, `NaN`, `∞`.
    //
    // Expect
    // ------
    // - Only `1e-6` is accepted.
    fn tolerance_guard() {
        // Act / Assert
        assert!(validate_tolerance(1e-6).is_ok());
        for tol in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(validate_tolerance(tol), Err(ObsError::InvalidTolerance { .. })));
        }
    }

    #[test]
    // Purpose
    // -------
    // Jacobian guard reports shape errors and the first non-finite entry.
    //
    // Given
    // -----
    // - A finite 2×2 matrix, the same checked as 2×3, and one with NaN at (1, 0).
    //
    // Expect
    // ------
    // - `Ok`, `ArrayShape`, `NonFiniteJacobian { 1, 0, NaN }`.
    fn jacobian_guard() {
        // Arrange
        let good = array![[1.0, 0.0], [0.0, 1.0]];
        let bad = array![[1.0, 0.0], [f64::NAN, 1.0]];

        // Act
        let ok = validate_jacobian(&good, 2, 2);
        let shape = validate_jacobian(&good, 2, 3);
        let nonfinite = validate_jacobian(&bad, 2, 2);

        // Assert
        assert!(ok.is_ok());
        assert!(matches!(shape, Err(ObsError::ArrayShape { .. })));
        match nonfinite {
            Err(ObsError::NonFiniteJacobian { row: 1, col: 0, value }) => assert!(value.is_nan()),
            other => panic!("Expected NonFiniteJacobian, got {other:?}"),
        }
    }
}
