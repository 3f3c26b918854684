//! observables::finite_diff — numeric Jacobians for checking analytic ones.
//!
//! Purpose
//! -------
//! Approximate the Jacobian of any observable with central differences and
//! compare it with the observable's own `gradient`. This is how compiled
//! symbolic Jacobians, hand-written gradients, and block combinations are
//! verified against their feature maps.
//!
//! Key behaviors
//! -------------
//! - [`finite_difference_jacobian`] differentiates one feature row at a time
//!   through `finitediff`, routing any evaluation error raised inside the
//!   closure into a shared `closure_err` cell.
//! - [`check_gradient`] reports the largest absolute deviation between the
//!   analytic and numeric Jacobians and whether it is within tolerance.
//!
//! Invariants & assumptions
//! ------------------------
//! - The observable must be smooth near `state`; kinks (`abs`, `sign`) give
//!   meaningless differences.
//! - Central differences use `finitediff`'s default step (`√ε`), so
//!   tolerances around `1e-5` are appropriate for moderately scaled values.
//!
//! Conventions
//! -----------
//! - A NaN deviation counts as infinite, so it always fails the check.
use crate::observables::{
    errors::{ObsError, ObsResult},
    traits::Observable,
    types::{Jacobian, State},
    validation::{validate_jacobian, validate_tolerance},
};
use finitediff::FiniteDiff;
use ndarray::Array2;
use std::cell::RefCell;

/// Outcome of [`check_gradient`].
///
/// - `max_abs_error`: largest `|analytic − numeric|` over all entries.
/// - `worst_entry`: `(row, col)` of that entry, `None` for an empty Jacobian.
/// - `passed`: `max_abs_error <= tol`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub max_abs_error: f64,
    pub worst_entry: Option<(usize, usize)>,
    pub passed: bool,
}

/// Central-difference Jacobian of `obs` at `state`, shape `m × n`.
///
/// # Errors
/// - Whatever `obs.value` returns at `state` or at any perturbed point.
pub fn finite_difference_jacobian(obs: &dyn Observable, state: &State) -> ObsResult<Jacobian> {
    let n = state.len();
    let m = obs.value(state)?.nrows();
    let x: Vec<f64> = state.to_vec();
    let closure_err: RefCell<Option<ObsError>> = RefCell::new(None);
    let mut jac = Array2::zeros((m, n));

    for row in 0..m {
        let f = |p: &Vec<f64>| -> f64 {
            match obs.value(&State::from(p.clone())) {
                Ok(features) => features.get((row, 0)).copied().unwrap_or(f64::NAN),
                Err(err) => {
                    closure_err.replace(Some(err));
                    f64::NAN
                }
            }
        };
        let partials = x.central_diff(&f);
        if let Some(err) = closure_err.take() {
            return Err(err);
        }
        for (col, d) in partials.into_iter().enumerate() {
            jac[[row, col]] = d;
        }
    }
    Ok(jac)
}

/// Compare `obs.gradient(state)` with central differences.
///
/// # Errors
/// - [`ObsError::InvalidTolerance`] if `tol` is not finite and positive.
/// - Whatever `obs.gradient` / `obs.value` return.
/// - [`ObsError::ArrayShape`] / [`ObsError::NonFiniteJacobian`] if the
///   analytic Jacobian has the wrong shape or non-finite entries.
pub fn check_gradient(obs: &dyn Observable, state: &State, tol: f64) -> ObsResult<GradientCheck> {
    validate_tolerance(tol)?;
    let analytic = obs.gradient(state)?;
    let numeric = finite_difference_jacobian(obs, state)?;
    validate_jacobian(&analytic, numeric.nrows(), numeric.ncols())?;

    let mut max_abs_error = 0.0_f64;
    let mut worst_entry = None;
    for ((idx, a), b) in analytic.indexed_iter().zip(numeric.iter()) {
        let diff = (a - b).abs();
        let err = if diff.is_nan() { f64::INFINITY } else { diff };
        if worst_entry.is_none() || err > max_abs_error {
            max_abs_error = err;
            worst_entry = Some(idx);
        }
    }
    Ok(GradientCheck { max_abs_error, worst_entry, passed: max_abs_error <= tol })
}
