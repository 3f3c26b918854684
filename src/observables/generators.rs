//! observables::generators — ready-made feature maps.
//!
//! - [`SymbolicObservable::identity`]: the state itself, compiled.
//! - [`SymbolicObservable::quadratic`]: every monomial of degree ≤ 2 over
//!   `x0 … x{n-1}`, in lower-triangular row-major order of the outer product
//!   of `[x0, …, x{n-1}, 1]` with itself.
//! - [`IdentityObservable`]: the state as a column with an identity
//!   Jacobian, no compilation involved.
use crate::{
    observables::{
        errors::ObsResult,
        symbolic::SymbolicObservable,
        traits::Observable,
        types::{Features, Jacobian, State},
    },
    symbolic::expr::{Expr, Variable, indexed_variables},
};
use ndarray::Array2;
use std::iter;

impl SymbolicObservable {
    /// Feature map whose rows are exactly `variables`.
    pub fn identity(variables: Vec<Variable>) -> ObsResult<Self> {
        let observables = variables.iter().map(Variable::to_expr).collect();
        Self::new(variables, observables)
    }

    /// Quadratic monomials over `dim` fresh variables `x0 … x{dim-1}`.
    ///
    /// With `x' = [x0, …, x{dim-1}, 1]`, row `k` is `x'[i] * x'[j]` for the
    /// k-th pair `(i, j)` with `j <= i`, walking `i` outer and `j` inner.
    /// For `dim = 2` this is `[x0^2, x0*x1, x1^2, x0, x1, 1]`. The result
    /// has `(dim + 1)(dim + 2) / 2` rows.
    pub fn quadratic(dim: usize) -> ObsResult<Self> {
        let variables = indexed_variables("x", dim);
        let augmented: Vec<Expr> =
            variables.iter().map(Variable::to_expr).chain(iter::once(Expr::one())).collect();
        let mut observables = Vec::with_capacity((dim + 1) * (dim + 2) / 2);
        for (i, xi) in augmented.iter().enumerate() {
            for xj in &augmented[..=i] {
                observables.push(xi * xj);
            }
        }
        Self::new(variables, observables)
    }
}

/// Pass-through observable: value is the state column, gradient is `I_n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityObservable;

impl Observable for IdentityObservable {
    fn value(&self, state: &State) -> ObsResult<Features> {
        let n = state.len();
        Ok(state.clone().into_shape_with_order((n, 1))?)
    }

    fn gradient(&self, state: &State) -> ObsResult<Jacobian> {
        Ok(Array2::eye(state.len()))
    }

    fn output_dim(&self, input_dim: usize) -> usize {
        input_dim
    }

    fn name(&self) -> &str {
        "IdentityObservable"
    }
}
