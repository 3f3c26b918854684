//! Integration tests for the observable pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end flow: generators → algebra → block stacking →
//!   snapshot lifting, with every Jacobian cross-checked against central
//!   finite differences.
//! - Exercise realistic feature sets (quadratic monomials, trigonometric
//!   and exponential rows) rather than single-expression toys.
//!
//! Coverage
//! --------
//! - `observables::generators`: exact quadratic ordering for n = 2 and 3,
//!   identity maps.
//! - `observables::symbolic`: elementwise algebra, concatenation over
//!   disjoint variables, length policies, re-differentiation determinism.
//! - `observables::combine`: stacked values and vertical Jacobians.
//! - `observables::finite_diff`: gradient checks on every result.
//!
//! Exclusions
//! ----------
//! - Bytecode and simplification details (unit tests in `symbolic`).
//! - Python bindings.
use approx::assert_abs_diff_eq;
use koopman_observables::{
    observables::{
        CombineObservable, IdentityObservable, LengthPolicy, ObsError, ObsResult, Observable,
        ObservableOptions, State, SymbolicObservable, check_gradient,
    },
    symbolic::{cos, exp, indexed_variables, sin, symbols},
};
use ndarray::{Array1, Array2, array};
use std::sync::Arc;

/// Deterministic sample states in `[-1.2, 1.3]ⁿ`.
fn sample_states(n: usize) -> Vec<State> {
    (0..5)
        .map(|k| Array1::from_iter((0..n).map(|i| ((k * 7 + i * 3) % 11) as f64 * 0.25 - 1.2)))
        .collect()
}

#[test]
// Purpose
// -------
// Quadratic generators have the documented row content and valid Jacobians.
//
// Given
// -----
// - `quadratic(2)` and `quadratic(3)` evaluated at sample states.
//
// Expect
// ------
// - 6 and 10 rows; n = 2 rows are `[x0², x0·x1, x1², x0, x1, 1]` numerically.
// - Gradient checks pass at 1e-5.
fn quadratic_generator_rows_and_gradients() {
    let q2 = SymbolicObservable::quadratic(2).unwrap();
    let q3 = SymbolicObservable::quadratic(3).unwrap();
    assert_eq!(q2.len(), 6);
    assert_eq!(q3.len(), 10);

    for state in sample_states(2) {
        let (a, b) = (state[0], state[1]);
        let value = q2.value(&state).unwrap();
        let expected = [a * a, a * b, b * b, a, b, 1.0];
        for (got, want) in value.iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
        }
        assert!(check_gradient(&q2, &state, 1e-5).unwrap().passed);
    }
    for state in sample_states(3) {
        assert!(check_gradient(&q3, &state, 1e-5).unwrap().passed);
    }
}

#[test]
// Purpose
// -------
// Identity maps return the state and the identity Jacobian.
//
// Given
// -----
// - Symbolic identity over `[x0, x1, x2]` and `IdentityObservable`.
//
// Expect
// ------
// - `value == state` (as a column) and `gradient == I₃` for every sample.
fn identity_maps_return_state_and_eye() {
    let symbolic = SymbolicObservable::identity(indexed_variables("x", 3)).unwrap();
    for state in sample_states(3) {
        let column = state.clone().into_shape_with_order((3, 1)).unwrap();
        assert_eq!(symbolic.value(&state).unwrap(), column);
        assert_eq!(IdentityObservable.value(&state).unwrap(), column);
        assert_eq!(symbolic.gradient(&state).unwrap(), Array2::<f64>::eye(3));
        assert_eq!(IdentityObservable.gradient(&state).unwrap(), Array2::<f64>::eye(3));
    }
}

#[test]
// Purpose
// -------
// Elementwise algebra matches the arithmetic of operand values, and the
// compiled Jacobians match finite differences.
//
// Given
// -----
// - `f = [sin(x) + y, x*y, exp(y/2)]` and `g = [cos(y), x^2 + 2, y - x + 3]`
//   over `[x, y]`.
//
// Expect
// ------
// - `f+g`, `f−g`, `f·g`, `f/g`, `3·f`, `f/4`, `2/g` values agree with the
//   operand values.
// - Every result, scalar forms included, passes a gradient check at 1e-5.
fn algebra_matches_values_and_finite_differences() {
    let v = symbols("x y");
    let (x, y) = (v[0].to_expr(), v[1].to_expr());
    let f = SymbolicObservable::new(
        v.clone(),
        vec![sin(&x) + &y, &x * &y, exp(&y / 2.0)],
    )
    .unwrap();
    let g = SymbolicObservable::new(
        v.clone(),
        vec![cos(&y), x.powi(2) + 2.0, &y - &x + 3.0],
    )
    .unwrap();

    type Combine = fn(f64, f64) -> f64;
    let results: Vec<(SymbolicObservable, Combine)> = vec![
        (f.add(&g).unwrap(), (|a, b| a + b) as Combine),
        (f.subtract(&g).unwrap(), (|a, b| a - b) as Combine),
        (f.multiply(&g).unwrap(), (|a, b| a * b) as Combine),
        (f.divide(&g).unwrap(), (|a, b| a / b) as Combine),
    ];
    let scalar_forms =
        [f.mul_scalar(3.0).unwrap(), f.div_scalar(4.0).unwrap(), g.scalar_div(2.0).unwrap()];

    for state in sample_states(2) {
        let fv = f.value(&state).unwrap();
        let gv = g.value(&state).unwrap();
        for (obs, op) in &results {
            let value = obs.value(&state).unwrap();
            for ((got, a), b) in value.iter().zip(fv.iter()).zip(gv.iter()) {
                assert_abs_diff_eq!(*got, op(*a, *b), epsilon = 1e-10);
            }
            assert!(check_gradient(obs, &state, 1e-5).unwrap().passed);
        }

        for obs in &scalar_forms {
            assert!(check_gradient(obs, &state, 1e-5).unwrap().passed);
        }
        let scaled = scalar_forms[0].value(&state).unwrap();
        let quartered = scalar_forms[1].value(&state).unwrap();
        let inverted = scalar_forms[2].value(&state).unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(scaled[[i, 0]], 3.0 * fv[[i, 0]], epsilon = 1e-10);
            assert_abs_diff_eq!(quartered[[i, 0]], fv[[i, 0]] / 4.0, epsilon = 1e-10);
            assert_abs_diff_eq!(inverted[[i, 0]], 2.0 / gv[[i, 0]], epsilon = 1e-10);
        }
    }
}

#[test]
// Purpose
// -------
// Concatenation over disjoint variables zero-fills the cross columns.
//
// Given
// -----
// - `a = [x^2, sin(x)]` over `[x]`, `b = [y^3]` over `[y]`.
//
// Expect
// ------
// - Length 3 over `[x, y]`; Jacobian `[[2x, 0], [cos x, 0], [0, 3y²]]`.
fn concat_over_disjoint_variables() {
    let v = symbols("x y");
    let (x, y) = (v[0].to_expr(), v[1].to_expr());
    let a = SymbolicObservable::new(vec![v[0].clone()], vec![x.powi(2), sin(&x)]).unwrap();
    let b = SymbolicObservable::new(vec![v[1].clone()], vec![y.powi(3)]).unwrap();

    let joined = a.concat(&b).unwrap();
    assert_eq!(joined.len(), 3);
    assert_eq!(joined.variables(), &v[..]);

    let state: State = array![0.6, -1.1];
    let grad = joined.gradient(&state).unwrap();
    let expected = array![[1.2, 0.0], [0.6_f64.cos(), 0.0], [0.0, 3.0 * 1.21]];
    for (got, want) in grad.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
    }
    assert_eq!(grad[[0, 1]], 0.0);
    assert_eq!(grad[[2, 0]], 0.0);
}

#[test]
// Purpose
// -------
// Row-count mismatches follow the configured length policy.
//
// Given
// -----
// - A 3-row and a 2-row observable over the same variables.
//
// Expect
// ------
// - Default (strict) options: `LengthMismatch`.
// - Truncating options: a 2-row sum equal to the first two paired rows,
//   whose gradient matches finite differences at every sample state.
fn length_policy_strict_and_truncate() {
    let v = symbols("x y");
    let (x, y) = (v[0].to_expr(), v[1].to_expr());
    let rows = vec![x.clone(), y.clone(), &x * &y];
    let strict = SymbolicObservable::new(v.clone(), rows.clone()).unwrap();
    let lenient = SymbolicObservable::with_options(
        v.clone(),
        rows,
        ObservableOptions::new(LengthPolicy::Truncate, false),
    )
    .unwrap();
    let short = SymbolicObservable::new(v, vec![y.clone(), x.clone()]).unwrap();

    assert_eq!(
        strict.add(&short).unwrap_err(),
        ObsError::LengthMismatch { op: "add", left: 3, right: 2 }
    );
    let sum = lenient.add(&short).unwrap();
    assert_eq!(sum.len(), 2);
    assert_eq!(sum.value(&array![1.0, 4.0]).unwrap(), array![[5.0], [5.0]]);
    for state in sample_states(2) {
        assert!(check_gradient(&sum, &state, 1e-5).unwrap().passed);
    }
}

#[test]
// Purpose
// -------
// Block stacking of symbolic and plain maps: value lengths add up, the
// vertical Jacobian matches finite differences, and snapshot lifting works
// column by column.
//
// Given
// -----
// - `quadratic(2)` (6 rows) combined with `IdentityObservable` (2 rows),
//   plus a symbolic map concatenated with the identity via fallback.
//
// Expect
// ------
// - 8 feature rows per state; gradient check passes.
// - A 2×5 snapshot matrix lifts to 8×5 matching per-column values.
fn combine_values_gradients_and_snapshots() {
    let children: Vec<Arc<dyn Observable>> =
        vec![Arc::new(SymbolicObservable::quadratic(2).unwrap()), Arc::new(IdentityObservable)];
    let combined = CombineObservable::new(children).unwrap();

    let states = sample_states(2);
    for state in &states {
        assert_eq!(combined.value(state).unwrap().dim(), (8, 1));
        assert!(check_gradient(&combined, state, 1e-5).unwrap().passed);
    }

    let mut snapshots = Array2::zeros((2, states.len()));
    for (j, state) in states.iter().enumerate() {
        snapshots.column_mut(j).assign(state);
    }
    let lifted = combined.value_columns(&snapshots).unwrap();
    assert_eq!(lifted.dim(), (8, states.len()));
    for (j, state) in states.iter().enumerate() {
        let column = combined.value(state).unwrap();
        assert_eq!(lifted.column(j), column.column(0));
    }

    let v = symbols("x y");
    let product = SymbolicObservable::new(v.clone(), vec![&v[0].to_expr() * &v[1].to_expr()])
        .unwrap();
    let fallback = product.concat_observable(Arc::new(IdentityObservable)).unwrap();
    assert!(fallback.as_symbolic().is_none());
    assert_eq!(fallback.value(&array![2.0, 3.0]).unwrap(), array![[6.0], [2.0], [3.0]]);
}

#[test]
// Purpose
// -------
// Re-differentiating the stored expressions reproduces the compiled
// Jacobian exactly, and repeated calls are deterministic.
//
// Given
// -----
// - `f * g` from the algebra test family, rebuilt from `observables()`.
//
// Expect
// ------
// - Bitwise-identical gradients between the original and the rebuilt map,
//   and between two calls on the same map.
fn rederivation_round_trip_is_deterministic() {
    let v = symbols("x y");
    let (x, y) = (v[0].to_expr(), v[1].to_expr());
    let f = SymbolicObservable::new(v.clone(), vec![sin(&x) * &y, exp(&x) / (&y + 2.0)]).unwrap();
    let rebuilt = SymbolicObservable::new(f.variables().to_vec(), f.observables().to_vec()).unwrap();

    for state in sample_states(2) {
        let first = f.gradient(&state).unwrap();
        let second = f.gradient(&state).unwrap();
        let other = rebuilt.gradient(&state).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, other);
    }
    assert_eq!(f.jacobian_expressions(), rebuilt.jacobian_expressions());
}

#[test]
// Purpose
// -------
// Observables are shareable across threads and an observable without a
// gradient fails explicitly.
//
// Given
// -----
// - The `Send + Sync` bound on every observable type; a combination holding
//   a child that does not implement `gradient`.
//
// Expect
// ------
// - Compile-time bound holds; `GradientNotSupported` is returned.
fn thread_safety_and_missing_gradient() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SymbolicObservable>();
    assert_send_sync::<IdentityObservable>();
    assert_send_sync::<CombineObservable>();

    #[derive(Debug)]
    struct Norm;

    impl Observable for Norm {
        fn value(&self, state: &State) -> ObsResult<Array2<f64>> {
            Ok(Array2::from_elem((1, 1), state.dot(state).sqrt()))
        }

        fn output_dim(&self, _input_dim: usize) -> usize {
            1
        }

        fn name(&self) -> &str {
            "Norm"
        }
    }

    let combined = IdentityObservable.stack(Arc::new(Norm));
    let state: State = array![3.0, 4.0];
    assert_eq!(combined.value(&state).unwrap(), array![[3.0], [4.0], [5.0]]);
    assert_eq!(
        combined.gradient(&state).unwrap_err(),
        ObsError::GradientNotSupported { observable: "Norm".to_string() }
    );
}
