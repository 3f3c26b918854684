//! koopman_observables — symbolic Koopman feature maps with compiled Jacobians.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes symbolic observables to Python via the `_koopman_observables`
//! extension module. Observables lift dynamical-system states into feature
//! space and supply the Jacobian of that lift for Koopman-operator style
//! linear approximations.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules: [`symbolic`] (expressions,
//!   differentiation, bytecode compilation) and [`observables`] (feature
//!   maps, generators, block stacking, finite-difference checks).
//! - Define the `SymbolicObservable` `#[pyclass]` wrapper and the
//!   `#[pymodule]` initializer when the `python-bindings` feature is on.
//! - Register the `observables` submodule in `sys.modules` so dotted imports
//!   work from Python.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical and symbolic work lives in the inner modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - Python-visible objects are immutable; arithmetic always returns new
//!   instances.
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_koopman_observables.<submodule>`.
//! - Errors from Rust code are carried as [`observables::ObsError`] and
//!   converted to `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on the inner modules (or their
//!   `prelude`s) and ignore the PyO3 items.
//! - The Python packaging layer imports `_koopman_observables` and wraps its
//!   classes in user-facing APIs.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   integration test under `tests/`.
//! - The PyO3 layer is exercised from Python.

pub mod observables;
pub mod symbolic;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    observables::{Observable, SymbolicObservable},
    symbolic::Variable,
    utils::{extract_flat_state, extract_state_1d},
};

/// SymbolicObservable — Python-facing wrapper for compiled feature maps.
///
/// Purpose
/// -------
/// Expose [`SymbolicObservable`] to Python: generators, evaluation, and
/// operator-based algebra.
///
/// Key behaviors
/// -------------
/// - `SymbolicObservable.identity(names)` and
///   `SymbolicObservable.quadratic(dim)` build compiled maps.
/// - `value(state)` flattens any array-like state; `gradient(state)`
///   requires a 1-D state. Both return 2-D float64 numpy arrays.
/// - `+ - * /` pair rows elementwise (scalars allowed for `*` and `/` on
///   either side); `|` concatenates rows.
///
/// Fields
/// ------
/// - `inner`: [`SymbolicObservable`]
///   The compiled Rust observable.
///
/// Notes
/// -----
/// - Native Rust code should use [`SymbolicObservable`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "SymbolicObservable", module = "koopman_observables.observables", frozen)]
pub struct PySymbolicObservable {
    inner: SymbolicObservable,
}

#[cfg(feature = "python-bindings")]
impl From<SymbolicObservable> for PySymbolicObservable {
    fn from(inner: SymbolicObservable) -> Self {
        Self { inner }
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PySymbolicObservable {
    #[staticmethod]
    #[pyo3(text_signature = "(names, /)")]
    pub fn identity(names: Vec<String>) -> PyResult<Self> {
        let variables = names.iter().map(Variable::new).collect();
        Ok(SymbolicObservable::identity(variables)?.into())
    }

    #[staticmethod]
    #[pyo3(text_signature = "(dim, /)")]
    pub fn quadratic(dim: usize) -> PyResult<Self> {
        Ok(SymbolicObservable::quadratic(dim)?.into())
    }

    #[pyo3(text_signature = "(self, state, /)")]
    pub fn value<'py>(
        &self, py: Python<'py>, state: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let state = extract_flat_state(state)?;
        Ok(self.inner.value(&state)?.into_pyarray(py))
    }

    #[pyo3(text_signature = "(self, state, /)")]
    pub fn gradient<'py>(
        &self, py: Python<'py>, state: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let state = extract_state_1d(state)?;
        Ok(self.inner.gradient(&state)?.into_pyarray(py))
    }

    fn __add__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(self.inner.add(&other.inner)?.into())
    }

    fn __sub__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(self.inner.subtract(&other.inner)?.into())
    }

    fn __mul__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        if let Ok(obs) = other.downcast::<PySymbolicObservable>() {
            return Ok(self.inner.multiply(&obs.get().inner)?.into());
        }
        let c: f64 = other.extract()?;
        Ok(self.inner.mul_scalar(c)?.into())
    }

    fn __rmul__(&self, other: f64) -> PyResult<Self> {
        Ok(self.inner.mul_scalar(other)?.into())
    }

    fn __truediv__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        if let Ok(obs) = other.downcast::<PySymbolicObservable>() {
            return Ok(self.inner.divide(&obs.get().inner)?.into());
        }
        let c: f64 = other.extract()?;
        Ok(self.inner.div_scalar(c)?.into())
    }

    fn __rtruediv__(&self, other: f64) -> PyResult<Self> {
        Ok(self.inner.scalar_div(other)?.into())
    }

    fn __or__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(self.inner.concat(&other.inner)?.into())
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        self.inner.to_string()
    }

    #[getter]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    #[getter]
    pub fn variables(&self) -> Vec<String> {
        self.inner.variables().iter().map(|v| v.name().to_string()).collect()
    }

    #[getter]
    pub fn expressions(&self) -> Vec<String> {
        self.inner.observables().iter().map(|e| e.to_string()).collect()
    }
}

/// _koopman_observables — PyO3 module initializer for the Python extension.
///
/// Creates the `observables` submodule, attaches it to the parent module,
/// and registers it in `sys.modules` as `koopman_observables.observables`.
///
/// Errors
/// ------
/// - `PyErr` if creating the submodule or touching `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _koopman_observables<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let observables_mod = PyModule::new(py, "observables")?;
    observables(py, m, &observables_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    py.import("sys")?
        .getattr("modules")?
        .set_item("koopman_observables.observables", observables_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn observables<'py>(
    _py: Python, parent: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PySymbolicObservable>()?;
    parent.add_submodule(m)?;
    Ok(())
}
