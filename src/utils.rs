//! Python-side input conversion helpers (feature `python-bindings`).
//!
//! States arrive from Python as numpy arrays, pandas objects, or plain
//! sequences. `value` accepts any shape and flattens it; `gradient` insists
//! on a 1-D input.
#[cfg(feature = "python-bindings")]
use crate::observables::types::State;

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArrayDyn, PyUntypedArrayMethods};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
const STATE_TYPE_ERROR: &str = "expected a numpy.ndarray, pandas object, or sequence of float64";

/// Any-dimensional float64 array, either directly or through `.to_numpy()`.
#[cfg(feature = "python-bindings")]
fn extract_f64_array<'py>(raw: &Bound<'py, PyAny>) -> Option<PyReadonlyArrayDyn<'py, f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArrayDyn<f64>>() {
        return Some(arr);
    }
    raw.call_method("to_numpy", (false,), None)
        .ok()
        .and_then(|obj| obj.extract::<PyReadonlyArrayDyn<f64>>().ok())
}

/// State for `value`: the input flattened in C order.
#[cfg(feature = "python-bindings")]
pub fn extract_flat_state(raw: &Bound<'_, PyAny>) -> PyResult<State> {
    if let Some(arr) = extract_f64_array(raw) {
        return Ok(arr.as_array().iter().copied().collect());
    }
    let vec: Vec<f64> = raw.extract().map_err(|_| PyTypeError::new_err(STATE_TYPE_ERROR))?;
    Ok(State::from(vec))
}

/// State for `gradient`: must be one-dimensional.
#[cfg(feature = "python-bindings")]
pub fn extract_state_1d(raw: &Bound<'_, PyAny>) -> PyResult<State> {
    if let Some(arr) = extract_f64_array(raw) {
        if arr.ndim() != 1 {
            return Err(PyValueError::new_err(format!(
                "gradient requires a 1-D state, got an array with {} dimensions",
                arr.ndim()
            )));
        }
        return Ok(arr.as_array().iter().copied().collect());
    }
    let vec: Vec<f64> = raw.extract().map_err(|_| PyTypeError::new_err(STATE_TYPE_ERROR))?;
    Ok(State::from(vec))
}
