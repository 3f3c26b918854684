//! observables::combine — runtime stacking of heterogeneous feature maps.
//!
//! Purpose
//! -------
//! Evaluate several observables at the same state and stack their outputs,
//! without merging them symbolically. Children can be symbolic, plain, or
//! other combinations.
//!
//! Key behaviors
//! -------------
//! - `value` stacks child feature columns in child order; the output length
//!   is the sum of the children's lengths.
//! - `gradient` follows the configured [`GradientStacking`]:
//!   - `Vertical` (default) stacks child Jacobians row-wise so the result is
//!     the Jacobian of the stacked features, `Σ mᵢ × n`.
//!   - `Horizontal` places the transposed child Jacobians side by side,
//!     giving `n × Σ mᵢ`: the transpose of the vertical layout.
//! - Either way, every child Jacobian must have one column per state
//!   component.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one child. Children are shared through `Arc` and never
//!   mutated.
//! - Every child accepts the same state length.
use crate::observables::{
    errors::{ObsError, ObsResult},
    traits::{GradientStacking, Observable},
    types::{Features, Jacobian, State},
};
use ndarray::{ArrayView2, Axis};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CombineObservable {
    children: Vec<Arc<dyn Observable>>,
    stacking: GradientStacking,
}

impl CombineObservable {
    /// # Errors
    /// - [`ObsError::EmptyCombination`] if `children` is empty.
    pub fn new(children: Vec<Arc<dyn Observable>>) -> ObsResult<Self> {
        if children.is_empty() {
            return Err(ObsError::EmptyCombination);
        }
        Ok(Self { children, stacking: GradientStacking::default() })
    }

    pub(crate) fn pair(first: Arc<dyn Observable>, second: Arc<dyn Observable>) -> Self {
        Self { children: vec![first, second], stacking: GradientStacking::default() }
    }

    pub fn with_gradient_stacking(self, stacking: GradientStacking) -> Self {
        Self { stacking, ..self }
    }

    pub fn children(&self) -> &[Arc<dyn Observable>] {
        &self.children
    }

    pub fn gradient_stacking(&self) -> GradientStacking {
        self.stacking
    }
}

impl Observable for CombineObservable {
    fn value(&self, state: &State) -> ObsResult<Features> {
        let parts =
            self.children.iter().map(|c| c.value(state)).collect::<ObsResult<Vec<_>>>()?;
        let views: Vec<ArrayView2<'_, f64>> = parts.iter().map(|p| p.view()).collect();
        Ok(ndarray::concatenate(Axis(0), &views)?)
    }

    fn gradient(&self, state: &State) -> ObsResult<Jacobian> {
        let parts =
            self.children.iter().map(|c| c.gradient(state)).collect::<ObsResult<Vec<_>>>()?;
        let expected = state.len();
        if let Some((child, part)) = parts.iter().enumerate().find(|(_, p)| p.ncols() != expected) {
            return Err(ObsError::JacobianColumnMismatch { child, expected, found: part.ncols() });
        }
        let views: Vec<ArrayView2<'_, f64>> = match self.stacking {
            GradientStacking::Vertical => parts.iter().map(|p| p.view()).collect(),
            GradientStacking::Horizontal => parts.iter().map(|p| p.t()).collect(),
        };
        let axis = match self.stacking {
            GradientStacking::Vertical => Axis(0),
            GradientStacking::Horizontal => Axis(1),
        };
        Ok(ndarray::concatenate(axis, &views)?)
    }

    fn output_dim(&self, input_dim: usize) -> usize {
        self.children.iter().map(|c| c.output_dim(input_dim)).sum()
    }

    fn name(&self) -> &str {
        "CombineObservable"
    }
}
