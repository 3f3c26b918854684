//! Public API surface shared by all feature maps.
//!
//! - [`Observable`]: the capability every feature map implements.
//! - [`ObservableOptions`] and [`LengthPolicy`]: configuration for symbolic
//!   observables and their algebra.
//! - [`GradientStacking`]: Jacobian layout used by [`CombineObservable`].
//!
//! Convention: a state is a 1-D sample of length `n`; features come back as an
//! `m × 1` column and Jacobians as `m × n` matrices, rows following features.
use crate::observables::{
    combine::CombineObservable,
    errors::{ObsError, ObsResult},
    symbolic::SymbolicObservable,
    types::{Features, Jacobian, Snapshots, State},
};
use ndarray::{Array2, Axis};
use std::{str::FromStr, sync::Arc};

/// Feature-map capability.
///
/// Required:
/// - `value(&State) -> ObsResult<Features>`: lift one state into an `m × 1`
///   column.
/// - `output_dim(input_dim) -> usize`: number of features produced for a
///   state of length `input_dim`.
/// - `name() -> &str`: short label used in errors and logs.
///
/// Optional:
/// - `gradient(&State) -> ObsResult<Jacobian>`: `m × n` Jacobian at `state`.
///   Maps that cannot differentiate keep the default, which fails with
///   [`ObsError::GradientNotSupported`].
/// - `as_symbolic()`: downcast hook used by symbolic concatenation.
///
/// Implementors are immutable after construction and shareable across
/// threads (`Send + Sync`).
pub trait Observable: Send + Sync + std::fmt::Debug {
    // Required methods
    fn value(&self, state: &State) -> ObsResult<Features>;
    fn output_dim(&self, input_dim: usize) -> usize;
    fn name(&self) -> &str;

    // Optional methods
    fn gradient(&self, _state: &State) -> ObsResult<Jacobian> {
        Err(ObsError::GradientNotSupported { observable: self.name().to_string() })
    }

    fn as_symbolic(&self) -> Option<&SymbolicObservable> {
        None
    }

    /// Lift every column of an `n × k` snapshot matrix, returning `m × k`.
    ///
    /// # Errors
    /// - Whatever `value` returns for the first failing column.
    /// - [`ObsError::ArrayShape`] if columns lift to different row counts.
    fn value_columns(&self, snapshots: &Snapshots) -> ObsResult<Array2<f64>> {
        let (n, k) = snapshots.dim();
        if k == 0 {
            return Ok(Array2::zeros((self.output_dim(n), 0)));
        }
        let lifted = snapshots
            .columns()
            .into_iter()
            .map(|column| self.value(&column.to_owned()))
            .collect::<ObsResult<Vec<_>>>()?;
        let views: Vec<_> = lifted.iter().map(|f| f.view()).collect();
        Ok(ndarray::concatenate(Axis(1), &views)?)
    }

    /// Evaluate `self` and `other` side by side as one block observable.
    ///
    /// Also callable on an `Arc<dyn Observable>` through the forwarding
    /// impl below.
    fn stack(self, other: Arc<dyn Observable>) -> CombineObservable
    where
        Self: Sized + 'static,
    {
        CombineObservable::pair(Arc::new(self), other)
    }
}

// Shared handles forward to the pointee, so `Arc<dyn Observable>` values
// (block children, `concat_observable` results) can be stacked again.
impl<T: Observable + ?Sized> Observable for Arc<T> {
    fn value(&self, state: &State) -> ObsResult<Features> {
        (**self).value(state)
    }

    fn output_dim(&self, input_dim: usize) -> usize {
        (**self).output_dim(input_dim)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn gradient(&self, state: &State) -> ObsResult<Jacobian> {
        (**self).gradient(state)
    }

    fn as_symbolic(&self) -> Option<&SymbolicObservable> {
        (**self).as_symbolic()
    }
}

/// How elementwise algebra treats operands with different row counts.
///
/// Variants:
/// - `Strict`: fail with [`ObsError::LengthMismatch`].
/// - `Truncate`: pair the first `min(len_a, len_b)` rows and drop the rest.
///
/// Parsing is case-insensitive (`"strict"`, `"truncate"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    #[default]
    Strict,
    Truncate,
}

impl FromStr for LengthPolicy {
    type Err = ObsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(LengthPolicy::Strict),
            "truncate" => Ok(LengthPolicy::Truncate),
            _ => Err(ObsError::InvalidOption {
                name: s.to_string(),
                reason: "Valid length policies are case insensitive 'strict' or 'truncate'.",
            }),
        }
    }
}

/// Jacobian layout for block observables.
///
/// Variants:
/// - `Vertical`: child Jacobians stacked row-wise, matching the stacked
///   features (`Σ mᵢ × n`).
/// - `Horizontal`: transposed child Jacobians side by side (`n × Σ mᵢ`),
///   the variables-by-features layout.
///
/// Every child must report `state.len()` Jacobian columns in both layouts.
///
/// Parsing is case-insensitive (`"vertical"`, `"horizontal"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientStacking {
    #[default]
    Vertical,
    Horizontal,
}

impl FromStr for GradientStacking {
    type Err = ObsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vertical" => Ok(GradientStacking::Vertical),
            "horizontal" => Ok(GradientStacking::Horizontal),
            _ => Err(ObsError::InvalidOption {
                name: s.to_string(),
                reason: "Valid gradient stackings are case insensitive 'vertical' or 'horizontal'.",
            }),
        }
    }
}

/// Symbolic observable configuration.
///
/// Fields:
/// - `length_policy` — row-count handling for `add`/`subtract`/`multiply`/`divide`.
/// - `verbose` — if `true`, logs compilation statistics (behind the
///   `obs_slog` feature).
///
/// Default: `Strict`, quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObservableOptions {
    pub length_policy: LengthPolicy,
    pub verbose: bool,
}

impl ObservableOptions {
    pub fn new(length_policy: LengthPolicy, verbose: bool) -> Self {
        Self { length_policy, verbose }
    }
}
