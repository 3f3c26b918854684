//! observables — Koopman feature maps, their Jacobians, and composition.
//!
//! Purpose
//! -------
//! Lift raw dynamical-system states into feature space and provide the
//! Jacobian of that lift, for Koopman-operator style linear approximations
//! of nonlinear dynamics. Symbolic maps are differentiated once and compiled;
//! plain and block maps share the same [`Observable`] surface so downstream
//! fitting code can treat them uniformly.
//!
//! Key behaviors
//! -------------
//! - Define the [`Observable`] capability (`value`, optional `gradient`,
//!   `stack`, snapshot lifting via `value_columns`).
//! - Build compiled maps with [`SymbolicObservable`] and combine them with
//!   `add` / `subtract` / `multiply` / `divide` / `concat` and scalar forms.
//! - Provide generators: [`SymbolicObservable::identity`],
//!   [`SymbolicObservable::quadratic`], and the non-compiled
//!   [`IdentityObservable`].
//! - Stack heterogeneous maps at runtime with [`CombineObservable`].
//! - Verify Jacobians numerically with [`check_gradient`].
//!
//! Invariants & assumptions
//! ------------------------
//! - States are 1-D `f64` arrays whose length equals the declared input
//!   dimension; mismatches fail with [`ObsError::StateDimMismatch`].
//! - Features are `m × 1` columns; Jacobians are `m × n`.
//! - Every observable is immutable and `Send + Sync`.
//!
//! Conventions
//! -----------
//! - Variable binding is positional: the i-th state component binds to the
//!   i-th declared variable.
//! - No I/O unless the `obs_slog` feature is enabled and an observable is
//!   built with `verbose` options.
//!
//! Downstream usage
//! ----------------
//! - Build a feature map (generator, hand-written expressions, or algebra),
//!   then call `value_columns` on an `n × k` snapshot matrix to obtain the
//!   lifted `m × k` data a Koopman/EDMD regression consumes.
//! - `use koopman_observables::observables::prelude::*;` imports the main
//!   surface.
//!
//! Testing notes
//! -------------
//! - Unit tests sit beside each submodule; the integration test under
//!   `tests/` runs generators, algebra, block stacking, and finite-difference
//!   checks end to end.

pub mod combine;
pub mod errors;
pub mod finite_diff;
pub mod generators;
#[cfg(feature = "obs_slog")]
pub mod logging;
pub mod symbolic;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::combine::CombineObservable;
pub use self::errors::{ObsError, ObsResult};
pub use self::finite_diff::{GradientCheck, check_gradient, finite_difference_jacobian};
pub use self::generators::IdentityObservable;
pub use self::symbolic::SymbolicObservable;
pub use self::traits::{GradientStacking, LengthPolicy, Observable, ObservableOptions};
pub use self::types::{Features, Jacobian, Snapshots, State};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::combine::CombineObservable;
    pub use super::errors::{ObsError, ObsResult};
    pub use super::finite_diff::{GradientCheck, check_gradient};
    pub use super::generators::IdentityObservable;
    pub use super::symbolic::SymbolicObservable;
    pub use super::traits::{GradientStacking, LengthPolicy, Observable, ObservableOptions};
    pub use super::types::{Features, Jacobian, Snapshots, State};
}
