//! observables::types — numeric aliases shared by every feature map.
//!
//! - `State`: one state sample, length = input dimension.
//! - `Features`: lifted sample as an `m × 1` column.
//! - `Jacobian`: `m × n` matrix of partials, rows follow features and
//!   columns follow state components.
//! - `Snapshots`: `n × k` matrix holding one state per column.
use ndarray::{Array1, Array2};

pub type State = Array1<f64>;
pub type Features = Array2<f64>;
pub type Jacobian = Array2<f64>;
pub type Snapshots = Array2<f64>;
