//! symbolic — expression trees, exact differentiation, and bytecode compilation.
//!
//! Purpose
//! -------
//! Provide the small computer-algebra layer that observables are built on:
//! immutable scalar expressions over named variables, symbolic partial
//! derivatives, and a compiler that turns expressions into reusable numeric
//! evaluators.
//!
//! Key behaviors
//! -------------
//! - Build expressions with [`Variable`], [`Expr`], operator overloads and
//!   elementary functions ([`sin`], [`exp`], ...). Construction simplifies
//!   eagerly into a canonical form.
//! - Differentiate with [`Expr::diff`] / [`Expr::gradient`] and build full
//!   Jacobians with [`jacobian`].
//! - Lower expressions to stack bytecode with [`Compiler`], producing
//!   [`Program`], [`CompiledVector`] and [`CompiledMatrix`] evaluators.
//!
//! Invariants & assumptions
//! ------------------------
//! - Expressions and compiled programs are immutable and `Send + Sync`.
//! - Construction and differentiation never fail; only compilation against a
//!   variable list and evaluation with numeric bindings return
//!   [`SymbolicError`].
//!
//! Conventions
//! -----------
//! - Variables are identified by name; binding lists are positional.
//! - Numeric evaluation follows IEEE-754 `f64` semantics. Domain errors
//!   (e.g. `ln(-1)`) yield NaN rather than an error.
//!
//! Downstream usage
//! ----------------
//! - [`crate::observables`] stores expressions, differentiates them once at
//!   construction, and keeps the compiled value and Jacobian evaluators.
//! - `use koopman_observables::symbolic::prelude::*;` imports the building
//!   blocks needed to write feature expressions.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule: canonicalization and rendering
//!   in `expr`, derivative rules in `diff`, bytecode lowering and agreement
//!   with tree-walking evaluation in `compiler`.

pub mod compiler;
pub mod diff;
pub mod errors;
pub mod expr;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::compiler::{BytecodeOp, CompiledMatrix, CompiledVector, Compiler, Program, compile};
pub use self::diff::jacobian;
pub use self::errors::{SymResult, SymbolicError};
pub use self::expr::{
    Expr, ExprKind, Func, Variable, abs, cos, cosh, exp, indexed_variables, ln, sign, sin, sinh,
    sqrt, symbols, tan, tanh,
};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::compiler::{CompiledMatrix, CompiledVector, Compiler, compile};
    pub use super::diff::jacobian;
    pub use super::errors::{SymResult, SymbolicError};
    pub use super::expr::{
        Expr, Variable, abs, cos, cosh, exp, indexed_variables, ln, sign, sin, sinh, sqrt,
        symbols, tan, tanh,
    };
}
