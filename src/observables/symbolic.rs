//! observables::symbolic — compiled feature maps built from expressions.
//!
//! Purpose
//! -------
//! Hold an ordered list of state variables and an ordered list of scalar
//! expressions (the feature rows), differentiate the rows once, and keep
//! bytecode evaluators for both the features and the Jacobian. Algebra on
//! these maps produces new, independently compiled maps.
//!
//! Key behaviors
//! -------------
//! - [`SymbolicObservable::new`] validates declarations, builds the symbolic
//!   Jacobian, and compiles both evaluators eagerly.
//! - `value` / `gradient` bind the state positionally (the i-th component to
//!   the i-th declared variable) and run the compiled programs.
//! - `add`, `subtract`, `multiply`, `divide` pair rows elementwise; `concat`
//!   appends rows; the scalar forms map every row.
//! - `concat_observable` merges symbolically when possible and falls back to
//!   a [`CombineObservable`] otherwise.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every free variable of every row is declared, and declarations are
//!   unique. Both are checked at construction.
//! - Instances are immutable; compiled evaluators sit behind `Arc` and are
//!   shared by clones. Evaluation allocates its own scratch space, so an
//!   instance can be evaluated from many threads at once.
//! - Binary operations take the union of variables in first-seen order: the
//!   left operand's variables, then new ones from the right operand. The
//!   result inherits the left operand's options.
//!
//! Conventions
//! -----------
//! - Features are returned as `len × 1` columns, Jacobians as
//!   `len × variables.len()`.
//! - Compilation cost is paid again for every algebraic result; operand
//!   evaluators are never reused.
use crate::{
    observables::{
        combine::CombineObservable,
        errors::{ObsError, ObsResult},
        traits::{LengthPolicy, Observable, ObservableOptions},
        types::{Features, Jacobian, State},
        validation::validate_state_dim,
    },
    symbolic::{
        compiler::{CompiledMatrix, CompiledVector, Compiler},
        diff::jacobian,
        expr::{Expr, Variable},
    },
};
use ndarray::Array2;
use std::{collections::HashSet, fmt, sync::Arc};

#[derive(Debug, Clone)]
pub struct SymbolicObservable {
    variables: Vec<Variable>,
    observables: Vec<Expr>,
    jacobian: Vec<Vec<Expr>>,
    value_fn: Arc<CompiledVector>,
    jacobian_fn: Arc<CompiledMatrix>,
    options: ObservableOptions,
}

impl SymbolicObservable {
    /// Build a compiled observable with default options.
    ///
    /// # Errors
    /// - [`ObsError::DuplicateVariable`] if a variable name repeats.
    /// - [`ObsError::UndeclaredVariable`] if a row uses an undeclared variable.
    pub fn new(variables: Vec<Variable>, observables: Vec<Expr>) -> ObsResult<Self> {
        Self::with_options(variables, observables, ObservableOptions::default())
    }

    pub fn with_options(
        variables: Vec<Variable>, observables: Vec<Expr>, options: ObservableOptions,
    ) -> ObsResult<Self> {
        check_declarations(&variables, &observables)?;
        let jacobian = jacobian(&observables, &variables);
        let (value_fn, jacobian_fn) = {
            let compiler = Compiler::new(&variables);
            let value_fn = compiler.compile_vector(&observables)?;
            let jacobian_fn = compiler.compile_matrix(&jacobian, variables.len())?;
            (value_fn, jacobian_fn)
        };
        let obs = Self {
            variables,
            observables,
            jacobian,
            value_fn: Arc::new(value_fn),
            jacobian_fn: Arc::new(jacobian_fn),
            options,
        };
        #[cfg(feature = "obs_slog")]
        if obs.options.verbose {
            crate::observables::logging::log_compiled(&obs);
        }
        Ok(obs)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn observables(&self) -> &[Expr] {
        &self.observables
    }

    /// Number of feature rows.
    pub fn len(&self) -> usize {
        self.observables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observables.is_empty()
    }

    /// Symbolic Jacobian, `len()` rows of `variables().len()` partials.
    pub fn jacobian_expressions(&self) -> &[Vec<Expr>] {
        &self.jacobian
    }

    pub fn options(&self) -> ObservableOptions {
        self.options
    }

    /// Jacobian entries that are not identically zero.
    pub fn jacobian_nnz(&self) -> usize {
        self.jacobian_fn.nnz()
    }

    /// Total bytecode instructions across both evaluators.
    pub fn bytecode_len(&self) -> usize {
        self.value_fn.op_count() + self.jacobian_fn.op_count()
    }

    // ---- Algebra ----

    pub fn add(&self, other: &Self) -> ObsResult<Self> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn subtract(&self, other: &Self) -> ObsResult<Self> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    pub fn multiply(&self, other: &Self) -> ObsResult<Self> {
        self.zip_with(other, "multiply", |a, b| a * b)
    }

    pub fn divide(&self, other: &Self) -> ObsResult<Self> {
        self.zip_with(other, "divide", |a, b| a / b)
    }

    /// Rows of `self` followed by rows of `other`, over the union of variables.
    pub fn concat(&self, other: &Self) -> ObsResult<Self> {
        let variables = union_variables(&self.variables, &other.variables);
        let observables = self.observables.iter().chain(&other.observables).cloned().collect();
        Self::with_options(variables, observables, self.options)
    }

    /// `c * g` for every row `g`.
    pub fn mul_scalar(&self, c: f64) -> ObsResult<Self> {
        self.map_rows(|g| c * g)
    }

    /// `g / c` for every row `g`.
    pub fn div_scalar(&self, c: f64) -> ObsResult<Self> {
        self.map_rows(|g| g / c)
    }

    /// `c / g` for every row `g`.
    pub fn scalar_div(&self, c: f64) -> ObsResult<Self> {
        self.map_rows(|g| c / g)
    }

    /// Concatenate with any observable.
    ///
    /// Symbolic operands merge into one recompiled map; anything else is
    /// stacked at runtime through a [`CombineObservable`].
    pub fn concat_observable(&self, other: Arc<dyn Observable>) -> ObsResult<Arc<dyn Observable>> {
        match other.as_symbolic() {
            Some(sym) => Ok(Arc::new(self.concat(sym)?)),
            None => Ok(Arc::new(CombineObservable::pair(Arc::new(self.clone()), other))),
        }
    }

    fn zip_with(
        &self, other: &Self, op: &'static str, f: impl Fn(&Expr, &Expr) -> Expr,
    ) -> ObsResult<Self> {
        if self.options.length_policy == LengthPolicy::Strict && self.len() != other.len() {
            return Err(ObsError::LengthMismatch { op, left: self.len(), right: other.len() });
        }
        let variables = union_variables(&self.variables, &other.variables);
        let observables =
            self.observables.iter().zip(&other.observables).map(|(a, b)| f(a, b)).collect();
        Self::with_options(variables, observables, self.options)
    }

    fn map_rows(&self, f: impl Fn(&Expr) -> Expr) -> ObsResult<Self> {
        let observables = self.observables.iter().map(f).collect();
        Self::with_options(self.variables.clone(), observables, self.options)
    }

    fn bind(&self, state: &State) -> ObsResult<Vec<f64>> {
        validate_state_dim(self.variables.len(), state.len())?;
        Ok(state.to_vec())
    }
}

impl Observable for SymbolicObservable {
    fn value(&self, state: &State) -> ObsResult<Features> {
        let values = self.bind(state)?;
        let out = self.value_fn.eval(&values)?;
        Ok(Array2::from_shape_vec((self.len(), 1), out)?)
    }

    fn gradient(&self, state: &State) -> ObsResult<Jacobian> {
        let values = self.bind(state)?;
        let out = self.jacobian_fn.eval(&values)?;
        Ok(Array2::from_shape_vec((self.len(), self.variables.len()), out)?)
    }

    fn output_dim(&self, _input_dim: usize) -> usize {
        self.len()
    }

    fn name(&self) -> &str {
        "SymbolicObservable"
    }

    fn as_symbolic(&self) -> Option<&SymbolicObservable> {
        Some(self)
    }
}

impl fmt::Display for SymbolicObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self.observables.iter().map(Expr::to_string).collect();
        let vars: Vec<&str> = self.variables.iter().map(Variable::name).collect();
        write!(f, "SymbolicObservable([{}] over [{}])", rows.join(", "), vars.join(", "))
    }
}

// ---- Helper methods ----

fn check_declarations(variables: &[Variable], observables: &[Expr]) -> ObsResult<()> {
    let mut declared = HashSet::with_capacity(variables.len());
    for v in variables {
        if !declared.insert(v) {
            return Err(ObsError::DuplicateVariable { name: v.name().to_string() });
        }
    }
    for (row, expr) in observables.iter().enumerate() {
        if let Some(v) = expr.free_variables().into_iter().find(|v| !declared.contains(v)) {
            return Err(ObsError::UndeclaredVariable { name: v.name().to_string(), row });
        }
    }
    Ok(())
}

/// Order-preserving union: `left` as given, then unseen entries of `right`.
fn union_variables(left: &[Variable], right: &[Variable]) -> Vec<Variable> {
    let mut seen: HashSet<&Variable> = HashSet::with_capacity(left.len() + right.len());
    left.iter().chain(right).filter(|v| seen.insert(*v)).cloned().collect()
}
