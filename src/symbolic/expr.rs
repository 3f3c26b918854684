//! symbolic::expr — immutable expression trees with automatic simplification.
//!
//! Purpose
//! -------
//! Represent scalar formulas over named [`Variable`]s as shared, immutable
//! trees that can be combined, differentiated, substituted, and lowered to
//! bytecode. Every constructor returns an expression already in a light
//! canonical form, so structurally equal formulas compare equal.
//!
//! Key behaviors
//! -------------
//! - Sums and products are n-ary and flattened on construction.
//! - Numeric constants are folded; additive zeros and multiplicative ones
//!   disappear; a multiplicative zero annihilates the product.
//! - Equal bases in a product merge into powers (`x*x → x^2`) and equal
//!   terms in a sum merge into coefficients (`x + x → 2*x`).
//! - Commutative arguments are ordered by their rendered form, so
//!   `x*y == y*x` and `x + y == y + x`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Nodes are never mutated after construction; sharing is through `Arc`,
//!   so expressions are `Send + Sync` and cheap to clone.
//! - `Add` nodes hold at least two terms with at most one trailing numeric
//!   constant; `Mul` nodes hold at least two factors with at most one
//!   leading numeric coefficient.
//!
//! Conventions
//! -----------
//! - Subtraction is `a + (-1)*b`, division is `a * b^-1`, negation is
//!   `(-1)*a`.
//! - Variables are identified by name.
use crate::symbolic::errors::{SymResult, SymbolicError};
use std::{fmt, ops, sync::Arc};

/// Named symbolic placeholder. Two variables with the same name are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    name: Arc<str>,
}

impl Variable {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self { name: Arc::from(name.as_ref()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The variable as a one-node expression.
    pub fn to_expr(&self) -> Expr {
        Expr::var(self)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Declare variables from a whitespace- or comma-separated list of names.
///
/// `symbols("x y z")` and `symbols("x, y, z")` both yield `[x, y, z]`.
pub fn symbols(names: &str) -> Vec<Variable> {
    names
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Variable::new)
        .collect()
}

/// Declare `n` variables `{prefix}0 … {prefix}{n-1}`.
pub fn indexed_variables(prefix: &str, n: usize) -> Vec<Variable> {
    (0..n).map(|i| Variable::new(format!("{prefix}{i}"))).collect()
}

/// Elementary functions understood by the differentiator and the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Sinh,
    Cosh,
    Tanh,
    Abs,
    Sign,
}

impl Func {
    pub fn name(&self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Sqrt => "sqrt",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Abs => "abs",
            Func::Sign => "sign",
        }
    }

    /// Numeric value of the function at `x`.
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Exp => x.exp(),
            Func::Ln => x.ln(),
            Func::Sqrt => x.sqrt(),
            Func::Sinh => x.sinh(),
            Func::Cosh => x.cosh(),
            Func::Tanh => x.tanh(),
            Func::Abs => x.abs(),
            // signum(0.0) is 1.0; the mathematical sign is 0 there.
            Func::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    x
                }
            }
        }
    }
}

/// Node kinds of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Num(f64),
    Var(Variable),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Expr, Expr),
    Func(Func, Expr),
}

/// Immutable, reference-counted symbolic expression.
#[derive(Clone, PartialEq)]
pub struct Expr {
    kind: Arc<ExprKind>,
}

impl Expr {
    fn from_kind(kind: ExprKind) -> Self {
        Self { kind: Arc::new(kind) }
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    // ---- Atoms ----

    pub fn num(value: f64) -> Self {
        Self::from_kind(ExprKind::Num(value))
    }

    pub fn zero() -> Self {
        Self::num(0.0)
    }

    pub fn one() -> Self {
        Self::num(1.0)
    }

    pub fn var(variable: &Variable) -> Self {
        Self::from_kind(ExprKind::Var(variable.clone()))
    }

    pub fn as_num(&self) -> Option<f64> {
        match self.kind() {
            ExprKind::Num(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_num() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.as_num() == Some(1.0)
    }

    // ---- Canonical constructors ----

    /// n-ary sum in canonical form.
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        let mut constant = 0.0;
        let mut like: Vec<(Expr, f64)> = Vec::new();
        for term in terms {
            push_term(term, &mut constant, &mut like);
        }

        like.sort_by_cached_key(|(core, _)| core.to_string());
        let mut out: Vec<Expr> = like
            .into_iter()
            .filter(|(_, coeff)| *coeff != 0.0)
            .map(|(core, coeff)| {
                if coeff == 1.0 { core } else { Expr::product([Expr::num(coeff), core]) }
            })
            .collect();
        if constant != 0.0 {
            out.push(Expr::num(constant));
        }

        match out.len() {
            0 => Expr::zero(),
            1 => out.remove(0),
            _ => Self::from_kind(ExprKind::Add(out)),
        }
    }

    /// n-ary product in canonical form.
    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Self {
        let mut constant = 1.0;
        let mut powers: Vec<(Expr, Vec<Expr>)> = Vec::new();
        for factor in factors {
            push_factor(factor, &mut constant, &mut powers);
        }
        if constant == 0.0 {
            return Expr::zero();
        }

        let mut out = Vec::with_capacity(powers.len());
        for (base, exponents) in powers {
            let merged = Expr::pow(base, Expr::sum(exponents));
            match merged.kind() {
                ExprKind::Num(c) => constant *= c,
                ExprKind::Mul(inner) => {
                    for f in inner {
                        match f.kind() {
                            ExprKind::Num(c) => constant *= c,
                            _ => out.push(f.clone()),
                        }
                    }
                }
                _ => out.push(merged),
            }
        }
        if constant == 0.0 {
            return Expr::zero();
        }
        out.sort_by_cached_key(|f| f.to_string());

        if out.is_empty() {
            return Expr::num(constant);
        }
        if constant == 1.0 && out.len() == 1 {
            return out.remove(0);
        }
        if constant != 1.0 {
            out.insert(0, Expr::num(constant));
        }
        Self::from_kind(ExprKind::Mul(out))
    }

    /// `base ^ exponent` in canonical form.
    pub fn pow(base: Expr, exponent: Expr) -> Self {
        if let Some(e) = exponent.as_num() {
            if e == 0.0 {
                return Expr::one();
            }
            if e == 1.0 {
                return base;
            }
            if let Some(b) = base.as_num() {
                return Expr::num(b.powf(e));
            }
            if e.fract() == 0.0 {
                match base.kind() {
                    ExprKind::Pow(inner_base, inner_exp) => {
                        if let Some(ie) = inner_exp.as_num() {
                            return Expr::pow(inner_base.clone(), Expr::num(ie * e));
                        }
                    }
                    ExprKind::Mul(factors) => {
                        return Expr::product(
                            factors.iter().map(|f| Expr::pow(f.clone(), Expr::num(e))),
                        );
                    }
                    _ => {}
                }
            }
        }
        if base.is_one() {
            return Expr::one();
        }
        Self::from_kind(ExprKind::Pow(base, exponent))
    }

    /// Apply an elementary function, folding constant arguments.
    pub fn apply(func: Func, arg: Expr) -> Self {
        match arg.as_num() {
            Some(c) => Expr::num(func.apply(c)),
            None => Self::from_kind(ExprKind::Func(func, arg)),
        }
    }

    pub fn difference(lhs: Expr, rhs: Expr) -> Self {
        Expr::sum([lhs, Expr::negate(rhs)])
    }

    pub fn quotient(lhs: Expr, rhs: Expr) -> Self {
        Expr::product([lhs, Expr::pow(rhs, Expr::num(-1.0))])
    }

    pub fn negate(arg: Expr) -> Self {
        Expr::product([Expr::num(-1.0), arg])
    }

    /// `self ^ n` for an integer exponent.
    pub fn powi(&self, n: i32) -> Self {
        Expr::pow(self.clone(), Expr::num(f64::from(n)))
    }

    // ---- Inspection ----

    /// Variables referenced by the expression, in first-seen order.
    pub fn free_variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<Variable>) {
        match self.kind() {
            ExprKind::Num(_) => {}
            ExprKind::Var(v) => {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
            ExprKind::Add(args) | ExprKind::Mul(args) => {
                for a in args {
                    a.collect_variables(out);
                }
            }
            ExprKind::Pow(b, e) => {
                b.collect_variables(out);
                e.collect_variables(out);
            }
            ExprKind::Func(_, a) => a.collect_variables(out),
        }
    }

    /// Whether `variable` occurs anywhere in the expression.
    pub fn depends_on(&self, variable: &Variable) -> bool {
        match self.kind() {
            ExprKind::Num(_) => false,
            ExprKind::Var(v) => v == variable,
            ExprKind::Add(args) | ExprKind::Mul(args) => {
                args.iter().any(|a| a.depends_on(variable))
            }
            ExprKind::Pow(b, e) => b.depends_on(variable) || e.depends_on(variable),
            ExprKind::Func(_, a) => a.depends_on(variable),
        }
    }

    /// Replace every occurrence of `variable` by `replacement`, re-simplifying.
    pub fn subs(&self, variable: &Variable, replacement: &Expr) -> Expr {
        match self.kind() {
            ExprKind::Num(_) => self.clone(),
            ExprKind::Var(v) => {
                if v == variable {
                    replacement.clone()
                } else {
                    self.clone()
                }
            }
            ExprKind::Add(args) => Expr::sum(args.iter().map(|a| a.subs(variable, replacement))),
            ExprKind::Mul(args) => {
                Expr::product(args.iter().map(|a| a.subs(variable, replacement)))
            }
            ExprKind::Pow(b, e) => {
                Expr::pow(b.subs(variable, replacement), e.subs(variable, replacement))
            }
            ExprKind::Func(func, a) => Expr::apply(*func, a.subs(variable, replacement)),
        }
    }

    /// Tree-walking numeric evaluation with positional bindings.
    ///
    /// Slow path kept for cross-checking compiled bytecode; hot loops use
    /// [`crate::symbolic::compiler::Program`].
    ///
    /// # Errors
    /// - [`SymbolicError::ArityMismatch`] if `values.len() != variables.len()`.
    /// - [`SymbolicError::UndefinedVariable`] for a variable absent from
    ///   `variables`.
    pub fn evaluate(&self, variables: &[Variable], values: &[f64]) -> SymResult<f64> {
        if variables.len() != values.len() {
            return Err(SymbolicError::ArityMismatch {
                expected: variables.len(),
                found: values.len(),
            });
        }
        self.evaluate_unchecked(variables, values)
    }

    fn evaluate_unchecked(&self, variables: &[Variable], values: &[f64]) -> SymResult<f64> {
        match self.kind() {
            ExprKind::Num(c) => Ok(*c),
            ExprKind::Var(v) => variables
                .iter()
                .position(|w| w == v)
                .map(|i| values[i])
                .ok_or_else(|| SymbolicError::UndefinedVariable { name: v.name().to_string() }),
            ExprKind::Add(args) => args.iter().try_fold(0.0, |acc, a| {
                Ok(acc + a.evaluate_unchecked(variables, values)?)
            }),
            ExprKind::Mul(args) => args.iter().try_fold(1.0, |acc, a| {
                Ok(acc * a.evaluate_unchecked(variables, values)?)
            }),
            ExprKind::Pow(b, e) => {
                let base = b.evaluate_unchecked(variables, values)?;
                let exp = e.evaluate_unchecked(variables, values)?;
                Ok(base.powf(exp))
            }
            ExprKind::Func(func, a) => Ok(func.apply(a.evaluate_unchecked(variables, values)?)),
        }
    }

    /// Split a term into `(coefficient, core)` with `term == coefficient * core`.
    fn split_coefficient(&self) -> (f64, Expr) {
        if let ExprKind::Mul(factors) = self.kind() {
            if let Some(c) = factors[0].as_num() {
                let rest = &factors[1..];
                let core = if rest.len() == 1 {
                    rest[0].clone()
                } else {
                    Self::from_kind(ExprKind::Mul(rest.to_vec()))
                };
                return (c, core);
            }
        }
        (1.0, self.clone())
    }

    fn precedence(&self) -> u8 {
        match self.kind() {
            ExprKind::Add(_) => 1,
            ExprKind::Mul(_) => 2,
            ExprKind::Num(c) if *c < 0.0 => 2,
            ExprKind::Pow(..) => 3,
            _ => 4,
        }
    }
}

fn push_term(term: Expr, constant: &mut f64, like: &mut Vec<(Expr, f64)>) {
    match term.kind() {
        ExprKind::Num(c) => *constant += c,
        ExprKind::Add(inner) => {
            for t in inner {
                push_term(t.clone(), constant, like);
            }
        }
        _ => {
            let (coeff, core) = term.split_coefficient();
            match like.iter_mut().find(|(c, _)| *c == core) {
                Some(slot) => slot.1 += coeff,
                None => like.push((core, coeff)),
            }
        }
    }
}

fn push_factor(factor: Expr, constant: &mut f64, powers: &mut Vec<(Expr, Vec<Expr>)>) {
    let (base, exponent) = match factor.kind() {
        ExprKind::Num(c) => {
            *constant *= c;
            return;
        }
        ExprKind::Mul(inner) => {
            for f in inner {
                push_factor(f.clone(), constant, powers);
            }
            return;
        }
        ExprKind::Pow(b, e) => (b.clone(), e.clone()),
        _ => (factor.clone(), Expr::one()),
    };
    match powers.iter_mut().find(|(b, _)| *b == base) {
        Some(slot) => slot.1.push(exponent),
        None => powers.push((base, vec![exponent])),
    }
}

// ---- Elementary functions ----

pub fn sin(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Sin, arg.into())
}

pub fn cos(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Cos, arg.into())
}

pub fn tan(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Tan, arg.into())
}

pub fn exp(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Exp, arg.into())
}

pub fn ln(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Ln, arg.into())
}

pub fn sqrt(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Sqrt, arg.into())
}

pub fn sinh(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Sinh, arg.into())
}

pub fn cosh(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Cosh, arg.into())
}

pub fn tanh(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Tanh, arg.into())
}

pub fn abs(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Abs, arg.into())
}

pub fn sign(arg: impl Into<Expr>) -> Expr {
    Expr::apply(Func::Sign, arg.into())
}

// ---- Conversions ----

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::num(value)
    }
}

impl From<&Variable> for Expr {
    fn from(variable: &Variable) -> Self {
        Expr::var(variable)
    }
}

impl From<Variable> for Expr {
    fn from(variable: Variable) -> Self {
        Expr::var(&variable)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

// ---- Operators ----

fn sum2(lhs: Expr, rhs: Expr) -> Expr {
    Expr::sum([lhs, rhs])
}

fn product2(lhs: Expr, rhs: Expr) -> Expr {
    Expr::product([lhs, rhs])
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $ctor:path) => {
        impl ops::$trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $ctor(self, rhs)
            }
        }

        impl ops::$trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $ctor(self, rhs.clone())
            }
        }

        impl ops::$trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $ctor(self.clone(), rhs)
            }
        }

        impl ops::$trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $ctor(self.clone(), rhs.clone())
            }
        }

        impl ops::$trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                $ctor(self, Expr::num(rhs))
            }
        }

        impl ops::$trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                $ctor(self.clone(), Expr::num(rhs))
            }
        }

        impl ops::$trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $ctor(Expr::num(self), rhs)
            }
        }

        impl ops::$trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $ctor(Expr::num(self), rhs.clone())
            }
        }
    };
}

impl_binary_op!(Add, add, sum2);
impl_binary_op!(Sub, sub, Expr::difference);
impl_binary_op!(Mul, mul, product2);
impl_binary_op!(Div, div, Expr::quotient);

impl ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self)
    }
}

impl ops::Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self.clone())
    }
}

// ---- Rendering ----

fn write_number(f: &mut fmt::Formatter<'_>, c: f64) -> fmt::Result {
    if c.is_finite() && c.fract() == 0.0 && c.abs() < 1e15 {
        write!(f, "{}", c as i64)
    } else {
        write!(f, "{c}")
    }
}

fn write_wrapped(f: &mut fmt::Formatter<'_>, expr: &Expr, wrap: bool) -> fmt::Result {
    if wrap { write!(f, "({expr})") } else { write!(f, "{expr}") }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Num(c) => write_number(f, *c),
            ExprKind::Var(v) => write!(f, "{v}"),
            ExprKind::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    let (coeff, core) = term.split_coefficient();
                    let negative = match term.as_num() {
                        Some(c) => c < 0.0,
                        None => coeff < 0.0,
                    };
                    if i == 0 {
                        write!(f, "{term}")?;
                    } else if !negative {
                        write!(f, " + {term}")?;
                    } else if let Some(c) = term.as_num() {
                        f.write_str(" - ")?;
                        write_number(f, -c)?;
                    } else if coeff == -1.0 {
                        f.write_str(" - ")?;
                        write_wrapped(f, &core, core.precedence() < 2)?;
                    } else {
                        f.write_str(" - ")?;
                        write_number(f, -coeff)?;
                        f.write_str("*")?;
                        write_wrapped(f, &core, core.precedence() < 2)?;
                    }
                }
                Ok(())
            }
            ExprKind::Mul(factors) => {
                let mut rest = &factors[..];
                if factors[0].as_num() == Some(-1.0) {
                    f.write_str("-")?;
                    rest = &factors[1..];
                }
                for (i, factor) in rest.iter().enumerate() {
                    if i > 0 {
                        f.write_str("*")?;
                    }
                    let wrap = factor.precedence() < 2 || (i > 0 && factor.precedence() == 2);
                    write_wrapped(f, factor, wrap)?;
                }
                Ok(())
            }
            ExprKind::Pow(base, exponent) => {
                write_wrapped(f, base, base.precedence() <= 3)?;
                f.write_str("^")?;
                write_wrapped(f, exponent, exponent.precedence() < 4)
            }
            ExprKind::Func(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Canonical construction: flattening, folding, like-term and like-base
    //   merging, commutative ordering.
    // - Rendering of common shapes.
    // - Free-variable discovery, substitution, and tree-walking evaluation.
    //
    // They intentionally DO NOT cover:
    // - Differentiation (see `symbolic::diff`) or bytecode (see
    //   `symbolic::compiler`).
    // -------------------------------------------------------------------------

    fn xyz() -> (Expr, Expr, Expr) {
        let v = symbols("x y z");
        (v[0].to_expr(), v[1].to_expr(), v[2].to_expr())
    }

    #[test]
    // Purpose
    // -------
    // Products and sums of the same operands in different orders must be
    // structurally equal.
    //
    // Given
    // -----
    // - `x*y` and `y*x`, `x + y` and `y + x`.
    //
    // Expect
    // ------
    // - Both pairs compare equal.
    fn commutative_arguments_are_canonically_ordered() {
        // Arrange
        let (x, y, _) = xyz();

        // Act / Assert
        assert_eq!(&x * &y, &y * &x);
        assert_eq!(&x + &y, &y + &x);
    }

    #[test]
    // Purpose
    // -------
    // Verify identity elements, annihilation and constant folding.
    //
    // Given
    // -----
    // - `x + 0`, `x * 1`, `x * 0`, `2 * 3`, `x^1`, `x^0`.
    //
    // Expect
    // ------
    // - `x`, `x`, `0`, `6`, `x`, `1` respectively.
    fn identities_fold_away() {
        // Arrange
        let (x, _, _) = xyz();

        // Act / Assert
        assert_eq!(&x + 0.0, x);
        assert_eq!(&x * 1.0, x);
        assert!((&x * 0.0).is_zero());
        assert_eq!(Expr::num(2.0) * 3.0, Expr::num(6.0));
        assert_eq!(Expr::pow(x.clone(), Expr::one()), x);
        assert!(Expr::pow(x.clone(), Expr::zero()).is_one());
    }

    #[test]
    // Purpose
    // -------
    // Equal bases merge into powers and equal terms merge into coefficients.
    //
    // Given
    // -----
    // - `x*x`, `x + x`, `x - x`, `x * x^-1`.
    //
    // Expect
    // ------
    // - `x^2`, `2*x`, `0`, `1`.
    fn like_bases_and_terms_merge() {
        // Arrange
        let (x, _, _) = xyz();

        // Act / Assert
        assert_eq!(&x * &x, x.powi(2));
        assert_eq!(&x + &x, 2.0 * &x);
        assert!((&x - &x).is_zero());
        assert!((&x / &x).is_one());
    }

    #[test]
    // Purpose
    // -------
    // Rendering produces readable infix with minimal parentheses.
    //
    // Given
    // -----
    // - Several representative expressions.
    //
    // Expect
    // ------
    // - The exact strings below.
    fn display_renders_infix() {
        // Arrange
        let (x, y, _) = xyz();

        // Act / Assert
        assert_eq!((&x * &x).to_string(), "x^2");
        assert_eq!((&y * &x).to_string(), "x*y");
        assert_eq!((&x - &y).to_string(), "x - y");
        assert_eq!((&x + 1.0).to_string(), "x + 1");
        assert_eq!((&x / &y).to_string(), "x*y^(-1)");
        assert_eq!(sin(&x * 2.0).to_string(), "sin(2*x)");
        assert_eq!(Expr::pow(&x + &y, Expr::num(3.0)).to_string(), "(x + y)^3");
    }

    #[test]
    // Purpose
    // -------
    // `free_variables` reports each variable once, in first-seen order.
    //
    // Given
    // -----
    // - `z*sin(x) + z + y` built in that order.
    //
    // Expect
    // ------
    // - Every variable appears exactly once and all three are present.
    fn free_variables_are_deduplicated() {
        // Arrange
        let (x, y, z) = xyz();
        let e = &z * sin(&x) + &z + &y;

        // Act
        let vars = e.free_variables();

        // Assert
        assert_eq!(vars.len(), 3);
        for name in ["x", "y", "z"] {
            assert!(vars.iter().any(|v| v.name() == name));
        }
    }

    #[test]
    // Purpose
    // -------
    // Substitution re-simplifies and evaluation binds positionally.
    //
    // Given
    // -----
    // - `e = x*y + 1`, substitute `y := x`.
    //
    // Expect
    // ------
    // - `x^2 + 1`, which evaluates to 10 at `x = 3`.
    fn subs_and_evaluate_agree() {
        // Arrange
        let vars = symbols("x y");
        let x = vars[0].to_expr();
        let e = &x * vars[1].to_expr() + 1.0;

        // Act
        let replaced = e.subs(&vars[1], &x);
        let value = replaced.evaluate(&vars[..1], &[3.0]).unwrap();

        // Assert
        assert_eq!(replaced, x.powi(2) + 1.0);
        assert_eq!(value, 10.0);
        assert_eq!(e.evaluate(&vars, &[2.0, 5.0]).unwrap(), 11.0);
    }

    #[test]
    // Purpose
    // -------
    // Tree-walking evaluation rejects wrong arity and unknown variables.
    //
    // Given
    // -----
    // - `x + y` evaluated with one value, then against `[x]` only.
    //
    // Expect
    // ------
    // - `ArityMismatch` and `UndefinedVariable` respectively.
    fn evaluate_reports_binding_errors() {
        // Arrange
        let vars = symbols("x y");
        let e = vars[0].to_expr() + vars[1].to_expr();

        // Act
        let arity = e.evaluate(&vars, &[1.0]);
        let undefined = e.evaluate(&vars[..1], &[1.0]);

        // Assert
        assert_eq!(arity, Err(SymbolicError::ArityMismatch { expected: 2, found: 1 }));
        assert_eq!(undefined, Err(SymbolicError::UndefinedVariable { name: "y".to_string() }));
    }
}
