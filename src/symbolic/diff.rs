//! symbolic::diff — exact first derivatives and symbolic Jacobians.
//!
//! Differentiation is structural: sum, product, power (constant and
//! variable exponent) and chain rules over [`Func`]. Every intermediate is
//! rebuilt through the canonical constructors in [`crate::symbolic::expr`],
//! so derivatives come out simplified to the same degree as hand-built
//! expressions (structural zeros are real zeros, which lets the compiler
//! skip them).
use crate::symbolic::expr::{
    Expr, ExprKind, Func, Variable, cos, cosh, exp, ln, sign, sin, sinh, sqrt, tan, tanh,
};

impl Expr {
    /// Partial derivative with respect to `variable`.
    pub fn diff(&self, variable: &Variable) -> Expr {
        match self.kind() {
            ExprKind::Num(_) => Expr::zero(),
            ExprKind::Var(v) => {
                if v == variable {
                    Expr::one()
                } else {
                    Expr::zero()
                }
            }
            ExprKind::Add(terms) => Expr::sum(terms.iter().map(|t| t.diff(variable))),
            ExprKind::Mul(factors) => {
                let mut terms = Vec::with_capacity(factors.len());
                for (i, factor) in factors.iter().enumerate() {
                    let d = factor.diff(variable);
                    if d.is_zero() {
                        continue;
                    }
                    terms.push(Expr::product(factors.iter().enumerate().map(|(j, g)| {
                        if i == j { d.clone() } else { g.clone() }
                    })));
                }
                Expr::sum(terms)
            }
            ExprKind::Pow(base, exponent) => {
                let d_base = base.diff(variable);
                if !exponent.depends_on(variable) {
                    if d_base.is_zero() {
                        return Expr::zero();
                    }
                    return Expr::product([
                        exponent.clone(),
                        Expr::pow(base.clone(), exponent - 1.0),
                        d_base,
                    ]);
                }
                // d(b^e) = b^e * (e' ln b + e b' / b)
                let d_exp = exponent.diff(variable);
                Expr::product([
                    self.clone(),
                    Expr::sum([
                        Expr::product([d_exp, ln(base)]),
                        Expr::product([exponent.clone(), d_base, base.powi(-1)]),
                    ]),
                ])
            }
            ExprKind::Func(func, arg) => {
                let d_arg = arg.diff(variable);
                if d_arg.is_zero() {
                    return Expr::zero();
                }
                Expr::product([outer_derivative(*func, arg), d_arg])
            }
        }
    }

    /// Gradient row `[∂self/∂v for v in variables]`.
    pub fn gradient(&self, variables: &[Variable]) -> Vec<Expr> {
        variables.iter().map(|v| self.diff(v)).collect()
    }
}

/// Derivative of `func` evaluated at `arg` (before the chain-rule factor).
fn outer_derivative(func: Func, arg: &Expr) -> Expr {
    match func {
        Func::Sin => cos(arg),
        Func::Cos => -sin(arg),
        Func::Tan => 1.0 + tan(arg).powi(2),
        Func::Exp => exp(arg),
        Func::Ln => arg.powi(-1),
        Func::Sqrt => 0.5 / sqrt(arg),
        Func::Sinh => cosh(arg),
        Func::Cosh => sinh(arg),
        Func::Tanh => 1.0 - tanh(arg).powi(2),
        Func::Abs => sign(arg),
        Func::Sign => Expr::zero(),
    }
}

/// Symbolic Jacobian of `expressions` with respect to `variables`.
///
/// Returns `expressions.len()` rows of `variables.len()` partials each;
/// entry `[i][j]` is `∂expressions[i] / ∂variables[j]`.
pub fn jacobian(expressions: &[Expr], variables: &[Variable]) -> Vec<Vec<Expr>> {
    expressions.iter().map(|e| e.gradient(variables)).collect()
}
