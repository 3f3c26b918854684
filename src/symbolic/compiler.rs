//! symbolic::compiler — lower expressions to stack bytecode for fast evaluation.
//!
//! Purpose
//! -------
//! Turn a symbolic expression (or a vector/matrix of them) into a compact
//! program that is evaluated repeatedly on numeric bindings without
//! re-walking the tree. Compilation binds every variable to a fixed position
//! in the argument slice, so evaluation is a linear scan over instructions.
//!
//! Key behaviors
//! -------------
//! - [`compile`] / [`Compiler::compile`] lower one expression to a
//!   [`Program`]; variables resolve to argument indices in declaration order.
//! - [`CompiledVector`] evaluates a list of programs into one output buffer.
//! - [`CompiledMatrix`] stores only structurally non-zero entries and fills
//!   a dense row-major buffer on evaluation.
//!
//! Invariants & assumptions
//! ------------------------
//! - A program is immutable after compilation; evaluation allocates its own
//!   stack, so compiled objects are `Send + Sync` and safe to share.
//! - `max_stack` is an exact upper bound on the stack depth reached by
//!   `ops`; well-formed programs end with exactly one value on the stack.
//!
//! Conventions
//! -----------
//! - Sums and products are emitted as left-folded binary `Add` / `Mul`.
//! - A leading `-1` coefficient is emitted as `Neg`.
//! - Integer exponents use `powi`; other exponents use `powf`.
use crate::symbolic::{
    errors::{SymResult, SymbolicError},
    expr::{Expr, ExprKind, Func, Variable},
};
use std::collections::HashMap;

/// Bytecode instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum BytecodeOp {
    /// Push `constants[idx]`.
    PushConst(usize),
    /// Push `values[idx]`.
    LoadVar(usize),
    Add,
    Mul,
    Neg,
    /// Pop exponent and base, push `base.powf(exponent)`.
    Pow,
    /// Pop base, push `base.powi(n)`.
    PowI(i32),
    Call(Func),
}

/// Compiled single-output program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    ops: Vec<BytecodeOp>,
    constants: Vec<f64>,
    n_vars: usize,
    max_stack: usize,
}

impl Program {
    pub fn ops(&self) -> &[BytecodeOp] {
        &self.ops
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Evaluate with positional bindings.
    ///
    /// # Errors
    /// - [`SymbolicError::ArityMismatch`] if `values.len() != n_vars`.
    pub fn eval(&self, values: &[f64]) -> SymResult<f64> {
        check_arity(self.n_vars, values)?;
        let mut stack = Vec::with_capacity(self.max_stack);
        self.run(values, &mut stack)
    }

    /// Execute without the arity check, reusing `stack` as scratch.
    fn run(&self, values: &[f64], stack: &mut Vec<f64>) -> SymResult<f64> {
        stack.clear();
        for op in &self.ops {
            match op {
                BytecodeOp::PushConst(idx) => stack.push(self.constants[*idx]),
                BytecodeOp::LoadVar(idx) => stack.push(values[*idx]),
                BytecodeOp::Add => {
                    let (a, b) = pop2(stack)?;
                    stack.push(a + b);
                }
                BytecodeOp::Mul => {
                    let (a, b) = pop2(stack)?;
                    stack.push(a * b);
                }
                BytecodeOp::Pow => {
                    let (a, b) = pop2(stack)?;
                    stack.push(a.powf(b));
                }
                BytecodeOp::Neg => {
                    let a = stack.pop().ok_or(SymbolicError::StackUnderflow)?;
                    stack.push(-a);
                }
                BytecodeOp::PowI(n) => {
                    let a = stack.pop().ok_or(SymbolicError::StackUnderflow)?;
                    stack.push(a.powi(*n));
                }
                BytecodeOp::Call(func) => {
                    let a = stack.pop().ok_or(SymbolicError::StackUnderflow)?;
                    stack.push(func.apply(a));
                }
            }
        }
        match stack.len() {
            1 => stack.pop().ok_or(SymbolicError::StackUnderflow),
            depth => Err(SymbolicError::MalformedProgram { depth }),
        }
    }
}

fn pop2(stack: &mut Vec<f64>) -> SymResult<(f64, f64)> {
    let b = stack.pop().ok_or(SymbolicError::StackUnderflow)?;
    let a = stack.pop().ok_or(SymbolicError::StackUnderflow)?;
    Ok((a, b))
}

fn check_arity(n_vars: usize, values: &[f64]) -> SymResult<()> {
    if values.len() != n_vars {
        return Err(SymbolicError::ArityMismatch { expected: n_vars, found: values.len() });
    }
    Ok(())
}

/// Compiled vector-valued function `ℝⁿ → ℝᵐ`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledVector {
    programs: Vec<Program>,
    n_vars: usize,
    max_stack: usize,
}

impl CompiledVector {
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Total instruction count across all rows.
    pub fn op_count(&self) -> usize {
        self.programs.iter().map(|p| p.ops.len()).sum()
    }

    /// Evaluate every row at `values`.
    ///
    /// # Errors
    /// - [`SymbolicError::ArityMismatch`] if `values.len() != n_vars`.
    pub fn eval(&self, values: &[f64]) -> SymResult<Vec<f64>> {
        check_arity(self.n_vars, values)?;
        let mut stack = Vec::with_capacity(self.max_stack);
        self.programs.iter().map(|p| p.run(values, &mut stack)).collect()
    }
}

/// Compiled matrix-valued function with structurally-zero entries elided.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMatrix {
    rows: usize,
    cols: usize,
    /// `(row-major flat index, program)` for every non-zero entry.
    entries: Vec<(usize, Program)>,
    n_vars: usize,
    max_stack: usize,
}

impl CompiledMatrix {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of entries that are not identically zero.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn op_count(&self) -> usize {
        self.entries.iter().map(|(_, p)| p.ops.len()).sum()
    }

    /// Evaluate into a dense row-major buffer of length `rows * cols`.
    ///
    /// # Errors
    /// - [`SymbolicError::ArityMismatch`] if `values.len() != n_vars`.
    pub fn eval(&self, values: &[f64]) -> SymResult<Vec<f64>> {
        check_arity(self.n_vars, values)?;
        let mut out = vec![0.0; self.rows * self.cols];
        let mut stack = Vec::with_capacity(self.max_stack);
        for (idx, program) in &self.entries {
            out[*idx] = program.run(values, &mut stack)?;
        }
        Ok(out)
    }
}

/// Compiler bound to an ordered variable list.
#[derive(Debug, Clone)]
pub struct Compiler<'a> {
    index: HashMap<&'a Variable, usize>,
    n_vars: usize,
}

impl<'a> Compiler<'a> {
    /// The i-th variable binds to the i-th numeric argument. Repeated names
    /// keep their first position.
    pub fn new(variables: &'a [Variable]) -> Self {
        let mut index = HashMap::with_capacity(variables.len());
        for (i, v) in variables.iter().enumerate() {
            index.entry(v).or_insert(i);
        }
        Self { index, n_vars: variables.len() }
    }

    /// Compile one expression.
    ///
    /// # Errors
    /// - [`SymbolicError::UndefinedVariable`] if `expr` references a variable
    ///   outside the bound list.
    pub fn compile(&self, expr: &Expr) -> SymResult<Program> {
        let mut builder = ProgramBuilder::default();
        builder.emit(expr, &self.index)?;
        Ok(Program {
            ops: builder.ops,
            constants: builder.constants,
            n_vars: self.n_vars,
            max_stack: builder.max_depth,
        })
    }

    pub fn compile_vector(&self, exprs: &[Expr]) -> SymResult<CompiledVector> {
        let programs = exprs.iter().map(|e| self.compile(e)).collect::<SymResult<Vec<_>>>()?;
        let max_stack = programs.iter().map(|p| p.max_stack).max().unwrap_or(0);
        Ok(CompiledVector { programs, n_vars: self.n_vars, max_stack })
    }

    /// Compile a `rows.len() × cols` matrix given as rows of expressions.
    pub fn compile_matrix(&self, rows: &[Vec<Expr>], cols: usize) -> SymResult<CompiledMatrix> {
        let mut entries = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            for (j, entry) in row.iter().enumerate().take(cols) {
                if entry.is_zero() {
                    continue;
                }
                entries.push((i * cols + j, self.compile(entry)?));
            }
        }
        let max_stack = entries.iter().map(|(_, p)| p.max_stack).max().unwrap_or(0);
        Ok(CompiledMatrix { rows: rows.len(), cols, entries, n_vars: self.n_vars, max_stack })
    }
}

/// Compile one expression against `variables`.
pub fn compile(expr: &Expr, variables: &[Variable]) -> SymResult<Program> {
    Compiler::new(variables).compile(expr)
}

#[derive(Debug, Default)]
struct ProgramBuilder {
    ops: Vec<BytecodeOp>,
    constants: Vec<f64>,
    const_map: HashMap<u64, usize>,
    depth: usize,
    max_depth: usize,
}

impl ProgramBuilder {
    fn push(&mut self, op: BytecodeOp) {
        match op {
            BytecodeOp::PushConst(_) | BytecodeOp::LoadVar(_) => {
                self.depth += 1;
                self.max_depth = self.max_depth.max(self.depth);
            }
            BytecodeOp::Add | BytecodeOp::Mul | BytecodeOp::Pow => self.depth -= 1,
            BytecodeOp::Neg | BytecodeOp::PowI(_) | BytecodeOp::Call(_) => {}
        }
        self.ops.push(op);
    }

    fn constant(&mut self, value: f64) {
        let bits = value.to_bits();
        let idx = match self.const_map.get(&bits) {
            Some(&idx) => idx,
            None => {
                let idx = self.constants.len();
                self.constants.push(value);
                self.const_map.insert(bits, idx);
                idx
            }
        };
        self.push(BytecodeOp::PushConst(idx));
    }

    fn emit(&mut self, expr: &Expr, index: &HashMap<&Variable, usize>) -> SymResult<()> {
        match expr.kind() {
            ExprKind::Num(c) => self.constant(*c),
            ExprKind::Var(v) => {
                let idx = index
                    .get(v)
                    .copied()
                    .ok_or_else(|| SymbolicError::UndefinedVariable { name: v.name().to_string() })?;
                self.push(BytecodeOp::LoadVar(idx));
            }
            ExprKind::Add(terms) => self.emit_fold(terms, BytecodeOp::Add, index)?,
            ExprKind::Mul(factors) => {
                if factors.len() > 1 && factors[0].as_num() == Some(-1.0) {
                    self.emit_fold(&factors[1..], BytecodeOp::Mul, index)?;
                    self.push(BytecodeOp::Neg);
                } else {
                    self.emit_fold(factors, BytecodeOp::Mul, index)?;
                }
            }
            ExprKind::Pow(base, exponent) => {
                self.emit(base, index)?;
                match exponent.as_num().and_then(as_small_int) {
                    Some(n) => self.push(BytecodeOp::PowI(n)),
                    None => {
                        self.emit(exponent, index)?;
                        self.push(BytecodeOp::Pow);
                    }
                }
            }
            ExprKind::Func(func, arg) => {
                self.emit(arg, index)?;
                self.push(BytecodeOp::Call(*func));
            }
        }
        Ok(())
    }

    fn emit_fold(
        &mut self, args: &[Expr], op: BytecodeOp, index: &HashMap<&Variable, usize>,
    ) -> SymResult<()> {
        let Some((first, rest)) = args.split_first() else {
            let neutral = if op == BytecodeOp::Add { 0.0 } else { 1.0 };
            self.constant(neutral);
            return Ok(());
        };
        self.emit(first, index)?;
        for arg in rest {
            self.emit(arg, index)?;
            self.push(op.clone());
        }
        Ok(())
    }
}

fn as_small_int(value: f64) -> Option<i32> {
    if value.fract() == 0.0 && value.abs() <= f64::from(i32::MAX) { Some(value as i32) } else { None }
}
