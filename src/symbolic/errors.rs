//! Errors for the symbolic layer (compilation and bytecode evaluation).
//!
//! `SymbolicError` is deliberately small: expression construction and
//! differentiation are total, so failures only arise when an expression is
//! lowered to bytecode against a variable list or when compiled bytecode is
//! evaluated with the wrong number of arguments.

/// Result alias for symbolic compilation and evaluation.
pub type SymResult<T> = Result<T, SymbolicError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolicError {
    // ---- Compilation ----
    /// Expression references a variable missing from the binding list.
    UndefinedVariable {
        name: String,
    },

    // ---- Evaluation ----
    /// Number of numeric arguments differs from the number of bound variables.
    ArityMismatch {
        expected: usize,
        found: usize,
    },

    /// Bytecode popped an empty stack.
    StackUnderflow,

    /// Bytecode finished with a stack depth other than one.
    MalformedProgram {
        depth: usize,
    },
}

impl std::error::Error for SymbolicError {}

impl std::fmt::Display for SymbolicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Compilation ----
            SymbolicError::UndefinedVariable { name } => {
                write!(f, "Undefined variable '{name}': not present in the binding list")
            }

            // ---- Evaluation ----
            SymbolicError::ArityMismatch { expected, found } => {
                write!(f, "Argument count mismatch: expected {expected} values, found {found}")
            }
            SymbolicError::StackUnderflow => write!(f, "Bytecode stack underflow"),
            SymbolicError::MalformedProgram { depth } => {
                write!(f, "Malformed bytecode program: final stack depth {depth}, expected 1")
            }
        }
    }
}
