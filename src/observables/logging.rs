//! observables::logging — structured compile-time records (feature `obs_slog`).
//!
//! A single process-wide `slog` logger writes to stderr through a terminal
//! decorator and an async drain, so emitting a record never blocks on I/O.
//! Records are only produced for observables built with
//! `ObservableOptions { verbose: true, .. }`.
use crate::observables::symbolic::SymbolicObservable;
use slog::{Drain, Logger, info, o};
use std::sync::OnceLock;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Shared terminal logger, created on first use.
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain, o!("crate" => "koopman_observables"))
    })
}

/// Record the size of a freshly compiled observable.
pub fn log_compiled(obs: &SymbolicObservable) {
    info!(logger(), "compiled symbolic observable";
        "rows" => obs.len(),
        "variables" => obs.variables().len(),
        "jacobian_nnz" => obs.jacobian_nnz(),
        "bytecode_ops" => obs.bytecode_len(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::expr::symbols;

    #[test]
    // Purpose
    // -------
    // Logging a compiled observable neither panics nor reinitializes the
    // shared logger.
    //
    // Given
    // -----
    // - The identity observable over `[x, y]`.
    //
    // Expect
    // ------
    // - Two calls to `logger()` return the same instance.
    fn log_compiled_uses_shared_logger() {
        // Arrange
        let obs = SymbolicObservable::identity(symbols("x y")).unwrap();

        // Act
        log_compiled(&obs);

        // Assert
        assert!(std::ptr::eq(logger(), logger()));
    }
}
