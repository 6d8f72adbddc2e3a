#![allow(clippy::collapsible_if)]

pub mod diagnostics;
pub mod language;
pub mod runtime;

#[cfg(test)]
mod tests;

use language::{errors::SyntaxErrors, parser::parse_program};
use runtime::{console::Console, error::RuntimeError, Interpreter};
use std::sync::Once;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LazybrewError {
    #[error(transparent)]
    Syntax(#[from] SyntaxErrors),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Parses and runs a whole program against `console`.
pub fn run_source<C: Console>(source: &str, console: C) -> Result<C, LazybrewError> {
    let program = parse_program(source)?;
    tracing::debug!(functions = program.functions.len(), "parsed program");
    let mut interpreter = Interpreter::new(&program, console);
    interpreter.run()?;
    Ok(interpreter.into_console())
}

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber when `LAZYBREW_LOG` or `RUST_LOG` is set. `force`
/// turns on trace output for this crate regardless.
pub fn init_tracing(force: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let directives = std::env::var("LAZYBREW_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .or_else(|| force.then(|| "lazybrew=trace".to_string()));
        if let Some(directives) = directives {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::new(directives))
                .init();
        }
    });
}
