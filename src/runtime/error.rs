use crate::language::span::Span;
use miette::{Diagnostic, SourceSpan};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Fatal errors. Any of these aborts the whole run.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("{message}")]
    #[diagnostic(code(lazybrew::name_error))]
    Name {
        message: String,
        #[label("{message}")]
        span: SourceSpan,
    },
    #[error("{message}")]
    #[diagnostic(code(lazybrew::type_error))]
    Type {
        message: String,
        #[label("{message}")]
        span: SourceSpan,
    },
    #[error("uncaught exception \"{exception}\"")]
    #[diagnostic(
        code(lazybrew::fault_error),
        help("no enclosing `try` has a `catch` clause for this exception")
    )]
    Fault {
        exception: String,
        #[label("raised here")]
        span: SourceSpan,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NameError,
    TypeError,
    FaultError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NameError => "NAME_ERROR",
            ErrorKind::TypeError => "TYPE_ERROR",
            ErrorKind::FaultError => "FAULT_ERROR",
        };
        f.write_str(name)
    }
}

impl RuntimeError {
    pub fn name(message: impl Into<String>, span: Span) -> Self {
        RuntimeError::Name {
            message: message.into(),
            span: span.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        RuntimeError::Type {
            message: message.into(),
            span: span.into(),
        }
    }

    pub fn fault(exception: &Exception) -> Self {
        RuntimeError::Fault {
            exception: exception.tag.to_string(),
            span: exception.span.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::Name { .. } => ErrorKind::NameError,
            RuntimeError::Type { .. } => ErrorKind::TypeError,
            RuntimeError::Fault { .. } => ErrorKind::FaultError,
        }
    }
}

/// A program-level exception: the raised tag plus where it was raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exception {
    pub tag: Rc<str>,
    pub span: Span,
}

impl Exception {
    pub fn new(tag: impl Into<Rc<str>>, span: Span) -> Self {
        Self {
            tag: tag.into(),
            span,
        }
    }
}

/// Why expression evaluation stopped early.
#[derive(Debug)]
pub enum Interrupt {
    /// Recoverable; a `try` up the call chain may catch it.
    Raise(Exception),
    Fatal(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Self {
        Interrupt::Fatal(err)
    }
}

pub type EvalResult<T> = Result<T, Interrupt>;
