//! Runtime error type with a classification kind.
//!
//! [`EvalError`] wraps an error message together with an [`ErrorKind`] so
//! that callers can tell a malformed rule from a failing host call without
//! parsing messages. Errors travel as [`anyhow::Error`]; use
//! [`error_kind`] to classify one.

use crate::host::HostError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed expression text.
    Parse,
    /// Operator or argument type mismatch, or a group that is not an array.
    TypeInference,
    /// A condition whose type is not `Bool`.
    ConditionType,
    /// A built-in name that does not resolve.
    Lookup,
    /// The hosting API returned an error.
    HostApi,
    /// Environment setup failed.
    Construction,
    /// The run's cancel token fired.
    Cancelled,
    /// Evaluation failed on a well-typed tree (missing group, bad argument shape).
    Runtime,
}

/// A runtime evaluation error that carries its [`ErrorKind`].
///
/// Use the [`bail_kind!`] macro (or [`EvalError::new`]) to construct these.
/// The outer [`anyhow::Error`] wrapper is preserved so that call-sites can
/// keep using `Result<T>` without changing every function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EvalError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn parse(code: &str) -> Self {
        Self::new(
            ErrorKind::Parse,
            format!("parse error: failed to build AST on input {}", code),
        )
    }

    pub fn lookup(name: &str) -> Self {
        Self::new(
            ErrorKind::Lookup,
            format!("{} not found. are you sure this is a built-in function?", name),
        )
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// Bail out of a function with an [`EvalError`] of the given kind.
///
/// # Usage
/// ```ignore
/// bail_kind!(ErrorKind::TypeInference, "mismatch in arg types on {}", name);
/// ```
#[macro_export]
macro_rules! bail_kind {
    ($kind:expr, $($arg:tt)*) => {
        return Err(anyhow::anyhow!($crate::error::EvalError::new(
            $kind,
            format!($($arg)*),
        )))
    };
}

/// Classifies an error produced anywhere in the interpreter.
///
/// Errors that are neither an [`EvalError`] nor a [`HostError`] count as
/// [`ErrorKind::Runtime`].
pub fn error_kind(err: &anyhow::Error) -> ErrorKind {
    if let Some(eval) = err.downcast_ref::<EvalError>() {
        return eval.kind;
    }
    if err.downcast_ref::<HostError>().is_some() {
        return ErrorKind::HostApi;
    }
    ErrorKind::Runtime
}

/// Prepends `prefix` to the error message, keeping its kind.
pub fn with_prefix(err: anyhow::Error, prefix: &str) -> anyhow::Error {
    let kind = error_kind(&err);
    anyhow::anyhow!(EvalError::new(kind, format!("{}{}", prefix, err)))
}
