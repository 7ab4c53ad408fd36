//! # padlang evaluation
//!
//! Type inference, evaluation and execution for padlang rules against a
//! live pull request.
//!
//! - [`Interpreter`] drives one run: it registers groups, labels and rules,
//!   executes a [`Program`] of action invocations and publishes the report.
//! - [`BuiltIns`] is the validated registry of functions and actions that
//!   rule text can call.
//! - [`HostApi`] is the boundary to the code-hosting service.
//!
//! Errors are [`anyhow::Error`] values wrapping an [`EvalError`] or a
//! [`HostError`]; classify them with [`error_kind`].

pub mod builtins;
pub mod cancel;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod host;
pub mod interpreter;
pub mod program;
pub mod report;
pub mod telemetry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
pub mod value;

pub use builtins::{ActionCode, BuiltInAction, BuiltInFunction, BuiltIns, FunctionCode, PluginSource};
pub use cancel::CancelToken;
pub use config::Config;
pub use env::{ActiveRule, Env, RegisterKey};
pub use error::{ErrorKind, EvalError, error_kind};
pub use eval::eval_expr;
pub use host::{HostApi, HostError, PullRequest};
pub use interpreter::Interpreter;
pub use program::{GroupKind, GroupType, Metadata, Program, ReportMode, Statement};
pub use report::{REPORT_MARKER, Report, ReportWorkflowDetails};
pub use telemetry::{Collector, NoopCollector, TracingCollector};
pub use value::{Type, Value};
