//! padlang: rules that run against a pull request.
//!
//! This crate wires the pieces together: the standard plugin as the default
//! built-in registry and the GitHub client as the default host.
//!
//! ```no_run
//! use padlang::prelude::*;
//!
//! let config = Config::load(".")?;
//! let mut interpreter = padlang::connect(&config, "octocat", "hello-world", 42, CancelToken::new())?;
//!
//! interpreter.process_rule("small", "$fileCount() < 10");
//! if interpreter.eval_expr(r#"$rule("small")"#)? {
//!     let program = Program::new(vec![Statement::new(r#"$addLabel("small")"#, "size", &["small"])]);
//!     interpreter.exec_program(&program)?;
//! }
//! interpreter.report(config.report_mode)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub use padlang_eval::{
    BuiltIns, CancelToken, Collector, Config, Env, ErrorKind, EvalError, GroupKind, GroupType, HostApi,
    HostError, Interpreter, Metadata, NoopCollector, PluginSource, Program, PullRequest, RegisterKey,
    Report, ReportMode, Statement, TracingCollector, Type, Value, error_kind, eval_expr,
};
pub use padlang_github::GithubClient;
pub use padlang_plugins::plugin_source;
pub use padlang_syntax as syntax;

/// The standard plugin followed by `extra` sources, validated together.
pub fn default_builtins(extra: impl IntoIterator<Item = PluginSource>) -> Result<BuiltIns> {
    BuiltIns::assemble(std::iter::once(plugin_source()).chain(extra))
}

/// Fetches pull request `number` from GitHub and prepares an interpreter
/// for it with the default built-ins.
pub fn connect(config: &Config, owner: &str, repo: &str, number: u64, cancel: CancelToken) -> Result<Interpreter> {
    let client = GithubClient::from_config(config)?;
    let pull_request = client.get_pull_request(owner, repo, number)?;
    info!(owner, repo, number, "pull request loaded");

    Interpreter::new(
        cancel,
        Arc::new(client),
        Arc::new(TracingCollector),
        pull_request,
        Arc::new(default_builtins([])?),
        config.clone(),
    )
}

pub mod prelude {
    pub use crate::{
        CancelToken, Config, GroupKind, GroupType, Interpreter, Program, ReportMode, Statement, Value,
        connect, default_builtins,
    };
}
