//! Run-scoped evaluation state.

use crate::bail_kind;
use crate::builtins::BuiltIns;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{ErrorKind, EvalError};
use crate::host::{HostApi, PullRequest, PullRequestFile};
use crate::report::Report;
use crate::telemetry::Collector;
use crate::value::Value;
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use tracing::debug;

/// Namespaced key into the register map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegisterKey {
    Group(String),
    Label(String),
    Rule(String),
}

impl fmt::Display for RegisterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterKey::Group(name) => f.write_str(name),
            RegisterKey::Label(id) => write!(f, "@label:{}", id),
            RegisterKey::Rule(name) => write!(f, "@rule:{}", name),
        }
    }
}

/// Everything one evaluation run reads from and writes to.
///
/// Built-ins receive `&Env`; the register map and the report are only
/// written through the interpreter.
pub struct Env {
    cancel: CancelToken,
    host: Arc<dyn HostApi>,
    collector: Arc<dyn Collector>,
    pull_request: PullRequest,
    files: Vec<PullRequestFile>,
    builtins: Arc<BuiltIns>,
    config: Config,
    registers: FxHashMap<RegisterKey, Value>,
    report: Report,
    /// Rules being evaluated, innermost last, per evaluating thread.
    active_rules: Mutex<FxHashMap<ThreadId, Vec<String>>>,
}

impl Env {
    /// Builds the environment, fetching the pull request's changed files.
    pub fn new(
        cancel: CancelToken,
        host: Arc<dyn HostApi>,
        collector: Arc<dyn Collector>,
        pull_request: PullRequest,
        builtins: Arc<BuiltIns>,
        config: Config,
    ) -> Result<Self> {
        if cancel.is_cancelled() {
            bail_kind!(ErrorKind::Cancelled, "run cancelled");
        }

        let files = host
            .list_pull_request_files(pull_request.owner(), pull_request.repo(), pull_request.number)
            .map_err(|err| {
                anyhow::anyhow!(EvalError::new(
                    ErrorKind::Construction,
                    format!("error getting pull request files: {}", err),
                ))
            })?;

        debug!(
            pull_request = pull_request.number,
            files = files.len(),
            "environment ready"
        );

        Ok(Self {
            cancel,
            host,
            collector,
            pull_request,
            files,
            builtins,
            config,
            registers: FxHashMap::default(),
            report: Report::default(),
            active_rules: Mutex::new(FxHashMap::default()),
        })
    }

    /// The host client, or a `Cancelled` error once the run was cancelled.
    pub fn host(&self) -> Result<&dyn HostApi> {
        if self.cancel.is_cancelled() {
            bail_kind!(ErrorKind::Cancelled, "run cancelled");
        }
        Ok(self.host.as_ref())
    }

    pub fn collector(&self) -> &dyn Collector {
        self.collector.as_ref()
    }

    pub fn pull_request(&self) -> &PullRequest {
        &self.pull_request
    }

    /// Files changed by the pull request, as fetched at construction.
    pub fn files(&self) -> &[PullRequestFile] {
        &self.files
    }

    pub fn builtins(&self) -> &BuiltIns {
        &self.builtins
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn register(&mut self, key: RegisterKey, value: Value) {
        debug!(key = %key, value = %value, "register");
        self.registers.insert(key, value);
    }

    pub fn lookup(&self, key: &RegisterKey) -> Option<&Value> {
        self.registers.get(key)
    }

    pub fn registers(&self) -> &FxHashMap<RegisterKey, Value> {
        &self.registers
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub(crate) fn report_mut(&mut self) -> &mut Report {
        &mut self.report
    }

    /// Marks rule `name` as being evaluated on this thread until the guard
    /// drops. Fails when `name` is already being evaluated further up.
    pub fn enter_rule(&self, name: &str) -> Result<ActiveRule<'_>> {
        let thread = thread::current().id();
        let mut active = self.active_rules();
        let stack = active.entry(thread).or_default();
        if stack.iter().any(|rule| rule == name) {
            bail_kind!(ErrorKind::Runtime, "rule {} is recursive", name);
        }
        stack.push(name.to_string());
        Ok(ActiveRule { env: self, thread })
    }

    fn active_rules(&self) -> MutexGuard<'_, FxHashMap<ThreadId, Vec<String>>> {
        self.active_rules.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Guard returned by [`Env::enter_rule`].
#[must_use]
pub struct ActiveRule<'a> {
    env: &'a Env,
    thread: ThreadId,
}

impl Drop for ActiveRule<'_> {
    fn drop(&mut self) {
        let mut active = self.env.active_rules();
        if let Some(stack) = active.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                active.remove(&self.thread);
            }
        }
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("pull_request", &self.pull_request.number)
            .field("files", &self.files.len())
            .field("registers", &self.registers)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}
