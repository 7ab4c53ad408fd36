//! The run driver: registers groups, labels and rules, executes programs
//! and publishes the report.
//!
//! A typical run:
//!
//! ```ignore
//! let mut interpreter = Interpreter::new(cancel, host, collector, pr, builtins, config)?;
//! interpreter.process_label("bug", "kind/bug");
//! interpreter.process_rule("is-small", "$fileCount() < 5");
//! interpreter.exec_program(&program)?;
//! interpreter.report(config.report_mode)?;
//! ```

use crate::bail_kind;
use crate::builtins::BuiltIns;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::env::{Env, RegisterKey};
use crate::error::{ErrorKind, EvalError, with_prefix};
use crate::eval::{Scope, eval, eval_args, parse};
use crate::host::{HostApi, PullRequest};
use crate::program::{GroupKind, GroupType, Program, ReportMode, Statement};
use crate::report;
use crate::telemetry::Collector;
use crate::types::{TypeScope, check_args, infer};
use crate::value::{Type, Value};
use anyhow::{Context as _, Result};
use padlang_syntax::Expr;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Interpreter {
    env: Env,
}

impl Interpreter {
    /// Creates an interpreter for one pull request.
    ///
    /// Fetches the changed files up front; a failing fetch is a
    /// `Construction` error.
    pub fn new(
        cancel: CancelToken,
        host: Arc<dyn HostApi>,
        collector: Arc<dyn Collector>,
        pull_request: PullRequest,
        builtins: Arc<BuiltIns>,
        config: Config,
    ) -> Result<Self> {
        let env = Env::new(cancel, host, collector, pull_request, builtins, config)?;
        Ok(Self { env })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Evaluates a condition against the current environment.
    pub fn eval_expr(&self, code: &str) -> Result<bool> {
        crate::eval::eval_expr(&self.env, code)
    }

    /// Registers a group under `name`.
    ///
    /// Static groups evaluate `group_expr`, which must be an array. Filter
    /// groups keep every candidate of `kind` for which `filter_expr` holds,
    /// with the candidate bound as `$<param>`.
    pub fn process_group(
        &mut self,
        name: &str,
        kind: GroupKind,
        group_type: GroupType,
        group_expr: &str,
        param: &str,
        filter_expr: &str,
    ) -> Result<()> {
        let members = match group_type {
            GroupType::Static => self.static_group(group_expr)?,
            GroupType::Filter => self.filter_group(kind, param, filter_expr)?,
        };

        info!(group = name, "group registered");
        self.env.register(RegisterKey::Group(name.to_string()), members);
        Ok(())
    }

    fn static_group(&self, group_expr: &str) -> Result<Value> {
        let expr = parse(group_expr)?;
        let ty = infer(&self.env, &TypeScope::default(), &expr)?;
        if !ty.is_array() {
            bail_kind!(ErrorKind::TypeInference, "expression is not a valid group");
        }
        eval(&self.env, &Scope::default(), &expr)
    }

    fn filter_group(&self, kind: GroupKind, param: &str, filter_expr: &str) -> Result<Value> {
        let expr = parse(filter_expr).map_err(|err| with_prefix(err, "buildGroupAST: "))?;

        let mut vars = TypeScope::default();
        vars.insert(param.to_string(), Type::String);
        if infer(&self.env, &vars, &expr)? != Type::Bool {
            bail_kind!(ErrorKind::ConditionType, "expression {} is not a condition", filter_expr);
        }

        let candidates = self.candidates(kind)?;
        debug!(candidates = candidates.len(), filter = filter_expr, "evaluating filter group");

        let keep = |login: &String| self.keeps(&expr, param, login);
        let threads = self.env.config().max_parallel_threads;
        let results: Vec<Result<bool>> = if threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Failed to create thread pool")?;
            pool.install(|| candidates.par_iter().map(keep).collect())
        } else {
            candidates.par_iter().map(keep).collect()
        };

        let mut members = Vec::new();
        for (login, kept) in candidates.into_iter().zip(results) {
            if kept? {
                members.push(Value::String(login));
            }
        }
        Ok(Value::Array(members))
    }

    fn candidates(&self, kind: GroupKind) -> Result<Vec<String>> {
        match kind {
            GroupKind::Developer => {
                let org = self.env.pull_request().owner();
                let members = self.env.host()?.list_org_members(org)?;
                Ok(members.into_iter().map(|user| user.login).collect())
            }
        }
    }

    fn keeps(&self, filter: &Expr, param: &str, login: &str) -> Result<bool> {
        let mut vars = Scope::default();
        vars.insert(param.to_string(), Value::string(login));
        eval(&self.env, &vars, filter)?.as_bool()
    }

    pub fn process_label(&mut self, id: &str, name: &str) {
        self.env
            .register(RegisterKey::Label(id.to_string()), Value::string(name));
    }

    /// Stores the rule source; it is only evaluated when referenced.
    pub fn process_rule(&mut self, name: &str, source: &str) {
        self.env
            .register(RegisterKey::Rule(name.to_string()), Value::string(source));
    }

    /// Runs one action invocation and records it in the report.
    pub fn exec_statement(&mut self, statement: &Statement) -> Result<()> {
        let code = statement.code.as_str();
        let expr = parse(code)?;
        let Some((name, args)) = expr.as_call() else {
            bail_kind!(ErrorKind::TypeInference, "exec: {} is not an action invocation", code);
        };

        let builtins = self.env.builtins();
        let params = match (builtins.action(name), builtins.function(name)) {
            (Some(action), _) => &action.params,
            (None, Some(function)) => &function.params,
            (None, None) => return Err(exec_lookup(name)),
        };
        check_args(&self.env, &TypeScope::default(), name, params, args)?;

        let Some(action) = builtins.action(name) else {
            return Err(exec_lookup(name));
        };
        let action_code = action.code;

        let values = eval_args(&self.env, &Scope::default(), args)?;
        debug!(action = name, workflow = %statement.metadata.workflow, "executing");
        action_code(&self.env, values)?;

        self.env.collector().collect(
            "action",
            &[("name", name), ("workflow", statement.metadata.workflow.as_str())],
        );
        self.env.report_mut().record(
            &statement.metadata.workflow,
            &statement.metadata.triggered_by,
            code,
        );
        Ok(())
    }

    /// Executes statements in order, stopping at the first failure.
    pub fn exec_program(&mut self, program: &Program) -> Result<()> {
        info!(statements = program.statements.len(), "executing program");
        for statement in &program.statements {
            self.exec_statement(statement)?;
        }
        Ok(())
    }

    /// Publishes the accumulated report as the PR's report comment.
    pub fn report(&self, mode: ReportMode) -> Result<()> {
        report::publish(&self.env, mode)
    }
}

fn exec_lookup(name: &str) -> anyhow::Error {
    anyhow::anyhow!(EvalError::new(
        ErrorKind::Lookup,
        format!("exec: {}", EvalError::lookup(name)),
    ))
}
