//! In-memory host double for tests.
//!
//! [`MockHost`] serves canned responses and records every side effect so
//! tests can assert on what a run did without a network. Enabled by the
//! `testing` feature.

use crate::builtins::BuiltIns;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::host::{
    Branch, HostApi, HostError, Issue, IssueComment, PullRequest, PullRequestFile, Repository, User,
};
use crate::interpreter::Interpreter;
use crate::telemetry::{Collector, NoopCollector};
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Side effects observed by a [`MockHost`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    pub created_comments: Vec<String>,
    pub updated_comments: Vec<(u64, String)>,
    pub deleted_comments: Vec<u64>,
    pub added_labels: Vec<String>,
    pub removed_labels: Vec<String>,
    pub requested_reviewers: Vec<String>,
    /// Creators passed to `list_issues_by_creator`.
    pub issue_queries: Vec<String>,
}

type Canned<T> = std::result::Result<T, String>;

#[derive(Debug)]
pub struct MockHost {
    files: Canned<Vec<PullRequestFile>>,
    org_members: Canned<Vec<User>>,
    issues: Canned<Vec<Issue>>,
    comments: Canned<Vec<IssueComment>>,
    write_error: Option<String>,
    next_comment_id: AtomicU64,
    effects: Mutex<Effects>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            files: Ok(Vec::new()),
            org_members: Ok(Vec::new()),
            issues: Ok(Vec::new()),
            comments: Ok(Vec::new()),
            write_error: None,
            next_comment_id: AtomicU64::new(1),
            effects: Mutex::new(Effects::default()),
        }
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Ok(names
            .into_iter()
            .map(|name| PullRequestFile {
                filename: name.into(),
                patch: None,
            })
            .collect());
        self
    }

    pub fn failing_files(mut self, message: &str) -> Self {
        self.files = Err(message.to_string());
        self
    }

    pub fn with_org_members<I, S>(mut self, logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.org_members = Ok(logins.into_iter().map(|l| User { login: l.into() }).collect());
        self
    }

    pub fn failing_org_members(mut self, message: &str) -> Self {
        self.org_members = Err(message.to_string());
        self
    }

    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = Ok(issues);
        self
    }

    pub fn failing_issues(mut self, message: &str) -> Self {
        self.issues = Err(message.to_string());
        self
    }

    pub fn with_comments(mut self, comments: Vec<IssueComment>) -> Self {
        self.comments = Ok(comments);
        self
    }

    pub fn failing_comments(mut self, message: &str) -> Self {
        self.comments = Err(message.to_string());
        self
    }

    /// Makes every mutating call fail with `message`.
    pub fn failing_writes(mut self, message: &str) -> Self {
        self.write_error = Some(message.to_string());
        self
    }

    /// Snapshot of the side effects so far.
    pub fn effects(&self) -> Effects {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Effects> {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, apply: impl FnOnce(&mut Effects)) -> Result<()> {
        if let Some(message) = &self.write_error {
            return Err(HostError::new(Some(500), message.clone()).into());
        }
        apply(&mut self.lock());
        Ok(())
    }
}

fn canned<T: Clone>(response: &Canned<T>) -> Result<T> {
    response
        .clone()
        .map_err(|message| HostError::new(Some(500), message).into())
}

impl HostApi for MockHost {
    fn list_pull_request_files(&self, _owner: &str, _repo: &str, _number: u64) -> Result<Vec<PullRequestFile>> {
        canned(&self.files)
    }

    fn list_org_members(&self, _org: &str) -> Result<Vec<User>> {
        canned(&self.org_members)
    }

    fn list_issues_by_creator(&self, _owner: &str, _repo: &str, creator: &str) -> Result<Vec<Issue>> {
        self.lock().issue_queries.push(creator.to_string());
        canned(&self.issues)
    }

    fn list_issue_comments(&self, _owner: &str, _repo: &str, _number: u64) -> Result<Vec<IssueComment>> {
        canned(&self.comments)
    }

    fn create_issue_comment(&self, _owner: &str, _repo: &str, _number: u64, body: &str) -> Result<IssueComment> {
        self.write(|effects| effects.created_comments.push(body.to_string()))?;
        Ok(IssueComment {
            id: self.next_comment_id.fetch_add(1, Ordering::Relaxed),
            body: body.to_string(),
        })
    }

    fn update_issue_comment(&self, _owner: &str, _repo: &str, comment_id: u64, body: &str) -> Result<IssueComment> {
        self.write(|effects| effects.updated_comments.push((comment_id, body.to_string())))?;
        Ok(IssueComment {
            id: comment_id,
            body: body.to_string(),
        })
    }

    fn delete_issue_comment(&self, _owner: &str, _repo: &str, comment_id: u64) -> Result<()> {
        self.write(|effects| effects.deleted_comments.push(comment_id))
    }

    fn add_labels(&self, _owner: &str, _repo: &str, _number: u64, labels: &[String]) -> Result<()> {
        self.write(|effects| effects.added_labels.extend_from_slice(labels))
    }

    fn remove_label(&self, _owner: &str, _repo: &str, _number: u64, label: &str) -> Result<()> {
        self.write(|effects| effects.removed_labels.push(label.to_string()))
    }

    fn request_reviewers(&self, _owner: &str, _repo: &str, _number: u64, reviewers: &[String]) -> Result<()> {
        self.write(|effects| effects.requested_reviewers.extend_from_slice(reviewers))
    }
}

/// Pull request #6 by `john` on `foobar/default-mock-repo`.
pub fn mock_pull_request() -> PullRequest {
    let repo = Repository {
        owner: User {
            login: "foobar".to_string(),
        },
        name: "default-mock-repo".to_string(),
    };
    PullRequest {
        number: 6,
        title: "Amazing new feature".to_string(),
        body: Some("Please pull these awesome changes in!".to_string()),
        draft: false,
        user: User {
            login: "john".to_string(),
        },
        base: Branch {
            reference: "master".to_string(),
            repo: repo.clone(),
        },
        head: Branch {
            reference: "new-topic".to_string(),
            repo,
        },
        ..Default::default()
    }
}

/// An interpreter over [`mock_pull_request`] with default config.
pub fn mock_interpreter_with(host: Arc<MockHost>, builtins: BuiltIns) -> Result<Interpreter> {
    mock_interpreter_for(host, builtins, mock_pull_request(), CancelToken::new())
}

/// Like [`mock_interpreter_with`] with an explicit pull request and cancel token.
pub fn mock_interpreter_for(
    host: Arc<MockHost>,
    builtins: BuiltIns,
    pull_request: PullRequest,
    cancel: CancelToken,
) -> Result<Interpreter> {
    Interpreter::new(
        cancel,
        host,
        Arc::new(NoopCollector),
        pull_request,
        Arc::new(builtins),
        Config::default(),
    )
}

/// An interpreter over [`mock_pull_request`] with its own config and collector.
pub fn mock_interpreter_using(
    host: Arc<MockHost>,
    builtins: BuiltIns,
    config: Config,
    collector: Arc<dyn Collector>,
) -> Result<Interpreter> {
    Interpreter::new(
        CancelToken::new(),
        host,
        collector,
        mock_pull_request(),
        Arc::new(builtins),
        config,
    )
}

/// Keeps every telemetry event as `event key=value ...`.
#[derive(Debug, Default)]
pub struct RecordingCollector {
    events: Mutex<Vec<String>>,
}

impl RecordingCollector {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Collector for RecordingCollector {
    fn collect(&self, event: &str, properties: &[(&str, &str)]) {
        let mut line = event.to_string();
        for (key, value) in properties {
            line.push_str(&format!(" {}={}", key, value));
        }
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(line);
    }
}

#[cfg(test)]
pub(crate) use fixtures::{mock_env, mock_interpreter};

#[cfg(test)]
mod fixtures {
    use super::*;
    use crate::bail_kind;
    use crate::builtins::PluginSource;
    use crate::env::Env;
    use crate::error::ErrorKind;
    use crate::value::{Type, Value};

    fn echo(_env: &Env, args: Vec<Value>) -> Result<Value> {
        Ok(args[0].clone())
    }

    fn fail(_env: &Env, _args: Vec<Value>) -> Result<Value> {
        bail_kind!(ErrorKind::Runtime, "fail was evaluated");
    }

    fn shout(_env: &Env, _args: Vec<Value>) -> Result<()> {
        Ok(())
    }

    fn sample_builtins() -> BuiltIns {
        let source = PluginSource::new()
            .function("echo", vec![Type::String], Type::String, echo)
            .function("fail", vec![], Type::Bool, fail)
            .action("shout", vec![Type::String], shout);
        BuiltIns::assemble([source]).unwrap()
    }

    pub(crate) fn mock_interpreter(host: MockHost) -> Interpreter {
        mock_interpreter_with(Arc::new(host), sample_builtins()).unwrap()
    }

    pub(crate) fn mock_env() -> Env {
        Env::new(
            CancelToken::new(),
            Arc::new(MockHost::new()),
            Arc::new(NoopCollector),
            mock_pull_request(),
            Arc::new(sample_builtins()),
            Config::default(),
        )
        .unwrap()
    }
}
