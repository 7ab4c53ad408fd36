//! The hosting-API boundary.
//!
//! [`HostApi`] lists every call the interpreter and its built-ins make
//! against the code-hosting service. The data types mirror the JSON shapes
//! of the GitHub REST API so that a client can deserialize straight into
//! them.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An error reported by the hosting service.
///
/// `Display` is the provider message verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub status: Option<u16>,
    pub message: String,
}

impl HostError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: User,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(rename = "ref")]
    pub reference: String,
    pub repo: Repository,
}

/// Snapshot of a pull request taken before the run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    pub user: User,
    pub base: Branch,
    pub head: Branch,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub requested_reviewers: Vec<User>,
    #[serde(default)]
    pub requested_teams: Vec<Team>,
}

impl PullRequest {
    /// Owner login of the base repository.
    pub fn owner(&self) -> &str {
        &self.base.repo.owner.login
    }

    /// Name of the base repository.
    pub fn repo(&self) -> &str {
        &self.base.repo.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    #[serde(default)]
    pub patch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestLinks {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    /// Present when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<PullRequestLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
}

/// Everything the interpreter needs from the code-hosting service.
///
/// All calls are synchronous. Implementations return [`HostError`] (inside
/// `anyhow::Error`) for provider failures so the message reaches the user
/// unchanged.
pub trait HostApi: Send + Sync {
    fn list_pull_request_files(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<PullRequestFile>>;

    fn list_org_members(&self, org: &str) -> Result<Vec<User>>;

    /// Issues (including pull requests) opened by `creator`, any state.
    fn list_issues_by_creator(&self, owner: &str, repo: &str, creator: &str) -> Result<Vec<Issue>>;

    fn list_issue_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<IssueComment>>;

    fn create_issue_comment(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<IssueComment>;

    fn update_issue_comment(&self, owner: &str, repo: &str, comment_id: u64, body: &str) -> Result<IssueComment>;

    fn delete_issue_comment(&self, owner: &str, repo: &str, comment_id: u64) -> Result<()>;

    fn add_labels(&self, owner: &str, repo: &str, number: u64, labels: &[String]) -> Result<()>;

    fn remove_label(&self, owner: &str, repo: &str, number: u64, label: &str) -> Result<()>;

    fn request_reviewers(&self, owner: &str, repo: &str, number: u64, reviewers: &[String]) -> Result<()>;
}
