//! The run's outcome and the single PR comment that shows it.

use crate::env::Env;
use crate::error::with_prefix;
use crate::program::ReportMode;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::{debug, info};

/// Invisible first line identifying the managed comment.
pub const REPORT_MARKER: &str = "<!--@annotation-reviewpad-report-->";

const REPORT_HEADER: &str = "**Reviewpad Report**\n\n:scroll: **Explanation**\n";

const NO_WORKFLOWS: &str = "No workflows activated";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportWorkflowDetails {
    pub name: String,
    pub rules: BTreeMap<String, bool>,
    /// Source text of each executed action, in execution order.
    pub actions: Vec<String>,
}

/// Per-workflow record of what ran, ordered by workflow name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub workflow_details: BTreeMap<String, ReportWorkflowDetails>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.workflow_details.is_empty()
    }

    /// Records one executed action under `workflow`.
    pub fn record(&mut self, workflow: &str, triggered_by: &[String], code: &str) {
        let details = self
            .workflow_details
            .entry(workflow.to_string())
            .or_insert_with(|| ReportWorkflowDetails {
                name: workflow.to_string(),
                ..Default::default()
            });

        for rule in triggered_by {
            details.rules.insert(rule.clone(), true);
        }
        details.actions.push(code.to_string());
    }

    pub fn get(&self, workflow: &str) -> Option<&ReportWorkflowDetails> {
        self.workflow_details.get(workflow)
    }

    /// The comment body, marker included.
    pub fn render(&self) -> String {
        let mut body = format!("{}\n{}", REPORT_MARKER, REPORT_HEADER);

        if self.is_empty() {
            body.push_str(NO_WORKFLOWS);
            return body;
        }

        body.push_str("| Workflow | Rules | Actions |\n| - | - | - |");
        for details in self.workflow_details.values() {
            let rules = details
                .rules
                .iter()
                .filter(|(_, triggered)| **triggered)
                .map(|(rule, _)| escape_cell(rule))
                .collect::<Vec<_>>()
                .join("<br>");
            let actions = details
                .actions
                .iter()
                .map(|code| code_span(&escape_cell(code)))
                .collect::<Vec<_>>()
                .join("<br>");
            let _ = write!(body, "\n| {} | {} | {} |", escape_cell(&details.name), rules, actions);
        }
        body
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Wraps `text` in a backtick fence longer than any backtick run inside it.
fn code_span(text: &str) -> String {
    let longest_run = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    if longest_run == 0 {
        format!("{fence}{text}{fence}")
    } else {
        format!("{fence} {text} {fence}")
    }
}

/// Brings the PR's report comment in line with `mode`.
///
/// Silent removes every marked comment. Verbose rewrites the most recent
/// one and removes older duplicates, or creates one if none exists.
pub fn publish(env: &Env, mode: ReportMode) -> Result<()> {
    let pr = env.pull_request();
    let (owner, repo) = (pr.owner(), pr.repo());

    let comments = env
        .host()
        .and_then(|host| host.list_issue_comments(owner, repo, pr.number))
        .map_err(|err| with_prefix(err, "[report] error getting issues "))?;

    let mut marked: Vec<_> = comments
        .into_iter()
        .filter(|c| c.body.starts_with(REPORT_MARKER))
        .collect();

    debug!(mode = %mode, existing = marked.len(), "publishing report");

    let latest = match mode {
        ReportMode::Silent => None,
        ReportMode::Verbose => marked.pop(),
    };

    for stale in &marked {
        env.host()
            .and_then(|host| host.delete_issue_comment(owner, repo, stale.id))
            .map_err(|err| with_prefix(err, "[report] error deleting comment "))?;
    }

    if mode == ReportMode::Silent {
        env.collector().collect("report", &[("mode", mode.to_string().as_str())]);
        return Ok(());
    }

    let body = env.report().render();
    match latest {
        Some(comment) => {
            env.host()
                .and_then(|host| host.update_issue_comment(owner, repo, comment.id, &body))
                .map_err(|err| with_prefix(err, "[report] error updating comment "))?;
            info!(comment = comment.id, "report comment updated");
        }
        None => {
            let created = env
                .host()
                .and_then(|host| host.create_issue_comment(owner, repo, pr.number, &body))
                .map_err(|err| with_prefix(err, "[report] error creating comment "))?;
            info!(comment = created.id, "report comment created");
        }
    }

    env.collector().collect("report", &[("mode", mode.to_string().as_str())]);
    Ok(())
}
