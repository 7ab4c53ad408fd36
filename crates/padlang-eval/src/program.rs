//! Inputs consumed by the interpreter: statements, programs and the
//! group/report enums that workflow configuration maps onto.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a statement came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub workflow: String,
    /// Names of the rules whose success scheduled this statement.
    #[serde(default)]
    pub triggered_by: Vec<String>,
}

/// One action invocation, e.g. `$addLabel("bug")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub code: String,
    pub metadata: Metadata,
}

impl Statement {
    pub fn new(code: impl Into<String>, workflow: impl Into<String>, triggered_by: &[&str]) -> Self {
        Self {
            code: code.into(),
            metadata: Metadata {
                workflow: workflow.into(),
                triggered_by: triggered_by.iter().map(|r| r.to_string()).collect(),
            },
        }
    }
}

/// Statements in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// Which population a filter group draws its candidates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Members of the organization owning the base repository.
    Developer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    /// Members listed by an array expression.
    Static,
    /// Candidates kept by a boolean filter expression.
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Remove the report comment.
    Silent,
    /// Create or refresh the report comment.
    Verbose,
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Silent => f.write_str("silent"),
            ReportMode::Verbose => f.write_str("verbose"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_deserializes() {
        let json = r#"{"code": "$addLabel(\"bug\")", "metadata": {"workflow": "triage", "triggered_by": ["is-bug"]}}"#;
        let statement: Statement = serde_json::from_str(json).unwrap();
        assert_eq!(statement, Statement::new(r#"$addLabel("bug")"#, "triage", &["is-bug"]));
    }

    #[test]
    fn enums_use_lowercase_names() {
        let kind: GroupKind = serde_json::from_str(r#""developer""#).unwrap();
        assert_eq!(kind, GroupKind::Developer);
        let ty: GroupType = serde_json::from_str(r#""filter""#).unwrap();
        assert_eq!(ty, GroupType::Filter);
        assert_eq!(ReportMode::Silent.to_string(), "silent");
    }
}
