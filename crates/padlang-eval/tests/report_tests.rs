use anyhow::Result;
use padlang_eval::error::error_kind;
use padlang_eval::host::IssueComment;
use padlang_eval::testing::{
    Effects, MockHost, RecordingCollector, mock_interpreter_for, mock_interpreter_using, mock_interpreter_with,
    mock_pull_request,
};
use padlang_eval::{BuiltIns, CancelToken, Config, ErrorKind, ReportMode};
use std::sync::Arc;

const EMPTY_REPORT: &str =
    "<!--@annotation-reviewpad-report-->\n**Reviewpad Report**\n\n:scroll: **Explanation**\nNo workflows activated";

fn marker_comment(id: u64, body: &str) -> IssueComment {
    IssueComment {
        id,
        body: body.to_string(),
    }
}

#[test]
fn test_comment_listing_failure_is_prefixed() -> Result<()> {
    let host = Arc::new(MockHost::new().failing_comments(
        "mock response not found for /repos/foobar/default-mock-repo/issues/6/comments",
    ));
    let interpreter = mock_interpreter_with(host, BuiltIns::default())?;

    let err = interpreter.report(ReportMode::Silent).unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::HostApi);
    assert_eq!(
        err.to_string(),
        "[report] error getting issues mock response not found for /repos/foobar/default-mock-repo/issues/6/comments"
    );
    Ok(())
}

#[test]
fn test_silent_deletes_existing_report() -> Result<()> {
    let host = Arc::new(MockHost::new().with_comments(vec![
        marker_comment(7, "unrelated review chatter"),
        marker_comment(1234, EMPTY_REPORT),
    ]));
    let interpreter = mock_interpreter_with(host.clone(), BuiltIns::default())?;

    interpreter.report(ReportMode::Silent)?;

    let effects = host.effects();
    assert_eq!(effects.deleted_comments, vec![1234]);
    assert!(effects.created_comments.is_empty());
    assert!(effects.updated_comments.is_empty());
    Ok(())
}

#[test]
fn test_silent_without_report_is_noop() -> Result<()> {
    let host = Arc::new(MockHost::new());
    let interpreter = mock_interpreter_with(host.clone(), BuiltIns::default())?;

    interpreter.report(ReportMode::Silent)?;

    assert_eq!(host.effects(), Effects::default());
    Ok(())
}

#[test]
fn test_verbose_creates_report() -> Result<()> {
    let host = Arc::new(MockHost::new());
    let interpreter = mock_interpreter_with(host.clone(), BuiltIns::default())?;

    interpreter.report(ReportMode::Verbose)?;

    assert_eq!(host.effects().created_comments, vec![EMPTY_REPORT.to_string()]);
    Ok(())
}

#[test]
fn test_verbose_updates_existing_report() -> Result<()> {
    let old = "<!--@annotation-reviewpad-report-->\n**Reviewpad Report**\n**:information_source: Messages**\n* Changes the README.md";
    let host = Arc::new(MockHost::new().with_comments(vec![marker_comment(1234, old)]));
    let interpreter = mock_interpreter_with(host.clone(), BuiltIns::default())?;

    interpreter.report(ReportMode::Verbose)?;

    let effects = host.effects();
    assert_eq!(effects.updated_comments, vec![(1234, EMPTY_REPORT.to_string())]);
    assert!(effects.created_comments.is_empty());
    Ok(())
}

#[test]
fn test_verbose_collapses_duplicate_reports() -> Result<()> {
    let host = Arc::new(MockHost::new().with_comments(vec![
        marker_comment(1, EMPTY_REPORT),
        marker_comment(2, EMPTY_REPORT),
        marker_comment(3, EMPTY_REPORT),
    ]));
    let interpreter = mock_interpreter_with(host.clone(), BuiltIns::default())?;

    interpreter.report(ReportMode::Verbose)?;

    let effects = host.effects();
    assert_eq!(effects.deleted_comments, vec![1, 2]);
    assert_eq!(effects.updated_comments, vec![(3, EMPTY_REPORT.to_string())]);
    Ok(())
}

#[test]
fn test_verbose_is_idempotent() -> Result<()> {
    let host = Arc::new(MockHost::new().with_comments(vec![marker_comment(9, EMPTY_REPORT)]));
    let interpreter = mock_interpreter_with(host.clone(), BuiltIns::default())?;

    interpreter.report(ReportMode::Verbose)?;
    interpreter.report(ReportMode::Verbose)?;

    let effects = host.effects();
    assert!(effects.created_comments.is_empty());
    assert_eq!(
        effects.updated_comments,
        vec![(9, EMPTY_REPORT.to_string()), (9, EMPTY_REPORT.to_string())]
    );
    Ok(())
}

#[test]
fn test_write_failure_is_prefixed() -> Result<()> {
    let host = Arc::new(MockHost::new().failing_writes("Forbidden"));
    let interpreter = mock_interpreter_with(host, BuiltIns::default())?;

    let err = interpreter.report(ReportMode::Verbose).unwrap_err();
    assert_eq!(err.to_string(), "[report] error creating comment Forbidden");
    Ok(())
}

#[test]
fn test_report_after_cancel_fails() -> Result<()> {
    let cancel = CancelToken::new();
    let host = Arc::new(MockHost::new());
    let interpreter =
        mock_interpreter_for(host.clone(), BuiltIns::default(), mock_pull_request(), cancel.clone())?;

    cancel.cancel();
    let err = interpreter.report(ReportMode::Verbose).unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::Cancelled);
    assert!(host.effects().created_comments.is_empty());
    Ok(())
}

#[test]
fn test_every_publish_emits_report_event() -> Result<()> {
    let collector = Arc::new(RecordingCollector::default());
    let host = Arc::new(MockHost::new());
    let interpreter = mock_interpreter_using(host, BuiltIns::default(), Config::default(), collector.clone())?;

    interpreter.report(ReportMode::Silent)?;
    interpreter.report(ReportMode::Verbose)?;

    assert_eq!(collector.events(), vec!["report mode=silent", "report mode=verbose"]);
    Ok(())
}
