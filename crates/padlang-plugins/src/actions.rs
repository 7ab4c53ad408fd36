use anyhow::Result;
use padlang_eval::error::ErrorKind;
use padlang_eval::{Env, RegisterKey, Value, bail_kind};
use tracing::debug;

/// A registered label id maps to its display name; anything else is used
/// as the name itself.
fn label_name(env: &Env, id: &str) -> Result<String> {
    match env.lookup(&RegisterKey::Label(id.to_string())) {
        Some(name) => Ok(name.as_str()?.to_string()),
        None => Ok(id.to_string()),
    }
}

pub fn add_label(env: &Env, args: Vec<Value>) -> Result<()> {
    let name = label_name(env, args[0].as_str()?)?;
    let pr = env.pull_request();

    debug!(label = %name, "adding label");
    env.host()?.add_labels(pr.owner(), pr.repo(), pr.number, &[name])
}

pub fn remove_label(env: &Env, args: Vec<Value>) -> Result<()> {
    let name = label_name(env, args[0].as_str()?)?;
    let pr = env.pull_request();

    debug!(label = %name, "removing label");
    env.host()?.remove_label(pr.owner(), pr.repo(), pr.number, &name)
}

pub fn comment(env: &Env, args: Vec<Value>) -> Result<()> {
    let body = args[0].as_str()?;
    let pr = env.pull_request();

    env.host()?.create_issue_comment(pr.owner(), pr.repo(), pr.number, body)?;
    Ok(())
}

pub fn assign_reviewer(env: &Env, args: Vec<Value>) -> Result<()> {
    let reviewers = args[0].as_string_vec()?;
    if reviewers.is_empty() {
        bail_kind!(ErrorKind::Runtime, "assignReviewer: list of reviewers can't be empty");
    }
    let pr = env.pull_request();

    debug!(?reviewers, "requesting reviewers");
    env.host()?.request_reviewers(pr.owner(), pr.repo(), pr.number, &reviewers)
}
