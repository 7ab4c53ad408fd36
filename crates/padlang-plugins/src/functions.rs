use anyhow::Result;
use padlang_eval::error::ErrorKind;
use padlang_eval::{Env, RegisterKey, Value, bail_kind, eval_expr};
use std::path::Path;

pub fn author(env: &Env, _args: Vec<Value>) -> Result<Value> {
    Ok(Value::string(&env.pull_request().user.login))
}

pub fn title(env: &Env, _args: Vec<Value>) -> Result<Value> {
    Ok(Value::string(&env.pull_request().title))
}

pub fn description(env: &Env, _args: Vec<Value>) -> Result<Value> {
    Ok(Value::string(env.pull_request().body.clone().unwrap_or_default()))
}

pub fn is_draft(env: &Env, _args: Vec<Value>) -> Result<Value> {
    Ok(Value::Bool(env.pull_request().draft))
}

pub fn labels(env: &Env, _args: Vec<Value>) -> Result<Value> {
    Ok(Value::string_array(
        env.pull_request().labels.iter().map(|l| l.name.as_str()),
    ))
}

/// Requested users first, then requested teams.
pub fn reviewers(env: &Env, _args: Vec<Value>) -> Result<Value> {
    let pr = env.pull_request();
    let users = pr.requested_reviewers.iter().map(|u| u.login.as_str());
    let teams = pr.requested_teams.iter().map(|t| t.slug.as_str());
    Ok(Value::string_array(users.chain(teams)))
}

pub fn file_count(env: &Env, _args: Vec<Value>) -> Result<Value> {
    Ok(Value::Int(env.files().len() as i64))
}

pub fn total_created_pull_requests(env: &Env, args: Vec<Value>) -> Result<Value> {
    let dev = args[0].as_str()?;
    let pr = env.pull_request();

    let issues = env.host()?.list_issues_by_creator(pr.owner(), pr.repo(), dev)?;
    let total = issues.iter().filter(|i| i.pull_request.is_some()).count();
    Ok(Value::Int(total as i64))
}

/// True when every changed file ends in one of the given extensions.
pub fn has_file_extensions(env: &Env, args: Vec<Value>) -> Result<Value> {
    let extensions = args[0].as_string_vec()?;

    let all_match = env.files().iter().all(|file| {
        let ext = Path::new(&file.filename)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        extensions.contains(&ext)
    });
    Ok(Value::Bool(all_match))
}

/// True when any changed file matches the glob.
pub fn has_file_pattern(env: &Env, args: Vec<Value>) -> Result<Value> {
    let raw = args[0].as_str()?;
    let pattern = match glob::Pattern::new(raw) {
        Ok(pattern) => pattern,
        Err(e) => bail_kind!(ErrorKind::Runtime, "invalid file pattern {}: {}", raw, e),
    };

    Ok(Value::Bool(
        env.files().iter().any(|file| pattern.matches(&file.filename)),
    ))
}

pub fn group(env: &Env, args: Vec<Value>) -> Result<Value> {
    let name = args[0].as_str()?;
    match env.lookup(&RegisterKey::Group(name.to_string())) {
        Some(members) => Ok(members.clone()),
        None => bail_kind!(ErrorKind::Runtime, "group {} not found", name),
    }
}

/// Evaluates a registered rule's source on demand. A rule that reaches
/// itself again, directly or through other rules, fails.
pub fn rule(env: &Env, args: Vec<Value>) -> Result<Value> {
    let name = args[0].as_str()?;
    let Some(source) = env.lookup(&RegisterKey::Rule(name.to_string())) else {
        bail_kind!(ErrorKind::Runtime, "rule {} not found", name);
    };
    let _active = env.enter_rule(name)?;
    Ok(Value::Bool(eval_expr(env, source.as_str()?)?))
}

pub fn is_element_of(_env: &Env, args: Vec<Value>) -> Result<Value> {
    let needle = &args[0];
    Ok(Value::Bool(args[1].as_array()?.contains(needle)))
}
