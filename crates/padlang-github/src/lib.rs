//! Blocking GitHub REST client for padlang.
//!
//! [`GithubClient`] implements [`HostApi`] over the v3 REST API. Every
//! non-2xx response becomes a [`HostError`] carrying the provider's
//! `message` so that rule authors see GitHub's own wording.
//!
//! ```no_run
//! use padlang_eval::Config;
//! use padlang_github::GithubClient;
//!
//! let config = Config::load(".")?;
//! let client = GithubClient::from_config(&config)?;
//! let pr = client.get_pull_request("octocat", "hello-world", 42)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use padlang_eval::host::{HostApi, HostError, Issue, IssueComment, PullRequest, PullRequestFile, User};
use padlang_eval::Config;
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "padlang";
const PER_PAGE: usize = 100;

pub struct GithubClient {
    http: Client,
    api_url: Url,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let api_url = Url::parse(api_url).map_err(|e| anyhow!("invalid API url {}: {}", api_url, e))?;
        if api_url.cannot_be_a_base() {
            return Err(anyhow!("invalid API url {}", api_url));
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, api_url, token })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, config.token.clone(), config.http_timeout)
    }

    /// Fetches the pull request snapshot a run starts from.
    pub fn get_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        let url = self.url(&["repos", owner, repo, "pulls", &number.to_string()]);
        self.send_json(self.request(Method::GET, url))
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "github request");
        let request = self
            .http
            .request(method, url)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .map_err(|e| HostError::new(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = provider_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        Err(HostError::new(Some(status.as_u16()), message).into())
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request)?;
        response
            .json()
            .map_err(|e| HostError::new(None, format!("invalid response body: {}", e)).into())
    }

    /// Follows `page=` until a short page comes back.
    fn get_paginated<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let per_page = PER_PAGE.to_string();

        for page in 1.. {
            let page = page.to_string();
            let request = self
                .request(Method::GET, url.clone())
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page.as_str())]);
            let batch: Vec<T> = self.send_json(request)?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                break;
            }
        }

        Ok(items)
    }
}

/// The `message` field of a GitHub error payload, or the raw body.
pub fn provider_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => match json.get("message").and_then(|m| m.as_str()) {
            Some(message) => Some(message.to_string()),
            None => Some(body.to_string()),
        },
        Err(_) => Some(body.to_string()),
    }
}

impl HostApi for GithubClient {
    fn list_pull_request_files(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<PullRequestFile>> {
        let url = self.url(&["repos", owner, repo, "pulls", &number.to_string(), "files"]);
        self.get_paginated(url, &[])
    }

    fn list_org_members(&self, org: &str) -> Result<Vec<User>> {
        self.get_paginated(self.url(&["orgs", org, "members"]), &[])
    }

    fn list_issues_by_creator(&self, owner: &str, repo: &str, creator: &str) -> Result<Vec<Issue>> {
        let url = self.url(&["repos", owner, repo, "issues"]);
        self.get_paginated(url, &[("creator", creator), ("state", "all")])
    }

    fn list_issue_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<IssueComment>> {
        let url = self.url(&["repos", owner, repo, "issues", &number.to_string(), "comments"]);
        self.get_paginated(url, &[])
    }

    fn create_issue_comment(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<IssueComment> {
        let url = self.url(&["repos", owner, repo, "issues", &number.to_string(), "comments"]);
        self.send_json(self.request(Method::POST, url).json(&json!({ "body": body })))
    }

    fn update_issue_comment(&self, owner: &str, repo: &str, comment_id: u64, body: &str) -> Result<IssueComment> {
        let url = self.url(&["repos", owner, repo, "issues", "comments", &comment_id.to_string()]);
        self.send_json(self.request(Method::PATCH, url).json(&json!({ "body": body })))
    }

    fn delete_issue_comment(&self, owner: &str, repo: &str, comment_id: u64) -> Result<()> {
        let url = self.url(&["repos", owner, repo, "issues", "comments", &comment_id.to_string()]);
        self.send(self.request(Method::DELETE, url))?;
        Ok(())
    }

    fn add_labels(&self, owner: &str, repo: &str, number: u64, labels: &[String]) -> Result<()> {
        let url = self.url(&["repos", owner, repo, "issues", &number.to_string(), "labels"]);
        self.send(self.request(Method::POST, url).json(&json!({ "labels": labels })))?;
        Ok(())
    }

    fn remove_label(&self, owner: &str, repo: &str, number: u64, label: &str) -> Result<()> {
        let url = self.url(&["repos", owner, repo, "issues", &number.to_string(), "labels", label]);
        self.send(self.request(Method::DELETE, url))?;
        Ok(())
    }

    fn request_reviewers(&self, owner: &str, repo: &str, number: u64, reviewers: &[String]) -> Result<()> {
        let url = self.url(&["repos", owner, repo, "pulls", &number.to_string(), "requested_reviewers"]);
        self.send(self.request(Method::POST, url).json(&json!({ "reviewers": reviewers })))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> GithubClient {
        GithubClient::new(api_url, None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn urls_are_built_from_segments() {
        let gh = client("https://api.github.com");
        assert_eq!(
            gh.url(&["repos", "foobar", "default-mock-repo", "pulls", "6", "files"]).as_str(),
            "https://api.github.com/repos/foobar/default-mock-repo/pulls/6/files"
        );
    }

    #[test]
    fn enterprise_prefix_is_kept() {
        let gh = client("https://ghe.example.com/api/v3/");
        assert_eq!(
            gh.url(&["orgs", "acme", "members"]).as_str(),
            "https://ghe.example.com/api/v3/orgs/acme/members"
        );
    }

    #[test]
    fn label_names_are_escaped() {
        let gh = client("https://api.github.com");
        assert_eq!(
            gh.url(&["repos", "o", "r", "issues", "1", "labels", "needs review/ui"]).as_str(),
            "https://api.github.com/repos/o/r/issues/1/labels/needs%20review%2Fui"
        );
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        assert!(GithubClient::new("not a url", None, Duration::from_secs(1)).is_err());
        assert!(GithubClient::new("mailto:someone@example.com", None, Duration::from_secs(1)).is_err());
    }
}
