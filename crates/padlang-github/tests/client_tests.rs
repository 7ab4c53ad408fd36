use anyhow::Result;
use padlang_eval::error::error_kind;
use padlang_eval::host::{HostApi, HostError};
use padlang_eval::ErrorKind;
use padlang_github::{GithubClient, provider_message};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

/// Serves one canned response per entry, in order, then stops.
/// Returns the base URL and a handle yielding the request lines seen.
fn serve(responses: Vec<(u16, String)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            seen.push(request_line.trim().to_string());

            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header.trim().is_empty() {
                    break;
                }
                if let Some(len) = header.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = len.trim().parse().unwrap();
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        seen
    });

    (base, handle)
}

fn client(base: &str) -> GithubClient {
    GithubClient::new(base, Some("t0ken".to_string()), Duration::from_secs(5)).unwrap()
}

#[test]
fn test_error_response_carries_provider_message() {
    let (base, server) = serve(vec![(
        500,
        r#"{"message": "ListListIssuesByRepoRequestFail", "documentation_url": "https://docs.github.com"}"#.to_string(),
    )]);

    let err = client(&base)
        .list_issues_by_creator("foobar", "default-mock-repo", "steve")
        .unwrap_err();

    assert_eq!(error_kind(&err), ErrorKind::HostApi);
    assert_eq!(err.to_string(), "ListListIssuesByRepoRequestFail");
    assert_eq!(err.downcast_ref::<HostError>().unwrap().status, Some(500));

    let seen = server.join().unwrap();
    assert!(seen[0].starts_with("GET /repos/foobar/default-mock-repo/issues?creator=steve&state=all&per_page=100&page=1"));
}

#[test]
fn test_pagination_stops_on_short_page() -> Result<()> {
    let full_page = format!(
        "[{}]",
        (0..100)
            .map(|i| format!(r#"{{"filename": "f{}.rs"}}"#, i))
            .collect::<Vec<_>>()
            .join(",")
    );
    let (base, server) = serve(vec![(200, full_page), (200, r#"[{"filename": "last.ts"}]"#.to_string())]);

    let files = client(&base).list_pull_request_files("foobar", "default-mock-repo", 6)?;

    assert_eq!(files.len(), 101);
    assert_eq!(files[100].filename, "last.ts");
    let seen = server.join().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[1].contains("page=2"));
    Ok(())
}

#[test]
fn test_create_comment_posts_body() -> Result<()> {
    let (base, server) = serve(vec![(201, r#"{"id": 1234, "body": "hello"}"#.to_string())]);

    let comment = client(&base).create_issue_comment("foobar", "default-mock-repo", 6, "hello")?;

    assert_eq!(comment.id, 1234);
    let seen = server.join().unwrap();
    assert!(seen[0].starts_with("POST /repos/foobar/default-mock-repo/issues/6/comments"));
    Ok(())
}

#[test]
fn test_provider_message_falls_back_to_body() {
    assert_eq!(provider_message(r#"{"message": "Not Found"}"#).as_deref(), Some("Not Found"));
    assert_eq!(provider_message("upstream timeout").as_deref(), Some("upstream timeout"));
    assert_eq!(provider_message(r#"{"error": "x"}"#).as_deref(), Some(r#"{"error": "x"}"#));
    assert_eq!(provider_message("  "), None);
}
