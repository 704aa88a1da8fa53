//! GitHub implementation of [`GitClient`] backed by Octocrab.

use super::{ClientError, FileContent, GitClient, NewPullRequest, PullRequest};
use crate::rate_limit::ensure_core_rate_limit;
use async_trait::async_trait;
use octocrab::models::repos::Object;
use octocrab::params::repos::Reference;
use octocrab::Octocrab;
use tracing::{debug, warn};

/// Talks to the GitHub REST API.
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Octocrab,
}

impl OctocrabClient {
    /// Wraps an already configured Octocrab client.
    #[must_use]
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Builds an authenticated client, optionally against a GitHub Enterprise
    /// API base such as `https://github.example.com/api/v3`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] if the base URL is invalid or the client
    /// cannot be constructed.
    pub fn for_token(token: &str, api_base: Option<&str>) -> Result<Self, ClientError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(base) = api_base {
            builder = builder.base_uri(base).map_err(|e| ClientError::Api {
                message: format!("invalid API base URL '{base}': {e}"),
            })?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| map_octocrab_error("build client", &e))?;
        Ok(Self::new(octocrab))
    }

    /// Waits out a nearly exhausted rate limit. A failed check is logged and
    /// ignored; GitHub Enterprise answers 404 when rate limiting is disabled.
    async fn ensure_rate_limit(&self) {
        if let Err(e) = ensure_core_rate_limit(&self.octocrab).await {
            warn!(error = %map_octocrab_error("check rate limit", &e), "Skipping rate limit check");
        }
    }
}

/// Splits `owner/name` into its parts.
fn split_repo(repo: &str) -> Result<(&str, &str), ClientError> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(ClientError::InvalidRepository {
            repo: repo.to_string(),
        }),
    }
}

fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> ClientError {
    if let octocrab::Error::GitHub { source, .. } = error {
        let status = source.status_code.as_u16();
        let message = format!("{operation} failed with status {status}: {}", source.message);
        return match status {
            401 | 403 => ClientError::Authentication { message },
            404 => ClientError::NotFound { resource: message },
            409 | 422 => ClientError::Conflict { message },
            _ => ClientError::Api { message },
        };
    }

    if is_network_error(error) {
        return ClientError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    ClientError::Api {
        message: format!("{operation} failed: {error}"),
    }
}

/// Rejects contents responses that do not carry the whole file.
///
/// Files over 1 MB come back with encoding `none` and an empty body.
fn check_inline_content(
    path: &str,
    encoding: Option<&str>,
    size: i64,
    decoded_len: usize,
) -> Result<(), ClientError> {
    if encoding != Some("base64") {
        return Err(ClientError::Api {
            message: format!(
                "{path} ({size} bytes) has no inline content (encoding {})",
                encoding.unwrap_or("missing")
            ),
        });
    }
    if i64::try_from(decoded_len).ok() != Some(size) {
        return Err(ClientError::Api {
            message: format!("{path} decoded to {decoded_len} bytes, expected {size}"),
        });
    }
    Ok(())
}

#[async_trait]
impl GitClient for OctocrabClient {
    async fn get_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<FileContent, ClientError> {
        let (owner, name) = split_repo(repo)?;
        debug!(repo, branch, path, "Fetching file");

        let items = self
            .octocrab
            .repos(owner, name)
            .get_content()
            .path(path)
            .r#ref(branch)
            .send()
            .await
            .map_err(|e| map_octocrab_error("get file", &e))?;

        let content = items
            .items
            .into_iter()
            .find(|item| item.r#type == "file" && item.path == path)
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("{repo}/{path}@{branch}"),
            })?;

        let data = content
            .decoded_content()
            .map(String::into_bytes)
            .unwrap_or_default();
        check_inline_content(path, content.encoding.as_deref(), content.size, data.len())?;

        Ok(FileContent {
            data,
            sha: content.sha,
        })
    }

    async fn get_branch_head(&self, repo: &str, branch: &str) -> Result<String, ClientError> {
        let (owner, name) = split_repo(repo)?;

        let reference = self
            .octocrab
            .repos(owner, name)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await
            .map_err(|e| map_octocrab_error("get branch head", &e))?;

        match reference.object {
            Object::Commit { sha, .. } | Object::Tag { sha, .. } => Ok(sha),
            _ => Err(ClientError::Api {
                message: format!("refs/heads/{branch} does not point at a commit"),
            }),
        }
    }

    async fn create_branch(
        &self,
        repo: &str,
        new_name: &str,
        source_ref: &str,
    ) -> Result<(), ClientError> {
        let (owner, name) = split_repo(repo)?;
        self.ensure_rate_limit().await;

        self.octocrab
            .repos(owner, name)
            .create_ref(&Reference::Branch(new_name.to_string()), source_ref)
            .await
            .map_err(|e| map_octocrab_error("create branch", &e))?;
        Ok(())
    }

    async fn update_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
        base_sha: &str,
        content: &[u8],
    ) -> Result<(), ClientError> {
        let (owner, name) = split_repo(repo)?;
        self.ensure_rate_limit().await;

        self.octocrab
            .repos(owner, name)
            .update_file(path, message, content, base_sha)
            .branch(branch)
            .send()
            .await
            .map_err(|e| map_octocrab_error("update file", &e))?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo: &str,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, ClientError> {
        let (owner, name) = split_repo(repo)?;
        self.ensure_rate_limit().await;

        let pr = self
            .octocrab
            .pulls(owner, name)
            .create(
                pull_request.title.as_str(),
                pull_request.head.as_str(),
                pull_request.base.as_str(),
            )
            .body(pull_request.body.as_str())
            .send()
            .await
            .map_err(|e| map_octocrab_error("create pull request", &e))?;

        let link = pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("https://github.com/{repo}/pull/{}", pr.number));

        Ok(PullRequest {
            number: pr.number,
            link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Respond = dyn Fn(&str, &str) -> (u16, String) + Send + Sync;

    /// Serves one request per connection, answering with `respond(method, path)`.
    async fn spawn_server(respond: Arc<Respond>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let respond = Arc::clone(&respond);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 4096];
                    let header_end = loop {
                        let n = stream.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                            break pos + 4;
                        }
                    };
                    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                    let content_length = head
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    while buf.len() < header_end + content_length {
                        let n = stream.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                    }

                    let mut request_line = head.split_whitespace();
                    let method = request_line.next().unwrap_or_default();
                    let path = request_line.next().unwrap_or_default();
                    let (status, body) = respond(method, path);
                    let response = format!(
                        "HTTP/1.1 {status} Test\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    stream.write_all(response.as_bytes()).await.unwrap();
                });
            }
        });
        format!("http://{addr}")
    }

    fn contents_body(encoding: &str, size: u64, content: &str) -> String {
        let base = "https://example.com";
        format!(
            r#"{{"type":"file","encoding":"{encoding}","size":{size},"name":"test.yaml","path":"test.yaml","content":"{content}","sha":"abc123","url":"{base}/c","git_url":"{base}/g","html_url":"{base}/h","download_url":"{base}/d","_links":{{"self":"{base}/c","git":"{base}/g","html":"{base}/h"}}}}"#
        )
    }

    fn not_found(message: &str) -> (u16, String) {
        (404, format!(r#"{{"message":"{message}"}}"#))
    }

    #[test]
    fn accepts_complete_base64_content() {
        assert_eq!(check_inline_content("a.yaml", Some("base64"), 12, 12), Ok(()));
    }

    #[test]
    fn rejects_files_without_inline_content() {
        let result = check_inline_content("a.yaml", Some("none"), 2_000_000, 0);
        assert!(matches!(result, Err(ClientError::Api { .. })));
    }

    #[test]
    fn rejects_truncated_content() {
        let result = check_inline_content("a.yaml", Some("base64"), 100, 10);
        assert!(matches!(result, Err(ClientError::Api { .. })));
    }

    #[tokio::test]
    async fn large_file_is_an_error_not_empty_content() {
        let url = spawn_server(Arc::new(|_method: &str, path: &str| {
            if path.starts_with("/repos/testorg/testrepo/contents/test.yaml") {
                (200, contents_body("none", 2_000_000, ""))
            } else {
                not_found("Not Found")
            }
        }))
        .await;
        let client = OctocrabClient::for_token("token", Some(&url)).unwrap();

        let result = client.get_file("testorg/testrepo", "main", "test.yaml").await;

        assert!(matches!(result, Err(ClientError::Api { .. })), "{result:?}");
    }

    #[tokio::test]
    async fn reads_small_file() {
        let url = spawn_server(Arc::new(|_method: &str, path: &str| {
            if path.starts_with("/repos/testorg/testrepo/contents/test.yaml") {
                // "name: testing\n"
                (200, contents_body("base64", 14, "bmFtZTogdGVzdGluZwo="))
            } else {
                not_found("Not Found")
            }
        }))
        .await;
        let client = OctocrabClient::for_token("token", Some(&url)).unwrap();

        let file = client
            .get_file("testorg/testrepo", "main", "test.yaml")
            .await
            .unwrap();

        assert_eq!(file.data, b"name: testing\n");
        assert_eq!(file.sha, "abc123");
    }

    #[tokio::test]
    async fn writes_proceed_when_rate_limiting_is_disabled() {
        let url = spawn_server(Arc::new(|method: &str, path: &str| {
            match (method, path) {
                ("POST", "/repos/testorg/testrepo/git/refs") => (
                    201,
                    r#"{"ref":"refs/heads/update-a","node_id":"n","url":"https://example.com/r","object":{"type":"commit","sha":"980a0d5f19a64b4b30a87d4206aade58726b60e3","url":"https://example.com/o"}}"#
                        .to_string(),
                ),
                _ => not_found("Rate limiting is not enabled."),
            }
        }))
        .await;
        let client = OctocrabClient::for_token("token", Some(&url)).unwrap();

        let result = client
            .create_branch(
                "testorg/testrepo",
                "update-a",
                "980a0d5f19a64b4b30a87d4206aade58726b60e3",
            )
            .await;

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn splits_owner_and_name() {
        assert_eq!(split_repo("testorg/testrepo"), Ok(("testorg", "testrepo")));
    }

    #[test]
    fn rejects_malformed_repositories() {
        for repo in ["testrepo", "/testrepo", "testorg/", "a/b/c"] {
            assert!(
                matches!(split_repo(repo), Err(ClientError::InvalidRepository { .. })),
                "{repo} should be rejected"
            );
        }
    }
}
