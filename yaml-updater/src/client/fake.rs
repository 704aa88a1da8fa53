//! In-memory [`GitClient`] for tests.

use super::{ClientError, FileContent, GitClient, NewPullRequest, PullRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A branch created through [`GitClient::create_branch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBranch {
    pub repo: String,
    pub name: String,
    pub source_ref: String,
}

#[derive(Debug, Clone)]
struct StoredFile {
    data: Vec<u8>,
    sha: String,
}

/// (repo, branch, path)
type FileKey = (String, String, String);

#[derive(Debug, Default)]
struct State {
    files: HashMap<FileKey, StoredFile>,
    heads: HashMap<(String, String), String>,
    updated: HashMap<FileKey, Vec<u8>>,
    created_branches: Vec<CreatedBranch>,
    pull_requests: Vec<(String, NewPullRequest)>,
    next_revision: u64,
}

impl State {
    fn next_sha(&mut self) -> String {
        self.next_revision += 1;
        format!("{:040x}", self.next_revision)
    }
}

#[derive(Debug, Default)]
struct Failures {
    get_file: Option<ClientError>,
    get_branch_head: Option<ClientError>,
    create_branch: Option<ClientError>,
    update_file: Option<ClientError>,
    create_pull_request: Option<ClientError>,
}

/// Records every mutation so tests can assert on the remote side effects.
///
/// Creating a branch copies the files of whichever branch currently points at
/// the source ref, mirroring how a real host shares trees between branches.
/// File updates are checked against the current blob SHA.
#[derive(Debug, Default)]
pub struct FakeGitClient {
    state: Mutex<State>,
    failures: Mutex<Failures>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn file_key(repo: &str, branch: &str, path: &str) -> FileKey {
    (repo.to_string(), branch.to_string(), path.to_string())
}

impl FakeGitClient {
    /// Creates an empty fake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` at `path` on `branch`.
    pub fn add_file_contents(&self, repo: &str, path: &str, branch: &str, data: &[u8]) {
        let mut state = lock(&self.state);
        let sha = state.next_sha();
        state.files.insert(
            file_key(repo, branch, path),
            StoredFile {
                data: data.to_vec(),
                sha,
            },
        );
    }

    /// Points `branch` at `sha`.
    pub fn add_branch_head(&self, repo: &str, branch: &str, sha: &str) {
        lock(&self.state)
            .heads
            .insert((repo.to_string(), branch.to_string()), sha.to_string());
    }

    /// Makes every `get_file` call fail with `error`.
    pub fn fail_get_file(&self, error: ClientError) {
        lock(&self.failures).get_file = Some(error);
    }

    /// Makes every `get_branch_head` call fail with `error`.
    pub fn fail_get_branch_head(&self, error: ClientError) {
        lock(&self.failures).get_branch_head = Some(error);
    }

    /// Makes every `create_branch` call fail with `error`.
    pub fn fail_create_branch(&self, error: ClientError) {
        lock(&self.failures).create_branch = Some(error);
    }

    /// Makes every `update_file` call fail with `error`.
    pub fn fail_update_file(&self, error: ClientError) {
        lock(&self.failures).update_file = Some(error);
    }

    /// Makes every `create_pull_request` call fail with `error`.
    pub fn fail_create_pull_request(&self, error: ClientError) {
        lock(&self.failures).create_pull_request = Some(error);
    }

    /// Content committed through `update_file`, if any.
    #[must_use]
    pub fn updated_contents(&self, repo: &str, path: &str, branch: &str) -> Option<Vec<u8>> {
        lock(&self.state)
            .updated
            .get(&file_key(repo, branch, path))
            .cloned()
    }

    /// Current content of a file, whether seeded or committed.
    #[must_use]
    pub fn file_contents(&self, repo: &str, path: &str, branch: &str) -> Option<Vec<u8>> {
        lock(&self.state)
            .files
            .get(&file_key(repo, branch, path))
            .map(|file| file.data.clone())
    }

    /// All branches created so far, in order.
    #[must_use]
    pub fn created_branches(&self) -> Vec<CreatedBranch> {
        lock(&self.state).created_branches.clone()
    }

    /// All pull requests opened against `repo`, in order.
    #[must_use]
    pub fn pull_requests(&self, repo: &str) -> Vec<NewPullRequest> {
        lock(&self.state)
            .pull_requests
            .iter()
            .filter(|(r, _)| r == repo)
            .map(|(_, pr)| pr.clone())
            .collect()
    }

    /// Number of `update_file` commits recorded across all repositories.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        lock(&self.state).updated.len()
    }
}

#[async_trait]
impl GitClient for FakeGitClient {
    async fn get_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<FileContent, ClientError> {
        if let Some(error) = lock(&self.failures).get_file.clone() {
            return Err(error);
        }
        lock(&self.state)
            .files
            .get(&file_key(repo, branch, path))
            .map(|file| FileContent {
                data: file.data.clone(),
                sha: file.sha.clone(),
            })
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("{repo}/{path}@{branch}"),
            })
    }

    async fn get_branch_head(&self, repo: &str, branch: &str) -> Result<String, ClientError> {
        if let Some(error) = lock(&self.failures).get_branch_head.clone() {
            return Err(error);
        }
        lock(&self.state)
            .heads
            .get(&(repo.to_string(), branch.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("branch {repo}@{branch}"),
            })
    }

    async fn create_branch(
        &self,
        repo: &str,
        new_name: &str,
        source_ref: &str,
    ) -> Result<(), ClientError> {
        if let Some(error) = lock(&self.failures).create_branch.clone() {
            return Err(error);
        }
        let mut state = lock(&self.state);
        let head_key = (repo.to_string(), new_name.to_string());
        if state.heads.contains_key(&head_key) {
            return Err(ClientError::Conflict {
                message: format!("reference refs/heads/{new_name} already exists"),
            });
        }

        let source_branch = state
            .heads
            .iter()
            .find(|((r, _), sha)| r == repo && *sha == source_ref)
            .map(|((_, branch), _)| branch.clone());
        if let Some(source_branch) = source_branch {
            let copied: Vec<(FileKey, StoredFile)> = state
                .files
                .iter()
                .filter(|((r, b, _), _)| r == repo && *b == source_branch)
                .map(|((r, _, p), file)| ((r.clone(), new_name.to_string(), p.clone()), file.clone()))
                .collect();
            state.files.extend(copied);
        }

        state.heads.insert(head_key, source_ref.to_string());
        state.created_branches.push(CreatedBranch {
            repo: repo.to_string(),
            name: new_name.to_string(),
            source_ref: source_ref.to_string(),
        });
        Ok(())
    }

    async fn update_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        _message: &str,
        base_sha: &str,
        content: &[u8],
    ) -> Result<(), ClientError> {
        if let Some(error) = lock(&self.failures).update_file.clone() {
            return Err(error);
        }
        let mut state = lock(&self.state);
        let key = file_key(repo, branch, path);
        if let Some(current) = state.files.get(&key) {
            if current.sha != base_sha {
                return Err(ClientError::Conflict {
                    message: format!("{path} does not match {base_sha}"),
                });
            }
        }

        let sha = state.next_sha();
        state.files.insert(
            key.clone(),
            StoredFile {
                data: content.to_vec(),
                sha,
            },
        );
        state.updated.insert(key, content.to_vec());
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo: &str,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, ClientError> {
        if let Some(error) = lock(&self.failures).create_pull_request.clone() {
            return Err(error);
        }
        let mut state = lock(&self.state);
        state
            .pull_requests
            .push((repo.to_string(), pull_request.clone()));
        let number = state.pull_requests.len() as u64;
        Ok(PullRequest {
            number,
            link: format!("https://example.com/pull-request/{number}"),
        })
    }
}
