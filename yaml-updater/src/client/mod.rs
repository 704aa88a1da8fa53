//! Hosting client capability.
//!
//! The [`Updater`](crate::Updater) only talks to the version-control host
//! through the [`GitClient`] trait, so providers can be swapped without
//! touching the orchestration. [`OctocrabClient`] is the GitHub
//! implementation.

mod error;
#[cfg(any(test, feature = "test-support"))]
mod fake;
mod github;

pub use error::ClientError;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{CreatedBranch, FakeGitClient};
pub use github::OctocrabClient;

use async_trait::async_trait;

/// Content of a file together with its revision token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Raw file bytes.
    pub data: Vec<u8>,

    /// Blob SHA of this revision. Passed back on update so the host can
    /// reject the write if the file changed in between.
    pub sha: String,
}

/// Parameters for opening a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    /// Branch containing the change.
    pub head: String,
    /// Branch the change should be merged into.
    pub base: String,
}

/// A pull request opened by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,

    /// Browser URL of the pull request.
    pub link: String,
}

/// Operations the updater needs from a version-control host.
///
/// Implementations must be safe to share between concurrent updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Fetches `path` as it exists on `branch`.
    async fn get_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<FileContent, ClientError>;

    /// Returns the commit SHA at the tip of `branch`.
    async fn get_branch_head(&self, repo: &str, branch: &str) -> Result<String, ClientError>;

    /// Creates `new_name` pointing at `source_ref`.
    async fn create_branch(
        &self,
        repo: &str,
        new_name: &str,
        source_ref: &str,
    ) -> Result<(), ClientError>;

    /// Commits `content` to `path` on `branch`.
    ///
    /// `base_sha` is the revision the change was computed from; the host must
    /// reject the write if it is no longer current.
    async fn update_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
        base_sha: &str,
        content: &[u8],
    ) -> Result<(), ClientError>;

    /// Opens a pull request.
    async fn create_pull_request(
        &self,
        repo: &str,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, ClientError>;
}
