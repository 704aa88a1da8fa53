//! Update error types.

use crate::client::ClientError;
use crate::syaml::PatchError;
use thiserror::Error;

/// Errors that stop an update, labelled by the step that failed.
///
/// Steps before the failing one have already taken effect remotely and are
/// not rolled back.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The file could not be fetched.
    #[error(transparent)]
    GetFile(ClientError),

    /// The content updater rejected the fetched file.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// The head of the source branch could not be resolved.
    #[error("failed to get branch head: {0}")]
    BranchHead(#[source] ClientError),

    /// The new branch could not be created.
    #[error("failed to create branch: {0}")]
    CreateBranch(#[source] ClientError),

    /// The commit was rejected, e.g. because the file changed meanwhile.
    #[error("failed to update file: {0}")]
    UpdateFile(#[source] ClientError),

    /// The pull request could not be opened.
    #[error("failed to create a pull request: {0}")]
    CreatePullRequest(#[source] ClientError),
}

impl UpdateError {
    /// The hosting client error behind this failure, if any.
    #[must_use]
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::GetFile(e)
            | Self::BranchHead(e)
            | Self::CreateBranch(e)
            | Self::UpdateFile(e)
            | Self::CreatePullRequest(e) => Some(e),
            Self::Patch(_) => None,
        }
    }
}
