//! Update request types.

/// Everything needed to update one key in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    /// Repository identifier, e.g. `my-org/my-repo`.
    pub repo: String,

    /// Path of the file relative to the repository root.
    pub filename: String,

    /// Dotted path of the key to update.
    pub key: String,

    /// Value to store at `key`.
    pub new_value: String,

    /// Branch to read from; also the commit target when no branch is
    /// generated, and the pull request base when one is.
    pub branch: String,

    /// Prefix for a generated branch, e.g. `update-image-`. Empty means
    /// commit straight to `branch`.
    pub branch_generate_name: String,

    /// Message for the commit that updates the file.
    pub commit_message: String,

    /// Used only when a new branch was created.
    pub pull_request: PullRequestInput,
}

/// Title and body of the pull request to open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestInput {
    pub title: String,
    pub body: String,
}
