//! Processing result types.

use crate::client::PullRequest;

/// Outcome of one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingResult {
    /// The file was committed.
    Updated {
        /// Repository full name.
        repository: String,
        /// Updated file.
        filename: String,
        /// Pull request opened for the change, if any.
        pull_request: Option<PullRequest>,
    },

    /// The update was not attempted.
    Skipped {
        /// Repository full name.
        repository: String,
        /// Reason for skipping.
        reason: String,
    },

    /// The update failed.
    Failed {
        /// Repository full name.
        repository: String,
        /// File that was being updated.
        filename: String,
        /// Error message.
        error: String,
    },
}
