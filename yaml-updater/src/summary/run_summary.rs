//! Run summary types.

use super::result::ProcessingResult;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of update definitions processed.
    pub updates_processed: usize,

    /// Number of files committed.
    pub files_updated: usize,

    /// Number of pull requests opened.
    pub prs_created: usize,

    /// Number of updates skipped.
    pub skipped: usize,

    /// Number of updates that failed.
    pub failed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        self.updates_processed += 1;
        match result {
            ProcessingResult::Updated { pull_request, .. } => {
                self.files_updated += 1;
                if pull_request.is_some() {
                    self.prs_created += 1;
                }
            }
            ProcessingResult::Skipped { .. } => self.skipped += 1,
            ProcessingResult::Failed { .. } => self.failed += 1,
        }
    }

    /// Returns true if any update failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
