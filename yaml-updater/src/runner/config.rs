//! Runner configuration.

use std::time::Duration;

/// Configuration for running a batch of updates.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// GitHub token used for API calls.
    token: String,
    /// GitHub API base URL, for GitHub Enterprise.
    api_url: Option<String>,
    /// Whether to preview changes without touching the repository.
    dry_run: bool,
    /// Maximum number of updates in flight.
    concurrency: usize,
    /// Time limit for a single update.
    timeout: Option<Duration>,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(token: String, dry_run: bool, concurrency: usize) -> Self {
        Self {
            token,
            api_url: None,
            dry_run,
            concurrency: concurrency.max(1),
            timeout: None,
        }
    }

    /// Sets a custom API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = Some(api_url);
        self
    }

    /// Abandons any single update that takes longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the API base URL, if overridden.
    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the max number of concurrent updates.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the per-update time limit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
