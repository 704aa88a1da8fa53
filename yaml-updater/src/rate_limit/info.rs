//! Rate limit information.

use std::time::Duration;

/// Maximum time to wait for a rate limit reset (1 hour).
pub const MAX_WAIT_SECS: u64 = 3600;

/// Remaining requests below which callers should wait for the reset.
pub const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Rate limit information for the core API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// How long to wait before the next call, given the current Unix time.
    ///
    /// Returns `None` while enough requests remain or once the reset has
    /// passed. Waits are capped at [`MAX_WAIT_SECS`].
    #[must_use]
    pub fn wait_duration(&self, now: u64) -> Option<Duration> {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now {
            return None;
        }
        Some(Duration::from_secs((self.reset - now).min(MAX_WAIT_SECS)))
    }
}
