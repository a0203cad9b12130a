use std::time::Duration;

use crate::FailureKind;

/// Statuses that are worth another attempt.
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Statuses whose `Retry-After` header is honored.
const RETRY_AFTER_STATUSES: [u16; 2] = [429, 503];

/// Bounded exponential backoff.
///
/// After the n-th failed attempt the client waits `backoff_factor * 2^(n-1)`,
/// capped at `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub backoff_factor: Duration,
    pub max_backoff: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: Duration::from_secs(1),
            max_backoff: Duration::from_secs(120),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether a failure of this kind may succeed on another attempt.
    pub fn is_retryable(&self, kind: &FailureKind) -> bool {
        match kind {
            FailureKind::HttpStatus(code) => self.retry_statuses.contains(code),
            FailureKind::Timeout | FailureKind::Network => true,
            FailureKind::InvalidUrl
            | FailureKind::RedirectLimitExceeded
            | FailureKind::TooLarge { .. } => false,
        }
    }

    /// Pause before the next attempt, given how many attempts have failed so far.
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(31);
        self.backoff_factor
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Like [`RetryPolicy::backoff`], but a server supplied `Retry-After` may lengthen the wait.
    pub fn delay_for(
        &self,
        failed_attempts: u32,
        kind: &FailureKind,
        retry_after: Option<Duration>,
    ) -> Duration {
        let backoff = self.backoff(failed_attempts);
        let honors_header =
            matches!(kind, FailureKind::HttpStatus(code) if RETRY_AFTER_STATUSES.contains(code));
        match retry_after {
            Some(server_delay) if honors_header => server_delay.max(backoff).min(self.max_backoff),
            _ => backoff,
        }
    }
}

/// Parse a `Retry-After` value expressed in whole seconds.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
