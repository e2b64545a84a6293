//! Transient error retry for remote libSQL databases.
//!
//! Remote servers (Turso) occasionally answer with transient infrastructure
//! errors while nodes are recycled or under lock contention. These resolve
//! on their own within seconds. Local files never see them, so retries only
//! run when the handle was opened with `KeelDb::open_remote`.

use std::time::Duration;

/// Configuration for retry behavior on transient remote errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based): `base × 2^(attempt-1)`, capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect transient remote errors worth retrying.
///
/// Narrow on purpose: constraint violations and SQL errors are never retried.
pub fn is_transient_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("unable to acquire shared lock")
        || msg.contains("deletion must be in progress")
        || msg.contains("database is locked")
        || msg.contains("stream expired")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(400));
        assert_eq!(config.delay_for(10), Duration::from_secs(2));
    }

    #[test]
    fn constraint_errors_are_not_transient() {
        let err = libsql::Error::ConnectionFailed("UNIQUE constraint failed: allocations".into());
        assert!(!is_transient_error(&err));
        let err = libsql::Error::ConnectionFailed("unable to acquire shared lock on node".into());
        assert!(is_transient_error(&err));
    }
}
