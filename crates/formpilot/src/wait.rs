//! Bounded waits.
//!
//! A condition is polled until it yields a value or the budget elapses.
//! Conditions report "not yet" as `Ok(None)`; transient driver failures
//! (element missing, element detached) count as "not yet" too, and every
//! other failure ends the wait immediately.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::result::{FormError, FormResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default wait budget (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value the condition produced
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was checked
    pub attempts: u32,
}

// =============================================================================
// WAITER
// =============================================================================

/// Bounded condition poller
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options this waiter polls with
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `condition` until it returns `Ok(Some(_))`.
    ///
    /// The condition is checked at least once, even with a zero budget.
    ///
    /// # Errors
    ///
    /// [`FormError::Timeout`] when the budget elapses, or the first
    /// non-transient error the condition returns.
    pub async fn until<T, F, Fut>(
        &self,
        waited_for: &str,
        mut condition: F,
    ) -> FormResult<WaitResult<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FormResult<Option<T>>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let mut attempts = 0_u32;
        let mut last_transient: Option<FormError> = None;

        loop {
            attempts += 1;
            match condition().await {
                Ok(Some(value)) => {
                    return Ok(WaitResult {
                        value,
                        elapsed: start.elapsed(),
                        attempts,
                    });
                }
                Ok(None) => {}
                Err(e) if e.is_transient() => last_transient = Some(e),
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                if let Some(e) = last_transient {
                    debug!(waited_for, attempts, error = %e, "wait timed out");
                }
                return Err(FormError::Timeout {
                    ms: self.options.timeout_ms,
                    waited_for: waited_for.to_string(),
                });
            }
            let remaining = timeout.saturating_sub(elapsed);
            tokio::time::sleep(self.options.poll_interval().min(remaining)).await;
        }
    }
}

/// Wait for a boolean predicate with the given budget
pub async fn wait_until<F, Fut>(waited_for: &str, timeout_ms: u64, mut predicate: F) -> FormResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FormResult<bool>>,
{
    let waiter = Waiter::with_options(WaitOptions::new().with_timeout(timeout_ms));
    waiter
        .until(waited_for, || {
            let check = predicate();
            async move { Ok(check.await?.then_some(())) }
        })
        .await?;
    Ok(())
}
