//! Retry policy for transient HTTP failures.
//!
//! A [`RetryPolicy`] decides whether a failed response is retried and how
//! long to wait before the next attempt. Retries are driven purely by the
//! request method and the response status code; transport failures such as
//! timeouts are never retried.

use std::time::Duration;

use rand::Rng;

use crate::clients::HttpMethod;

/// Computes the backoff delay before retry number `attempt` (1-indexed).
pub type BackoffFn = fn(attempt: u32) -> Duration;

/// Default backoff: `300ms * 2^(attempt - 1)`.
#[must_use]
pub fn default_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    Duration::from_millis(300).saturating_mul(1u32 << exponent)
}

/// Bounded, classification-driven retry policy.
///
/// # Defaults
///
/// - `limit`: 2 retries (up to 3 attempts)
/// - `methods`: GET, PUT, HEAD, DELETE, OPTIONS, TRACE
/// - `status_codes`: 408, 413, 429, 500, 502, 503, 504
/// - `after_status_codes`: 413, 429, 503 (a `Retry-After` header on these
///   replaces the computed backoff)
/// - `backoff`: [`default_backoff`]
/// - `backoff_ceiling`: 10 seconds
/// - `jitter`: disabled
///
/// # Example
///
/// ```rust
/// use fulfillment_api::{HttpMethod, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .limit(4)
///     .backoff_ceiling(Duration::from_secs(2));
///
/// assert!(policy.should_retry(HttpMethod::Get, 503, 1));
/// assert!(!policy.should_retry(HttpMethod::Post, 503, 1));
/// assert!(!policy.should_retry(HttpMethod::Get, 404, 1));
/// assert!(!policy.should_retry(HttpMethod::Get, 503, 5));
/// ```
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    limit: u32,
    methods: Vec<HttpMethod>,
    status_codes: Vec<u16>,
    after_status_codes: Vec<u16>,
    backoff: BackoffFn,
    backoff_ceiling: Duration,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: 2,
            methods: vec![
                HttpMethod::Get,
                HttpMethod::Put,
                HttpMethod::Head,
                HttpMethod::Delete,
                HttpMethod::Options,
                HttpMethod::Trace,
            ],
            status_codes: vec![408, 413, 429, 500, 502, 503, 504],
            after_status_codes: vec![413, 429, 503],
            backoff: default_backoff,
            backoff_ceiling: Duration::from_secs(10),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::default().limit(0)
    }

    /// Sets the maximum number of retries after the first attempt.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the HTTP methods that may be retried.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Sets the response status codes that trigger a retry.
    #[must_use]
    pub fn status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.status_codes = codes.into_iter().collect();
        self
    }

    /// Sets the status codes whose `Retry-After` header is honoured.
    #[must_use]
    pub fn after_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.after_status_codes = codes.into_iter().collect();
        self
    }

    /// Sets the backoff function.
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffFn) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the upper bound for any single retry delay.
    #[must_use]
    pub const fn backoff_ceiling(mut self, ceiling: Duration) -> Self {
        self.backoff_ceiling = ceiling;
        self
    }

    /// Enables random jitter (50%-100% of the computed delay).
    #[must_use]
    pub const fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns the retry limit.
    #[must_use]
    pub const fn retry_limit(&self) -> u32 {
        self.limit
    }

    /// Returns the maximum number of attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.limit.saturating_add(1)
    }

    /// Returns the retryable methods.
    #[must_use]
    pub fn retryable_methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    /// Returns the retryable status codes.
    #[must_use]
    pub fn retryable_status_codes(&self) -> &[u16] {
        &self.status_codes
    }

    /// Returns the backoff ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> Duration {
        self.backoff_ceiling
    }

    /// Returns `true` if a response with `status` to a `method` request
    /// should be retried after `attempts` attempts have been made.
    #[must_use]
    pub fn should_retry(&self, method: HttpMethod, status: u16, attempts: u32) -> bool {
        attempts <= self.limit
            && self.methods.contains(&method)
            && self.status_codes.contains(&status)
    }

    /// Returns the delay before retry number `attempt` (1-indexed).
    ///
    /// `retry_after` is the server-provided delay, used instead of the
    /// backoff function when `status` is one of the `after_status_codes`.
    /// The result never exceeds the backoff ceiling.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, status: u16, retry_after: Option<Duration>) -> Duration {
        if let Some(server_delay) = retry_after {
            if self.after_status_codes.contains(&status) {
                return server_delay.min(self.backoff_ceiling);
            }
        }

        let delay = (self.backoff)(attempt).min(self.backoff_ceiling);
        if self.jitter {
            let factor = rand::thread_rng().gen_range(0.5..=1.0);
            delay.mul_f64(factor)
        } else {
            delay
        }
    }
}
