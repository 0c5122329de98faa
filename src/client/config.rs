// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device client configuration.

use std::time::Duration;

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Default delay between connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);

/// Configuration for a [`DeviceClient`](super::DeviceClient).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use screenbar_lib::client::{ClientConfig, RetryPolicy};
///
/// let config = ClientConfig::new("192.168.1.20", "ffffffffffffffffffffffffffffffff", ["bright", "main_power"])
///     .with_poll_interval(Duration::from_secs(10))
///     .with_retry_policy(RetryPolicy::new().with_max_retries(3))
///     .with_rpc_timeout(Duration::from_secs(2));
///
/// assert_eq!(config.keys().len(), 2);
/// assert_eq!(config.poll_interval(), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    address: String,
    token: String,
    keys: Vec<String>,
    poll_interval: Duration,
    retry: RetryPolicy,
    rpc_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a configuration polling `keys` from the device at `address`.
    #[must_use]
    pub fn new<I, K>(address: impl Into<String>, token: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            address: address.into(),
            token: token.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry: RetryPolicy::default(),
            rpc_timeout: None,
        }
    }

    /// Sets the interval between polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the connection retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Bounds every device call. Without it calls wait for the transport.
    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = Some(timeout);
        self
    }

    /// Device network address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Device authentication token. Also identifies the device.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Property keys fetched on every poll.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    #[must_use]
    pub fn rpc_timeout(&self) -> Option<Duration> {
        self.rpc_timeout
    }
}

/// Policy for retrying a failed connection attempt.
///
/// The default retries forever with a fixed three second delay.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use screenbar_lib::client::RetryPolicy;
///
/// let policy = RetryPolicy::new()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(500))
///     .with_backoff_multiplier(2.0)
///     .with_max_delay(Duration::from_secs(30));
///
/// assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(500));
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
/// assert!(!policy.should_retry(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (None = infinite).
    pub max_retries: Option<u32>,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay.
    pub max_delay: Duration,
    /// Growth factor applied per retry.
    pub backoff_multiplier: f32,
}

impl RetryPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Retries forever, waiting `delay` between attempts.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            max_retries: None,
            initial_delay: delay,
            max_delay: delay,
            backoff_multiplier: 1.0,
        }
    }

    /// A policy that makes a single attempt.
    #[must_use]
    pub fn never() -> Self {
        Self::default().with_max_retries(0)
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    #[must_use]
    pub fn with_infinite_retries(mut self) -> Self {
        self.max_retries = None;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the delay after the failed attempt with index `attempt`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let multiplier = self
            .backoff_multiplier
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));

        #[allow(clippy::cast_precision_loss)]
        let delay_ms = self.initial_delay.as_millis() as f32 * multiplier;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = Duration::from_millis(delay_ms as u64);

        delay.min(self.max_delay)
    }

    /// Returns `true` if another attempt may follow failed attempt `attempt`.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.max_retries.is_none_or(|max| attempt < max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: DEFAULT_RETRY_DELAY,
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 1.0,
        }
    }
}
