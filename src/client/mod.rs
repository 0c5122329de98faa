// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device client.
//!
//! A [`DeviceClient`] owns the single transport connection to one device,
//! polls its properties into a [`StatusCache`], notifies subscribers of
//! changes and hands out [`Getter`]s and [`Setter`]s that map host
//! characteristics onto device properties and commands.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use screenbar_lib::client::{ClientConfig, DeviceClient, SetOptions};
//! use screenbar_lib::protocol::Connector;
//! use screenbar_lib::types::{CharacteristicValue, SwitchState};
//!
//! # async fn example<C: Connector>(connector: C) -> screenbar_lib::Result<()> {
//! let config = ClientConfig::new("192.168.1.20", "0123456789abcdef0123456789abcdef", ["main_power"]);
//! let client = DeviceClient::new(Arc::new(connector), config);
//! client.start_polling();
//!
//! let on = client.map_get("On", |status| Ok(status.is_on("main_power").into()));
//! let set_on = client.map_set(
//!     "On",
//!     "set_power",
//!     |value, _| Ok(SwitchState::from(value.as_bool()).into()),
//!     SetOptions::new(),
//! );
//!
//! set_on.set(CharacteristicValue::Bool(true)).await?;
//! println!("main light on: {}", on.get()?);
//! # Ok(())
//! # }
//! ```

mod config;
mod getter;
mod setter;

pub use config::{ClientConfig, DEFAULT_POLL_INTERVAL, DEFAULT_RETRY_DELAY, RetryPolicy};
pub use getter::{GetTransformer, Getter};
pub use setter::{SetCheck, SetHook, SetOptions, SetOutcome, SetTransformer, SetUpdate, Setter};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::protocol::{Connection, Connector, GET_PROP};
use crate::state::{DeviceStatus, StatusCache, StatusChange};
use crate::subscription::{CallbackRegistry, SubscriptionId};
use crate::types::{CharacteristicValue, PropertyValue};

/// Result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The status was fetched and stored. Carries the changed subset.
    Updated(StatusChange),
    /// Another poll was still running; nothing was done.
    Skipped,
    /// The poll failed and the cached status was left untouched.
    Failed,
}

/// Handle to one physical device.
///
/// Cloning is cheap; all clones share the connection, cache and
/// subscriptions.
pub struct DeviceClient<C: Connector> {
    inner: Arc<ClientInner<C>>,
}

struct ClientInner<C: Connector> {
    config: ClientConfig,
    connector: Arc<C>,
    connection: OnceCell<Arc<C::Connection>>,
    cache: Arc<StatusCache>,
    callbacks: CallbackRegistry,
    loading: AtomicBool,
    polling: AtomicBool,
}

impl<C: Connector> Clone for DeviceClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> DeviceClient<C> {
    /// Creates a client. No connection is made until the first call or poll.
    #[must_use]
    pub fn new(connector: Arc<C>, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                connector,
                connection: OnceCell::new(),
                cache: Arc::new(StatusCache::new()),
                callbacks: CallbackRegistry::new(),
                loading: AtomicBool::new(false),
                polling: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The device token, which identifies this client.
    #[must_use]
    pub fn token(&self) -> &str {
        self.inner.config.token()
    }

    /// Returns the latest status snapshot, or `None` before the first
    /// successful poll.
    #[must_use]
    pub fn status(&self) -> Option<Arc<DeviceStatus>> {
        self.inner.cache.load()
    }

    pub(crate) fn cache(&self) -> &Arc<StatusCache> {
        &self.inner.cache
    }

    /// Returns `true` once the transport connection is established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connection.initialized()
    }

    /// Returns `true` once [`DeviceClient::start_polling`] has been called.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner.polling.load(Ordering::SeqCst)
    }

    /// Returns the connection, establishing it on first use.
    ///
    /// Concurrent callers share one connection attempt. Failed attempts are
    /// logged and retried according to the configured [`RetryPolicy`];
    /// with the default policy this only returns once connected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if a bounded retry policy gives up.
    pub async fn connection(&self) -> Result<Arc<C::Connection>> {
        self.inner
            .connection
            .get_or_try_init(|| self.connect_with_retry())
            .await
            .map(Arc::clone)
    }

    async fn connect_with_retry(&self) -> Result<Arc<C::Connection>> {
        let config = &self.inner.config;
        let policy = config.retry_policy();
        let mut attempt: u32 = 0;

        loop {
            match self
                .inner
                .connector
                .connect(config.address(), config.token())
                .await
            {
                Ok(connection) => {
                    tracing::debug!(address = %config.address(), attempts = attempt + 1, "Connected to device");
                    self.inner.callbacks.dispatch_connected();
                    return Ok(Arc::new(connection));
                }
                Err(err) => {
                    if !policy.should_retry(attempt) {
                        tracing::warn!(
                            address = %config.address(),
                            attempts = attempt + 1,
                            error = %err,
                            "Giving up connecting to device"
                        );
                        return Err(Error::Connection(err));
                    }

                    let delay = policy.delay_for_attempt(attempt);
                    tracing::error!(
                        address = %config.address(),
                        error = %err,
                        retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Failed to connect to device, will try again"
                    );
                    tokio::time::sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    /// Calls a device method on the shared connection.
    ///
    /// # Errors
    ///
    /// Returns a connection error, `Error::Transport` if the call fails, or
    /// `Error::Timeout` if an RPC timeout is configured and elapses.
    pub async fn call(&self, method: &str, params: Vec<PropertyValue>) -> Result<Vec<PropertyValue>> {
        let connection = self.connection().await?;
        let call = connection.call(method, params);

        match self.inner.config.rpc_timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(reply) => Ok(reply?),
                Err(_) => Err(Error::Timeout(
                    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                )),
            },
            None => Ok(call.await?),
        }
    }

    /// Fetches all configured keys once and stores the result.
    ///
    /// Subscribers are notified after the new snapshot is stored. If a poll
    /// is already running this returns [`PollOutcome::Skipped`] immediately.
    /// Failures are logged and leave the cache untouched.
    pub async fn refresh(&self) -> PollOutcome {
        let Some(_guard) = LoadingGuard::acquire(&self.inner.loading) else {
            tracing::debug!(token = %self.token(), "Poll already in progress");
            return PollOutcome::Skipped;
        };

        let keys = self.inner.config.keys();
        let params = keys.iter().map(|k| PropertyValue::from(k.as_str())).collect();

        match self.call(GET_PROP, params).await {
            Ok(values) => {
                let status = DeviceStatus::from_reply(keys, values);
                tracing::debug!(?status, "Data fetched");

                let change = self.inner.cache.replace(status);
                if let Some(status) = self.inner.cache.load() {
                    self.inner.callbacks.dispatch(&change, &status);
                }
                PollOutcome::Updated(change)
            }
            Err(err) => {
                tracing::error!(token = %self.token(), error = %err, "Error occurred when fetching data");
                PollOutcome::Failed
            }
        }
    }

    /// Starts the background poll loop.
    ///
    /// Polls immediately, then sleeps the poll interval after each poll.
    /// Calling this again has no effect. The loop ends once every handle to
    /// the client has been dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start_polling(&self) {
        if self
            .inner
            .polling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.config.poll_interval();
        tracing::debug!(token = %self.token(), interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX), "Starting poll loop");

        tokio::spawn(async move {
            loop {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                DeviceClient { inner }.refresh().await;
                tokio::time::sleep(interval).await;
            }
        });
    }

    /// Registers a callback fired after every successful poll.
    pub fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StatusChange, &DeviceStatus) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_status_changed(callback)
    }

    /// Registers a callback fired when the connection is established.
    pub fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.callbacks.on_connected(callback)
    }

    /// Removes a subscription. Returns `true` if it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.callbacks.unsubscribe(id)
    }

    /// Creates a read handler.
    ///
    /// `action` labels log messages. The transformer maps the cached status
    /// to the characteristic value.
    pub fn map_get<F>(&self, action: &str, transformer: F) -> Getter
    where
        F: Fn(&DeviceStatus) -> Result<CharacteristicValue> + Send + Sync + 'static,
    {
        Getter::new(action, Arc::clone(&self.inner.cache), Arc::new(transformer))
    }

    /// Creates a write handler calling the device method `api`.
    ///
    /// The transformer maps the requested value to the command arguments; a
    /// non-array result is sent as a single argument.
    pub fn map_set<F>(&self, action: &str, api: &str, transformer: F, options: SetOptions) -> Setter<C>
    where
        F: Fn(&CharacteristicValue, Option<&DeviceStatus>) -> Result<PropertyValue>
            + Send
            + Sync
            + 'static,
    {
        Setter::new(
            action.to_string(),
            api.to_string(),
            self.clone(),
            Arc::new(transformer),
            options,
        )
    }
}

impl<C: Connector> fmt::Debug for DeviceClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceClient")
            .field("address", &self.inner.config.address())
            .field("connected", &self.is_connected())
            .field("polling", &self.is_polling())
            .field("callbacks", &self.inner.callbacks)
            .finish_non_exhaustive()
    }
}

/// Holds the poll flag; released on drop.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = LoadingGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(LoadingGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(LoadingGuard::acquire(&flag).is_some());
    }
}
