// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Characteristic write handlers.
//!
//! A [`Setter`] runs a fixed pipeline for every write:
//!
//! 1. `before` hook
//! 2. `check` predicate; when it returns `false` the device is not called
//! 3. transformer, producing the command arguments
//! 4. the device call, followed by [`check_reply`]
//! 5. `update`, patching the cached status
//! 6. `after` hook
//!
//! An error at any step is returned to the caller and the remaining steps
//! are skipped.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::DeviceClient;
use crate::error::Result;
use crate::protocol::{Connector, check_reply};
use crate::state::DeviceStatus;
use crate::types::{CharacteristicValue, PropertyValue};

/// Produces the command arguments from the requested value.
pub type SetTransformer =
    Arc<dyn Fn(&CharacteristicValue, Option<&DeviceStatus>) -> Result<PropertyValue> + Send + Sync>;

/// Hook run before or after a write.
pub type SetHook =
    Arc<dyn Fn(&CharacteristicValue, Option<&DeviceStatus>) -> Result<()> + Send + Sync>;

/// Decides whether a write reaches the device.
pub type SetCheck = Arc<dyn Fn(&CharacteristicValue, Option<&DeviceStatus>) -> bool + Send + Sync>;

/// Derives the new cached status from the written value, the arguments sent
/// and the current status.
pub type SetUpdate =
    Arc<dyn Fn(&CharacteristicValue, &[PropertyValue], &DeviceStatus) -> DeviceStatus + Send + Sync>;

/// What a call to [`Setter::set`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The command was sent and acknowledged.
    Applied,
    /// The check predicate declined the write; the device was not called.
    Skipped,
    /// A later call arrived within the debounce window and replaced this one.
    Superseded,
}

/// Optional behaviour attached to a [`Setter`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use screenbar_lib::client::SetOptions;
///
/// let options = SetOptions::new()
///     .debounce(Duration::from_millis(150))
///     .check(|_value, status| status.is_some_and(|s| s.is_on("main_power")))
///     .update(|value, _args, status| status.with("bright", value.to_string()));
/// # let _ = options;
/// ```
#[derive(Clone, Default)]
pub struct SetOptions {
    debounce: Option<Duration>,
    before: Option<SetHook>,
    check: Option<SetCheck>,
    update: Option<SetUpdate>,
    after: Option<SetHook>,
}

impl SetOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coalesces calls arriving within `window` of each other; only the last
    /// one runs, `window` after it was made.
    #[must_use]
    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = Some(window);
        self
    }

    #[must_use]
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CharacteristicValue, Option<&DeviceStatus>) -> Result<()> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&CharacteristicValue, Option<&DeviceStatus>) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Arc::new(check));
        self
    }

    #[must_use]
    pub fn update<F>(mut self, update: F) -> Self
    where
        F: Fn(&CharacteristicValue, &[PropertyValue], &DeviceStatus) -> DeviceStatus
            + Send
            + Sync
            + 'static,
    {
        self.update = Some(Arc::new(update));
        self
    }

    #[must_use]
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CharacteristicValue, Option<&DeviceStatus>) -> Result<()> + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for SetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetOptions")
            .field("debounce", &self.debounce)
            .field("before", &self.before.is_some())
            .field("check", &self.check.is_some())
            .field("update", &self.update.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// Writes a characteristic by issuing a device command.
///
/// Created by [`DeviceClient::map_set`]. Cloning is cheap and clones share
/// one debounce window.
pub struct Setter<C: Connector> {
    inner: Arc<SetterInner<C>>,
}

struct SetterInner<C: Connector> {
    action: String,
    api: String,
    client: DeviceClient<C>,
    transformer: SetTransformer,
    options: SetOptions,
    generation: AtomicU64,
}

impl<C: Connector> Clone for Setter<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> Setter<C> {
    pub(crate) fn new(
        action: String,
        api: String,
        client: DeviceClient<C>,
        transformer: SetTransformer,
        options: SetOptions,
    ) -> Self {
        Self {
            inner: Arc::new(SetterInner {
                action,
                api,
                client,
                transformer,
                options,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Label used in log messages.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.inner.action
    }

    /// The device method this setter calls.
    #[must_use]
    pub fn api(&self) -> &str {
        &self.inner.api
    }

    /// Writes `value`.
    ///
    /// With a debounce window configured, the call first waits out the
    /// window and resolves to [`SetOutcome::Superseded`] without doing any
    /// work if another call arrived meanwhile.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a hook, the transformer, the
    /// connection, the device call or the reply check.
    pub async fn set(&self, value: CharacteristicValue) -> Result<SetOutcome> {
        if let Some(window) = self.inner.options.debounce {
            let ticket = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(window).await;
            if self.inner.generation.load(Ordering::SeqCst) != ticket {
                tracing::debug!(action = %self.inner.action, %value, "Set superseded");
                return Ok(SetOutcome::Superseded);
            }
        }

        let result = self.run(&value).await;
        if let Err(err) = &result {
            tracing::error!(action = %self.inner.action, %value, error = %err, "Set failed");
        }
        result
    }

    async fn run(&self, value: &CharacteristicValue) -> Result<SetOutcome> {
        let inner = &*self.inner;
        let options = &inner.options;

        if let Some(before) = &options.before {
            before(value, inner.client.status().as_deref())?;
        }

        let status = inner.client.status();
        let proceed = options
            .check
            .as_ref()
            .is_none_or(|check| check(value, status.as_deref()));

        let outcome = if proceed {
            let args = into_args((inner.transformer)(value, status.as_deref())?);
            tracing::debug!(action = %inner.action, %value, api = %inner.api, ?args, "Set");

            let reply = inner.client.call(&inner.api, args.clone()).await?;
            tracing::debug!(action = %inner.action, ?reply, "Set result");
            check_reply(&reply)?;

            if let Some(update) = &options.update {
                inner
                    .client
                    .cache()
                    .update(|current| update(value, &args, current));
            }
            SetOutcome::Applied
        } else {
            tracing::debug!(action = %inner.action, %value, "Set skipped by check");
            SetOutcome::Skipped
        };

        if let Some(after) = &options.after {
            after(value, inner.client.status().as_deref())?;
        }

        Ok(outcome)
    }
}

impl<C: Connector> fmt::Debug for Setter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("action", &self.inner.action)
            .field("api", &self.inner.api)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// Commands take a parameter list; scalars are wrapped.
fn into_args(value: PropertyValue) -> Vec<PropertyValue> {
    match value {
        PropertyValue::Array(args) => args,
        other => vec![other],
    }
}
