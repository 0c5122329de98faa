// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Characteristic read handlers.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::state::{DeviceStatus, StatusCache};
use crate::types::CharacteristicValue;

/// Derives a characteristic value from a status snapshot.
pub type GetTransformer = Arc<dyn Fn(&DeviceStatus) -> Result<CharacteristicValue> + Send + Sync>;

/// Reads a characteristic from the cached status.
///
/// Created by [`DeviceClient::map_get`](super::DeviceClient::map_get). A
/// getter never talks to the device.
#[derive(Clone)]
pub struct Getter {
    action: Arc<str>,
    cache: Arc<StatusCache>,
    transformer: GetTransformer,
}

impl Getter {
    pub(crate) fn new(action: &str, cache: Arc<StatusCache>, transformer: GetTransformer) -> Self {
        Self {
            action: Arc::from(action),
            cache,
            transformer,
        }
    }

    /// Label used in log messages.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Applies the transformer to the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::StaleData` if no poll has succeeded yet, or whatever
    /// the transformer returns.
    pub fn get(&self) -> Result<CharacteristicValue> {
        let Some(status) = self.cache.load() else {
            tracing::debug!(action = %self.action, "Get requested before data was fetched");
            return Err(Error::StaleData);
        };

        let value = (self.transformer)(&status)?;
        tracing::debug!(action = %self.action, %value, "Get");
        Ok(value)
    }

    /// Applies the transformer to an arbitrary snapshot.
    ///
    /// # Errors
    ///
    /// Returns whatever the transformer returns.
    pub fn get_from(&self, status: &DeviceStatus) -> Result<CharacteristicValue> {
        (self.transformer)(status)
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Getter")
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}
