// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process-wide map from device token to [`DeviceClient`].
//!
//! Several accessories may be configured for the same physical device. They
//! must share one client so that the device sees a single connection and a
//! single poll loop.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::{ClientConfig, DeviceClient};
use crate::protocol::Connector;

/// Owns the transport connector and one client per device token.
///
/// # Examples
///
/// ```no_run
/// use screenbar_lib::client::ClientConfig;
/// use screenbar_lib::registry::DeviceRegistry;
/// # use screenbar_lib::protocol::Connector;
///
/// # fn example<C: Connector>(connector: C) {
/// let registry = DeviceRegistry::new(connector);
///
/// let a = registry.get_or_create(ClientConfig::new("10.0.0.5", "token", ["bright"]));
/// let b = registry.get_or_create(ClientConfig::new("10.0.0.5", "token", ["power"]));
///
/// // Same device, same client; the first configuration wins.
/// assert_eq!(b.config().keys(), ["bright".to_string()]);
/// assert_eq!(registry.len(), 1);
/// # }
/// ```
pub struct DeviceRegistry<C: Connector> {
    connector: Arc<C>,
    clients: Mutex<HashMap<String, DeviceClient<C>>>,
}

impl<C: Connector> DeviceRegistry<C> {
    /// Creates an empty registry using `connector` for every client.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the client for `config.token()`, creating it if needed.
    ///
    /// Lookup and insertion happen under one lock, so concurrent callers
    /// with the same token always receive the same client. When a client
    /// already exists, `config` is ignored.
    pub fn get_or_create(&self, config: ClientConfig) -> DeviceClient<C> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(config.token()) {
            tracing::debug!(token = %config.token(), "Reusing device client");
            return client.clone();
        }

        tracing::debug!(token = %config.token(), address = %config.address(), "Creating device client");
        let token = config.token().to_string();
        let client = DeviceClient::new(Arc::clone(&self.connector), config);
        clients.insert(token, client.clone());
        client
    }

    /// Returns the client for `token`, if one was created.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<DeviceClient<C>> {
        self.clients.lock().get(token).cloned()
    }

    /// Returns the tokens of all registered devices.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.clients.lock().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

impl<C: Connector> fmt::Debug for DeviceRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.len())
            .finish_non_exhaustive()
    }
}
