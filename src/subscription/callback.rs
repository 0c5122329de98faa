// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device status subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::{DeviceStatus, StatusChange};

/// Unique identifier for a subscription.
///
/// Returned when registering a callback and used to unsubscribe later. IDs
/// are unique within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Status change callback: receives the changed subset and the full new
/// snapshot.
type StatusCallback = Arc<dyn Fn(&StatusChange, &DeviceStatus) + Send + Sync>;

/// Connected callback, fired once the transport connection is established.
type ConnectedCallback = Arc<dyn Fn() + Send + Sync>;

/// Registry for device status callbacks.
///
/// Uses `parking_lot::RwLock` for interior mutability. Callbacks are cloned
/// out of the lock before being invoked, so a callback may register or
/// unregister other callbacks without deadlocking.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Status change callbacks.
    status_callbacks: RwLock<HashMap<SubscriptionId, StatusCallback>>,
    /// Connection established callbacks.
    connected_callbacks: RwLock<HashMap<SubscriptionId, ConnectedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            status_callbacks: RwLock::new(HashMap::new()),
            connected_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback for status changes detected by polling.
    pub fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StatusChange, &DeviceStatus) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.status_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for when the device connection is established.
    pub fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.connected_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Removes a subscription.
    ///
    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        if self.status_callbacks.write().remove(&id).is_some() {
            return true;
        }
        self.connected_callbacks.write().remove(&id).is_some()
    }

    /// Removes all subscriptions.
    pub fn clear(&self) {
        self.status_callbacks.write().clear();
        self.connected_callbacks.write().clear();
    }

    /// Dispatches a status change to all status callbacks.
    pub fn dispatch(&self, change: &StatusChange, status: &DeviceStatus) {
        let callbacks: Vec<StatusCallback> = self.status_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(change, status);
        }
    }

    /// Dispatches the connected notification.
    pub fn dispatch_connected(&self) {
        let callbacks: Vec<ConnectedCallback> =
            self.connected_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.status_callbacks.read().len() + self.connected_callbacks.read().len()
    }

    /// Returns `true` if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("status_callbacks", &self.status_callbacks.read().len())
            .field("connected_callbacks", &self.connected_callbacks.read().len())
            .finish_non_exhaustive()
    }
}
