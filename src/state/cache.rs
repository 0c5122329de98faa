// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared slot holding the latest status snapshot.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{DeviceStatus, StatusChange};

/// Holds the most recent [`DeviceStatus`] of a device.
///
/// Writers swap in whole snapshots; readers get an `Arc` to the snapshot
/// that was current when they looked and never observe a half-written
/// status.
///
/// # Examples
///
/// ```
/// use screenbar_lib::state::{DeviceStatus, StatusCache};
/// use serde_json::json;
///
/// let cache = StatusCache::new();
/// assert!(cache.load().is_none());
///
/// let status: DeviceStatus = [("bright", json!("50"))].into_iter().collect();
/// let change = cache.replace(status);
/// assert_eq!(change.len(), 1);
/// assert!(cache.load().is_some());
/// ```
#[derive(Debug, Default)]
pub struct StatusCache {
    current: RwLock<Option<Arc<DeviceStatus>>>,
}

impl StatusCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot, or `None` before the first poll.
    #[must_use]
    pub fn load(&self) -> Option<Arc<DeviceStatus>> {
        self.current.read().clone()
    }

    /// Returns `true` once a snapshot has been stored.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.current.read().is_some()
    }

    /// Replaces the snapshot wholesale and returns what changed relative to
    /// the previous one.
    pub fn replace(&self, next: DeviceStatus) -> StatusChange {
        let mut current = self.current.write();
        let change = StatusChange::between(current.as_deref(), &next);
        *current = Some(Arc::new(next));
        change
    }

    /// Derives a new snapshot from the current one.
    ///
    /// Does nothing if no snapshot has been stored yet. Returns `true` if the
    /// snapshot was replaced.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&DeviceStatus) -> DeviceStatus,
    {
        let mut current = self.current.write();
        match current.as_deref() {
            Some(status) => {
                let next = f(status);
                *current = Some(Arc::new(next));
                true
            }
            None => false,
        }
    }
}
