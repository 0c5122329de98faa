// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Difference between two status snapshots.

use std::collections::BTreeMap;

use crate::types::PropertyValue;

use super::DeviceStatus;

/// The properties whose values changed between two polls.
///
/// # Examples
///
/// ```
/// use screenbar_lib::state::{DeviceStatus, StatusChange};
/// use serde_json::json;
///
/// let before: DeviceStatus = [("a", json!("1")), ("b", json!("2"))].into_iter().collect();
/// let after: DeviceStatus = [("a", json!("1")), ("b", json!("3"))].into_iter().collect();
///
/// let change = StatusChange::between(Some(&before), &after);
/// assert_eq!(change.len(), 1);
/// assert_eq!(change.get("b"), Some(&json!("3")));
///
/// // Without a previous snapshot every property counts as changed.
/// assert_eq!(StatusChange::between(None, &after).len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatusChange {
    changed: BTreeMap<String, PropertyValue>,
}

impl StatusChange {
    /// Computes the properties of `next` whose value differs from
    /// `previous`.
    #[must_use]
    pub fn between(previous: Option<&DeviceStatus>, next: &DeviceStatus) -> Self {
        let changed = next
            .iter()
            .filter(|(key, value)| previous.and_then(|p| p.get(key)) != Some(*value))
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        Self { changed }
    }

    /// Returns the new value of a changed property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.changed.get(key)
    }

    /// Returns `true` if the property changed.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.changed.contains_key(key)
    }

    /// Iterates over the changed `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.changed.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of changed properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changed.len()
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}
