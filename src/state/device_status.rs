// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached device status snapshot.

use std::collections::BTreeMap;

use crate::error::ValueError;
use crate::types::{PropertyValue, SwitchState};

/// Last-known values of the configured property keys.
///
/// A status is an immutable snapshot: the device client swaps in a new one
/// after every successful poll, and setters produce patched copies with
/// [`DeviceStatus::with`]. Readers always see a complete snapshot.
///
/// # Examples
///
/// ```
/// use screenbar_lib::state::DeviceStatus;
/// use screenbar_lib::types::SwitchState;
/// use serde_json::json;
///
/// let keys = vec!["main_power".to_string(), "bright".to_string()];
/// let status = DeviceStatus::from_reply(&keys, vec![json!("on"), json!("80")]);
///
/// assert_eq!(status.switch("main_power"), Some(SwitchState::On));
/// assert_eq!(status.number("bright").unwrap(), 80.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceStatus {
    properties: BTreeMap<String, PropertyValue>,
}

impl DeviceStatus {
    /// Creates an empty status.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a status from a `get_prop` reply.
    ///
    /// Values are matched to `keys` by position. Keys without a matching
    /// value are stored as `null` so the snapshot always holds the full key
    /// set; surplus values are ignored.
    #[must_use]
    pub fn from_reply(keys: &[String], values: Vec<PropertyValue>) -> Self {
        let mut values = values.into_iter();
        let properties = keys
            .iter()
            .map(|key| (key.clone(), values.next().unwrap_or(PropertyValue::Null)))
            .collect();
        Self { properties }
    }

    /// Returns the raw value of a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Returns `true` if the property key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Reads a property as a switch state.
    ///
    /// Returns `None` if the key is missing or not a recognised switch value.
    #[must_use]
    pub fn switch(&self, key: &str) -> Option<SwitchState> {
        self.get(key)
            .and_then(PropertyValue::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Returns `true` if the property reads as [`SwitchState::On`].
    #[must_use]
    pub fn is_on(&self, key: &str) -> bool {
        self.switch(key).is_some_and(|s| s.is_on())
    }

    /// Reads a property as a number.
    ///
    /// The device sends most numbers string-encoded; both encodings are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MissingProperty` if the key is absent and
    /// `ValueError::NotNumeric` if the value cannot be parsed.
    pub fn number(&self, key: &str) -> Result<f64, ValueError> {
        let raw = self
            .get(key)
            .ok_or_else(|| ValueError::MissingProperty(key.to_string()))?;

        let parsed = match raw {
            PropertyValue::Number(n) => n.as_f64(),
            PropertyValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        parsed.ok_or_else(|| ValueError::NotNumeric {
            key: key.to_string(),
            raw: raw.to_string(),
        })
    }

    /// Returns a copy with one property replaced.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let mut next = self.clone();
        next.properties.insert(key.into(), value.into());
        next
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the status holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for DeviceStatus {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
