// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory information service.

use super::config::{AccessoryConfig, DEFAULT_MANUFACTURER, DEFAULT_MODEL};

/// Identity shown by the host for an accessory.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AccessoryInformation {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

impl AccessoryInformation {
    /// Reads the identity from the configuration. The serial number
    /// defaults to the upper-cased token.
    #[must_use]
    pub fn from_config(config: &AccessoryConfig) -> Self {
        let pick = |value: Option<&String>, fallback: &str| {
            value
                .filter(|s| !s.is_empty())
                .map_or_else(|| fallback.to_string(), Clone::clone)
        };

        Self {
            manufacturer: pick(config.manufacturer.as_ref(), DEFAULT_MANUFACTURER),
            model: pick(config.model.as_ref(), DEFAULT_MODEL),
            serial_number: pick(config.serial.as_ref(), &config.token.to_uppercase()),
        }
    }
}
