// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory configuration as found in the host's JSON config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::keys;
use crate::client::{ClientConfig, DEFAULT_POLL_INTERVAL};
use crate::error::ConfigError;

/// Accessory identifier users put in the host configuration.
pub const ACCESSORY_NAME: &str = "YeelightScreenBarPro";

/// Package name the host registers the accessory under.
pub const PLUGIN_NAME: &str = "homebridge-yeelight-screen-bar-pro";

/// Default transition duration for smoothed commands, in milliseconds.
pub const DEFAULT_SMOOTH_INTERVAL_MS: u64 = 500;

pub const DEFAULT_DISPLAY_NAME: &str = "Yeelight Screen Bar Pro";
pub const DEFAULT_BACKGROUND_NAME: &str = "Yeelight Screen Bar Pro - Background Light";
pub const DEFAULT_MODEL: &str = "Default Model";
pub const DEFAULT_MANUFACTURER: &str = "Yeelight";

/// One accessory entry.
///
/// Keys are camelCase, as the host writes them. Only `ip` and `token` are
/// required.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use screenbar_lib::accessory::AccessoryConfig;
///
/// let config = AccessoryConfig::from_json(r#"{
///     "accessory": "YeelightScreenBarPro",
///     "name": "Desk",
///     "ip": "192.168.1.20",
///     "token": "0123456789abcdef0123456789abcdef",
///     "pollingInterval": 10000
/// }"#).unwrap();
///
/// assert_eq!(config.display_name(), "Desk");
/// assert_eq!(config.poll_interval(), Duration::from_secs(10));
/// assert_eq!(config.smooth_interval_ms(), 500);
/// assert!(config.background_color);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryConfig {
    /// Accessory identifier; must be [`ACCESSORY_NAME`] when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory: Option<String>,
    /// Main light display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Device network address.
    pub ip: String,
    /// Device token.
    pub token: String,
    /// Poll interval in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<u64>,
    /// Transition duration for smoothed commands in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smooth_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Background light display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_name: Option<String>,
    /// Expose brightness, hue and saturation on the background light.
    #[serde(default = "default_background_color")]
    pub background_color: bool,
}

fn default_background_color() -> bool {
    true
}

impl AccessoryConfig {
    /// Creates a configuration with defaults for everything but the
    /// address and token.
    #[must_use]
    pub fn new(ip: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            accessory: None,
            name: None,
            ip: ip.into(),
            token: token.into(),
            polling_interval: None,
            smooth_interval: None,
            serial: None,
            model: None,
            manufacturer: None,
            background_name: None,
            background_color: true,
        }
    }

    /// Parses and validates a JSON accessory entry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the JSON is malformed or lacks `ip` or
    /// `token`, or any error from [`AccessoryConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`AccessoryConfig::from_json`] for an already parsed value.
    ///
    /// # Errors
    ///
    /// See [`AccessoryConfig::from_json`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` for a blank `ip` or `token` and
    /// `ConfigError::InvalidValue` for a zero polling interval or a foreign
    /// `accessory` identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ip.trim().is_empty() {
            return Err(ConfigError::MissingField("ip"));
        }
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingField("token"));
        }
        if self.polling_interval == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "pollingInterval",
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(accessory) = &self.accessory
            && accessory != ACCESSORY_NAME
        {
            return Err(ConfigError::InvalidValue {
                field: "accessory",
                message: format!("expected {ACCESSORY_NAME}, got {accessory}"),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_background_name(mut self, name: impl Into<String>) -> Self {
        self.background_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_polling_interval(mut self, interval_ms: u64) -> Self {
        self.polling_interval = Some(interval_ms);
        self
    }

    #[must_use]
    pub fn with_smooth_interval(mut self, interval_ms: u64) -> Self {
        self.smooth_interval = Some(interval_ms);
        self
    }

    #[must_use]
    pub fn with_background_color(mut self, enabled: bool) -> Self {
        self.background_color = enabled;
        self
    }

    /// Main light name, falling back to [`DEFAULT_DISPLAY_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    /// Background light name, falling back to [`DEFAULT_BACKGROUND_NAME`].
    #[must_use]
    pub fn background_display_name(&self) -> &str {
        non_blank(self.background_name.as_deref()).unwrap_or(DEFAULT_BACKGROUND_NAME)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.polling_interval
            .filter(|ms| *ms > 0)
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis)
    }

    #[must_use]
    pub fn smooth_interval_ms(&self) -> u64 {
        self.smooth_interval.unwrap_or(DEFAULT_SMOOTH_INTERVAL_MS)
    }

    /// Device client configuration polling every property the accessory
    /// uses.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.ip.clone(), self.token.clone(), keys::ALL)
            .with_poll_interval(self.poll_interval())
    }
}

/// Treats empty strings like missing values.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
