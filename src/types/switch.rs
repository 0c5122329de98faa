// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Two-valued switch state used by the device's power properties.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Power state of a light channel as reported by the device.
///
/// The device encodes switches as the lowercase strings `"on"` and `"off"`,
/// both in `get_prop` replies and in `set_power` arguments.
///
/// # Examples
///
/// ```
/// use screenbar_lib::types::SwitchState;
///
/// assert_eq!(SwitchState::On.as_str(), "on");
/// assert_eq!("off".parse::<SwitchState>().unwrap(), SwitchState::Off);
/// assert!(SwitchState::from(true).is_on());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    /// Light is off.
    Off,
    /// Light is on.
    On,
}

impl SwitchState {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns `true` for [`SwitchState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "0" | "false" => Ok(Self::Off),
            "on" | "1" | "true" => Ok(Self::On),
            _ => Err(ValueError::InvalidSwitchState(s.to_string())),
        }
    }
}

impl From<bool> for SwitchState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<SwitchState> for serde_json::Value {
    fn from(state: SwitchState) -> Self {
        Self::String(state.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_state_from_str() {
        assert_eq!("on".parse::<SwitchState>().unwrap(), SwitchState::On);
        assert_eq!("OFF".parse::<SwitchState>().unwrap(), SwitchState::Off);
        assert_eq!("1".parse::<SwitchState>().unwrap(), SwitchState::On);
        assert_eq!("false".parse::<SwitchState>().unwrap(), SwitchState::Off);
    }

    #[test]
    fn switch_state_from_str_invalid() {
        let result = "dim".parse::<SwitchState>();
        assert!(matches!(
            result.unwrap_err(),
            ValueError::InvalidSwitchState(_)
        ));
    }

    #[test]
    fn switch_state_into_json() {
        let value: serde_json::Value = SwitchState::On.into();
        assert_eq!(value, serde_json::json!("on"));
    }

    #[test]
    fn switch_state_serde() {
        let state: SwitchState = serde_json::from_str("\"off\"").unwrap();
        assert_eq!(state, SwitchState::Off);
        assert_eq!(serde_json::to_string(&SwitchState::On).unwrap(), "\"on\"");
    }
}
