// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing characteristic identifiers and values.

use std::fmt;

use crate::error::ValueError;

/// A controllable attribute exposed to the home-automation host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Characteristic {
    /// Power on/off (`bool`).
    On,
    /// Brightness percentage, 0-100.
    Brightness,
    /// Color temperature in mireds, 140-500.
    ColorTemperature,
    /// Hue in degrees, 0-360.
    Hue,
    /// Saturation percentage, 0-100.
    Saturation,
}

impl Characteristic {
    /// Returns the characteristic name used in log messages and action names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Brightness => "Brightness",
            Self::ColorTemperature => "ColorTemperature",
            Self::Hue => "Hue",
            Self::Saturation => "Saturation",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value in the host's characteristic value space.
///
/// # Examples
///
/// ```
/// use screenbar_lib::types::CharacteristicValue;
///
/// let on = CharacteristicValue::from(true);
/// assert!(on.as_bool());
///
/// let brightness = CharacteristicValue::from(75);
/// assert!((brightness.as_f64().unwrap() - 75.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    /// Boolean characteristic.
    Bool(bool),
    /// Integer characteristic.
    Int(i64),
    /// Floating point characteristic.
    Float(f64),
}

impl CharacteristicValue {
    /// Wraps a number, using [`CharacteristicValue::Int`] when it has no
    /// fractional part.
    ///
    /// ```
    /// use screenbar_lib::types::CharacteristicValue;
    ///
    /// assert_eq!(CharacteristicValue::number(80.0), CharacteristicValue::Int(80));
    /// assert_eq!(CharacteristicValue::number(0.5), CharacteristicValue::Float(0.5));
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn number(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
            Self::Int(value as i64)
        } else {
            Self::Float(value)
        }
    }

    /// Interprets the value as a boolean.
    ///
    /// Numbers are truthy when non-zero, matching how hosts send `1`/`0` for
    /// `On`.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match *self {
            Self::Bool(b) => b,
            Self::Int(i) => i != 0,
            Self::Float(f) => f != 0.0,
        }
    }

    /// Interprets the value as a number.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::WrongKind` for boolean values.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Result<f64, ValueError> {
        match *self {
            Self::Int(i) => Ok(i as f64),
            Self::Float(f) => Ok(f),
            Self::Bool(_) => Err(ValueError::WrongKind {
                expected: "numeric",
                actual: format!("{self:?}"),
            }),
        }
    }

    /// Returns `true` if the value is numerically zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Int(i) => i == 0,
            Self::Float(f) => f == 0.0,
            Self::Bool(_) => false,
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for CharacteristicValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<CharacteristicValue> for serde_json::Value {
    fn from(value: CharacteristicValue) -> Self {
        match value {
            CharacteristicValue::Bool(b) => Self::Bool(b),
            CharacteristicValue::Int(i) => Self::from(i),
            CharacteristicValue::Float(f) => Self::from(f),
        }
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}
