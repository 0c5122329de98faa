// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lightbulb services and their characteristic bindings.

use std::fmt;

use crate::client::{Getter, SetOutcome, Setter};
use crate::error::{Error, Result};
use crate::protocol::Connector;
use crate::types::{Characteristic, CharacteristicValue, ServiceKind};

/// Get and set handlers for one characteristic.
pub struct CharacteristicBinding<C: Connector> {
    characteristic: Characteristic,
    getter: Getter,
    setter: Setter<C>,
    ignore_zero: bool,
}

impl<C: Connector> CharacteristicBinding<C> {
    #[must_use]
    pub fn new(characteristic: Characteristic, getter: Getter, setter: Setter<C>) -> Self {
        Self {
            characteristic,
            getter,
            setter,
            ignore_zero: false,
        }
    }

    /// Answers writes of zero with [`SetOutcome::Skipped`] without touching
    /// the device.
    #[must_use]
    pub fn ignoring_zero(mut self) -> Self {
        self.ignore_zero = true;
        self
    }

    #[must_use]
    pub fn characteristic(&self) -> Characteristic {
        self.characteristic
    }

    #[must_use]
    pub fn getter(&self) -> &Getter {
        &self.getter
    }

    #[must_use]
    pub fn setter(&self) -> &Setter<C> {
        &self.setter
    }
}

impl<C: Connector> fmt::Debug for CharacteristicBinding<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacteristicBinding")
            .field("characteristic", &self.characteristic)
            .field("getter", &self.getter)
            .field("setter", &self.setter)
            .field("ignore_zero", &self.ignore_zero)
            .finish()
    }
}

/// A lightbulb service exposed to the host.
pub struct LightService<C: Connector> {
    kind: ServiceKind,
    name: String,
    bindings: Vec<CharacteristicBinding<C>>,
}

impl<C: Connector> LightService<C> {
    #[must_use]
    pub fn new(kind: ServiceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    /// Adds a binding, replacing any earlier one for the same
    /// characteristic.
    #[must_use]
    pub fn with_binding(mut self, binding: CharacteristicBinding<C>) -> Self {
        self.bindings
            .retain(|b| b.characteristic != binding.characteristic);
        self.bindings.push(binding);
        self
    }

    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    #[must_use]
    pub fn subtype(&self) -> &'static str {
        self.kind.subtype()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exposed characteristics, in binding order.
    #[must_use]
    pub fn characteristics(&self) -> Vec<Characteristic> {
        self.bindings.iter().map(|b| b.characteristic).collect()
    }

    #[must_use]
    pub fn has(&self, characteristic: Characteristic) -> bool {
        self.bindings
            .iter()
            .any(|b| b.characteristic == characteristic)
    }

    /// Returns the binding for `characteristic`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedCharacteristic` if the service does not
    /// expose it.
    pub fn binding(&self, characteristic: Characteristic) -> Result<&CharacteristicBinding<C>> {
        self.bindings
            .iter()
            .find(|b| b.characteristic == characteristic)
            .ok_or_else(|| Error::UnsupportedCharacteristic(characteristic.to_string()))
    }

    /// Host get handler. Reads the cached status only.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedCharacteristic`, `Error::StaleData` before
    /// the first poll, or a transformer error.
    pub fn get(&self, characteristic: Characteristic) -> Result<CharacteristicValue> {
        self.binding(characteristic)?.getter.get()
    }

    /// Host set handler.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedCharacteristic` or any error from
    /// [`Setter::set`].
    pub async fn set(&self, characteristic: Characteristic, value: CharacteristicValue) -> Result<SetOutcome> {
        let binding = self.binding(characteristic)?;
        if binding.ignore_zero && value.is_zero() {
            tracing::debug!(service = %self.kind, %characteristic, "Ignoring zero write");
            return Ok(SetOutcome::Skipped);
        }
        binding.setter.set(value).await
    }
}

impl<C: Connector> fmt::Debug for LightService<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightService")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("characteristics", &self.characteristics())
            .finish()
    }
}
