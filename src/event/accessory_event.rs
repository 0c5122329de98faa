// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events pushed from an accessory to the host.

use crate::types::{Characteristic, CharacteristicValue, ServiceKind};

/// An event published on an accessory's [`EventBus`](super::EventBus).
#[derive(Debug, Clone, PartialEq)]
pub enum AccessoryEvent {
    /// A polled property changed and the host should refresh a
    /// characteristic.
    CharacteristicUpdated {
        /// The service owning the characteristic.
        service: ServiceKind,
        /// The characteristic to refresh.
        characteristic: Characteristic,
        /// The new value.
        value: CharacteristicValue,
    },

    /// The device connection was established.
    Connected,
}

impl AccessoryEvent {
    /// Creates a characteristic update event.
    #[must_use]
    pub fn updated(
        service: ServiceKind,
        characteristic: Characteristic,
        value: impl Into<CharacteristicValue>,
    ) -> Self {
        Self::CharacteristicUpdated {
            service,
            characteristic,
            value: value.into(),
        }
    }

    /// Returns the service this event concerns, if any.
    #[must_use]
    pub fn service(&self) -> Option<ServiceKind> {
        match self {
            Self::CharacteristicUpdated { service, .. } => Some(*service),
            Self::Connected => None,
        }
    }
}
