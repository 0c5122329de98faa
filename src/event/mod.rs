// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host push notifications.
//!
//! Every accessory owns an [`EventBus`]. When a poll changes a property
//! that backs a characteristic, the accessory publishes an
//! [`AccessoryEvent::CharacteristicUpdated`] so the host can refresh it
//! without asking.

mod accessory_event;
mod event_bus;

pub use accessory_event::AccessoryEvent;
pub use event_bus::EventBus;
