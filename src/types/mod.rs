// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the device client and the accessory adapter.
//!
//! # Types
//!
//! - [`SwitchState`] - `"on"`/`"off"` power properties
//! - [`Characteristic`] - Host characteristic identifiers
//! - [`CharacteristicValue`] - Host characteristic values
//! - [`ServiceKind`] - Main and background light services
//! - [`PropertyValue`] - Raw device property values (JSON scalars)

mod characteristic;
mod service;
mod switch;

pub use characteristic::{Characteristic, CharacteristicValue};
pub use service::ServiceKind;
pub use switch::SwitchState;

/// A device property value as returned by `get_prop` or sent as a command
/// argument.
///
/// Numeric properties usually arrive string-encoded (`"75"`), switches as
/// `"on"`/`"off"`.
pub type PropertyValue = serde_json::Value;
