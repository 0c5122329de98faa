// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device status types.
//!
//! [`DeviceStatus`] is the cached snapshot of the polled property keys;
//! [`StatusChange`] is the subset of properties that changed between two
//! snapshots and is what status-change callbacks receive. [`StatusCache`]
//! is the slot the device client swaps snapshots into.

mod cache;
mod device_status;
mod status_change;

pub use cache::StatusCache;
pub use device_status::DeviceStatus;
pub use status_change::StatusChange;
