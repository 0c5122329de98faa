// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for device status changes.
//!
//! Every [`DeviceClient`](crate::client::DeviceClient) owns a
//! [`CallbackRegistry`]. Each successful poll dispatches the changed subset
//! of properties together with the new snapshot to every registered
//! callback.
//!
//! # Usage
//!
//! ```no_run
//! use screenbar_lib::client::DeviceClient;
//! # use screenbar_lib::protocol::Connector;
//!
//! # fn example<C: Connector>(client: DeviceClient<C>) {
//! let sub_id = client.on_status_changed(|change, _status| {
//!     for (key, value) in change.iter() {
//!         println!("{key} is now {value}");
//!     }
//! });
//!
//! // Later, unsubscribe
//! client.unsubscribe(sub_id);
//! # }
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};
