// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport abstraction for talking to the device.
//!
//! The library does not implement the device's wire protocol. Instead it
//! drives any transport that can open a connection from an address and a
//! token, and perform request/reply calls of the form
//! `method(params...) -> [results...]`.
//!
//! # Implementing a transport
//!
//! ```
//! use screenbar_lib::error::TransportError;
//! use screenbar_lib::protocol::{Connection, Connector};
//! use screenbar_lib::types::PropertyValue;
//!
//! struct Loopback;
//!
//! impl Connection for Loopback {
//!     async fn call(
//!         &self,
//!         _method: &str,
//!         _params: Vec<PropertyValue>,
//!     ) -> Result<Vec<PropertyValue>, TransportError> {
//!         Ok(vec![PropertyValue::from("ok")])
//!     }
//! }
//!
//! struct LoopbackConnector;
//!
//! impl Connector for LoopbackConnector {
//!     type Connection = Loopback;
//!
//!     async fn connect(&self, _address: &str, _token: &str) -> Result<Loopback, TransportError> {
//!         Ok(Loopback)
//!     }
//! }
//! ```

mod reply;

pub use reply::{GET_PROP, SUCCESS_TOKEN, check_reply};

use std::future::Future;

use crate::error::TransportError;
use crate::types::PropertyValue;

/// An established connection to one device.
pub trait Connection: Send + Sync + 'static {
    /// Calls a device method and returns its result list.
    ///
    /// Application-level failures are signalled by the first result element,
    /// see [`check_reply`].
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the call cannot be delivered or answered.
    fn call(
        &self,
        method: &str,
        params: Vec<PropertyValue>,
    ) -> impl Future<Output = Result<Vec<PropertyValue>, TransportError>> + Send;
}

/// Opens connections to devices.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Connects to the device at `address`, authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the device cannot be reached. The device
    /// client retries according to its [`RetryPolicy`](crate::client::RetryPolicy).
    fn connect(
        &self,
        address: &str,
        token: &str,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}
