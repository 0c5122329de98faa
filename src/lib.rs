// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `screenbar_lib` - expose a Yeelight Screen Bar Pro to a home-automation
//! host.
//!
//! The library polls the light bar's properties over a caller-supplied
//! transport, keeps the last status snapshot in memory and maps the host's
//! characteristics (On, Brightness, ColorTemperature, Hue, Saturation) onto
//! device properties and commands.
//!
//! # Layers
//!
//! - [`client::DeviceClient`]: one connection, poll loop and status cache
//!   per device, plus generic `map_get` / `map_set` handler factories
//! - [`registry::DeviceRegistry`]: one client per device token
//! - [`accessory::LightAccessory`]: the main and background light services
//!   built from a [`accessory::AccessoryConfig`]
//! - [`convert`]: range rescaling and colour packing
//!
//! The wire protocol is not implemented here; plug one in through the
//! [`protocol::Connector`] and [`protocol::Connection`] traits.
//!
//! # Quick Start
//!
//! ```no_run
//! use screenbar_lib::accessory::{AccessoryConfig, LightAccessory};
//! use screenbar_lib::registry::DeviceRegistry;
//! use screenbar_lib::types::{Characteristic, CharacteristicValue};
//! # use screenbar_lib::protocol::Connector;
//!
//! # async fn run<C: Connector>(connector: C) -> screenbar_lib::Result<()> {
//! let registry = DeviceRegistry::new(connector);
//! let config = AccessoryConfig::from_json(r#"{
//!     "accessory": "YeelightScreenBarPro",
//!     "ip": "192.168.1.20",
//!     "token": "0123456789abcdef0123456789abcdef"
//! }"#)?;
//!
//! let accessory = LightAccessory::new(&registry, config)?;
//! let main = accessory.main_light();
//!
//! main.set(Characteristic::On, CharacteristicValue::Bool(true)).await?;
//! println!("brightness: {}", main.get(Characteristic::Brightness)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Diagnostics are emitted through [`tracing`]; install a subscriber in the
//! host application to see them.

pub mod accessory;
pub mod client;
pub mod convert;
pub mod error;
pub mod event;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod subscription;
pub mod types;

pub use accessory::{AccessoryConfig, AccessoryInformation, LightAccessory, LightService};
pub use client::{
    ClientConfig, DeviceClient, Getter, PollOutcome, RetryPolicy, SetOptions, SetOutcome, Setter,
};
pub use error::{ConfigError, Error, Result, TransportError, ValueError};
pub use event::{AccessoryEvent, EventBus};
pub use protocol::{Connection, Connector};
pub use registry::DeviceRegistry;
pub use state::{DeviceStatus, StatusChange};
pub use subscription::{CallbackRegistry, SubscriptionId};
pub use types::{Characteristic, CharacteristicValue, PropertyValue, ServiceKind, SwitchState};
