// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Screen bar accessory.
//!
//! A [`LightAccessory`] exposes one device as two lightbulb services:
//!
//! | Service | Characteristic | Device method | Property |
//! |---|---|---|---|
//! | main light | On | `set_power` | `main_power` |
//! | main light | Brightness | `set_bright` | `bright` |
//! | main light | ColorTemperature | `set_ct_abx` | `ct` |
//! | background light | On | `bg_set_power` | `bg_power` |
//! | background light | Brightness | `bg_set_bright` | `bg_bright` |
//! | background light | Hue, Saturation | `bg_set_rgb` | `bg_rgb` |
//!
//! With `backgroundColor` disabled the background light only exposes On.
//!
//! # Examples
//!
//! ```no_run
//! use screenbar_lib::accessory::{AccessoryConfig, LightAccessory};
//! use screenbar_lib::event::AccessoryEvent;
//! use screenbar_lib::registry::DeviceRegistry;
//! use screenbar_lib::types::{Characteristic, CharacteristicValue};
//! # use screenbar_lib::protocol::Connector;
//!
//! # async fn example<C: Connector>(connector: C) -> screenbar_lib::Result<()> {
//! let registry = DeviceRegistry::new(connector);
//! let config = AccessoryConfig::new("192.168.1.20", "0123456789abcdef0123456789abcdef");
//! let accessory = LightAccessory::new(&registry, config)?;
//!
//! let mut events = accessory.subscribe();
//! accessory
//!     .main_light()
//!     .set(Characteristic::Brightness, CharacteristicValue::Int(60))
//!     .await?;
//!
//! while let Ok(AccessoryEvent::CharacteristicUpdated { service, characteristic, value }) =
//!     events.recv().await
//! {
//!     println!("{service}: {characteristic} = {value}");
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod information;
pub mod keys;
mod service;

pub use config::{
    ACCESSORY_NAME, AccessoryConfig, DEFAULT_BACKGROUND_NAME, DEFAULT_DISPLAY_NAME,
    DEFAULT_MANUFACTURER, DEFAULT_MODEL, DEFAULT_SMOOTH_INTERVAL_MS, PLUGIN_NAME,
};
pub use information::AccessoryInformation;
pub use service::{CharacteristicBinding, LightService};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::broadcast;

use crate::client::{DeviceClient, SetOptions};
use crate::convert::{
    Span, hue_saturation_to_packed, packed_from_property, packed_to_hue_saturation, rescale,
};
use crate::error::Result;
use crate::event::{AccessoryEvent, EventBus};
use crate::protocol::Connector;
use crate::registry::DeviceRegistry;
use crate::state::{DeviceStatus, StatusChange};
use crate::subscription::SubscriptionId;
use crate::types::{Characteristic, CharacteristicValue, PropertyValue, ServiceKind, SwitchState};

/// Debounce applied to power toggles.
const POWER_DEBOUNCE: Duration = Duration::from_millis(150);

/// Host colour temperature range in mireds, warm to cold.
const MIRED_RANGE: Span = (500.0, 140.0);

/// Device colour temperature range in kelvin, warm to cold.
const KELVIN_RANGE: Span = (2700.0, 6500.0);

/// Last hue and saturation seen or written for the background light.
///
/// `bg_set_rgb` takes both at once, so a write of either one is combined
/// with the remembered other.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct ColorMemory {
    hue: f64,
    saturation: f64,
}

type SharedColor = Arc<Mutex<ColorMemory>>;

/// A configured screen bar, ready to be registered with the host.
pub struct LightAccessory<C: Connector> {
    information: AccessoryInformation,
    client: DeviceClient<C>,
    main_light: LightService<C>,
    background_light: LightService<C>,
    events: EventBus,
    subscriptions: Vec<SubscriptionId>,
}

impl<C: Connector> LightAccessory<C> {
    /// Builds the accessory and starts polling its device.
    ///
    /// Accessories configured with the same token share one client; the
    /// first configuration determines its address and poll interval.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(registry: &DeviceRegistry<C>, config: AccessoryConfig) -> Result<Self> {
        config.validate()?;

        let client = registry.get_or_create(config.client_config());
        let color = SharedColor::default();
        let wiring = Wiring {
            client: &client,
            smooth_ms: config.smooth_interval_ms(),
            color: &color,
        };

        let main_light = wiring.main_light(config.display_name());
        let background_light = if config.background_color {
            wiring.color_background(config.background_display_name())
        } else {
            wiring.plain_background(config.background_display_name())
        };

        let events = EventBus::new();
        let status_subscription = {
            let events = events.clone();
            let color = Arc::clone(&color);
            let background_color = config.background_color;
            client.on_status_changed(move |change, status| {
                for event in status_events(change, status, background_color, &color) {
                    events.publish(event);
                }
            })
        };
        let connected_subscription = {
            let events = events.clone();
            client.on_connected(move || events.publish(AccessoryEvent::Connected))
        };

        client.start_polling();
        tracing::debug!(name = %config.display_name(), address = %config.ip, "Accessory ready");

        Ok(Self {
            information: AccessoryInformation::from_config(&config),
            client,
            main_light,
            background_light,
            events,
            subscriptions: vec![status_subscription, connected_subscription],
        })
    }

    #[must_use]
    pub fn information(&self) -> &AccessoryInformation {
        &self.information
    }

    /// The shared device client.
    #[must_use]
    pub fn client(&self) -> &DeviceClient<C> {
        &self.client
    }

    #[must_use]
    pub fn main_light(&self) -> &LightService<C> {
        &self.main_light
    }

    #[must_use]
    pub fn background_light(&self) -> &LightService<C> {
        &self.background_light
    }

    #[must_use]
    pub fn service(&self, kind: ServiceKind) -> &LightService<C> {
        match kind {
            ServiceKind::MainLight => &self.main_light,
            ServiceKind::BackgroundLight => &self.background_light,
        }
    }

    /// Both lightbulb services, main light first.
    #[must_use]
    pub fn services(&self) -> [&LightService<C>; 2] {
        [&self.main_light, &self.background_light]
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Receives characteristic updates detected by polling.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccessoryEvent> {
        self.events.subscribe()
    }
}

impl<C: Connector> Drop for LightAccessory<C> {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.client.unsubscribe(id);
        }
    }
}

impl<C: Connector> std::fmt::Debug for LightAccessory<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightAccessory")
            .field("information", &self.information)
            .field("main_light", &self.main_light)
            .field("background_light", &self.background_light)
            .finish_non_exhaustive()
    }
}

/// Builds characteristic bindings against one client.
struct Wiring<'a, C: Connector> {
    client: &'a DeviceClient<C>,
    smooth_ms: u64,
    color: &'a SharedColor,
}

impl<C: Connector> Wiring<'_, C> {
    fn main_light(&self, name: &str) -> LightService<C> {
        let smooth_ms = self.smooth_ms;
        let color_temperature = CharacteristicBinding::new(
            Characteristic::ColorTemperature,
            self.client.map_get("getColorTemperature", |status| {
                let kelvin = status.number(keys::CT)?;
                Ok(CharacteristicValue::number(rescale(kelvin, KELVIN_RANGE, MIRED_RANGE)))
            }),
            self.client.map_set(
                "setColorTemperature",
                "set_ct_abx",
                move |value, _| {
                    let kelvin = rescale(value.as_f64()?, MIRED_RANGE, KELVIN_RANGE);
                    Ok(smoothed(CharacteristicValue::number(kelvin).into(), smooth_ms))
                },
                SetOptions::new().check(power_is_on(keys::MAIN_POWER)),
            ),
        );

        LightService::new(ServiceKind::MainLight, name)
            .with_binding(self.power("OnOff", keys::MAIN_POWER, "set_power"))
            .with_binding(self.brightness(
                "Brightness",
                keys::MAIN_POWER,
                keys::BRIGHT,
                "set_bright",
            ))
            .with_binding(color_temperature)
    }

    fn color_background(&self, name: &str) -> LightService<C> {
        LightService::new(ServiceKind::BackgroundLight, name)
            .with_binding(self.power("BgOnOff", keys::BG_POWER, "bg_set_power"))
            .with_binding(self.brightness(
                "BgBrightness",
                keys::BG_POWER,
                keys::BG_BRIGHT,
                "bg_set_bright",
            ))
            .with_binding(self.hue())
            .with_binding(self.saturation())
    }

    fn plain_background(&self, name: &str) -> LightService<C> {
        let smooth_ms = self.smooth_ms;
        let on = CharacteristicBinding::new(
            Characteristic::On,
            self.client
                .map_get("getBgOnOff", |status| Ok(status.is_on(keys::BG_POWER).into())),
            self.client.map_set(
                "setBgOnOff",
                "bg_set_power",
                move |value, _| Ok(smoothed(switch_arg(value), smooth_ms)),
                SetOptions::new().update(store_first_arg(keys::BG_POWER)),
            ),
        );

        LightService::new(ServiceKind::BackgroundLight, name).with_binding(on)
    }

    fn power(&self, label: &str, power_key: &'static str, api: &str) -> CharacteristicBinding<C> {
        CharacteristicBinding::new(
            Characteristic::On,
            self.client
                .map_get(&format!("get{label}"), move |status| Ok(status.is_on(power_key).into())),
            self.client.map_set(
                &format!("set{label}"),
                api,
                |value, _| Ok(PropertyValue::Array(vec![switch_arg(value)])),
                SetOptions::new()
                    .debounce(POWER_DEBOUNCE)
                    .update(store_first_arg(power_key)),
            ),
        )
    }

    fn brightness(
        &self,
        label: &str,
        power_key: &'static str,
        bright_key: &'static str,
        api: &str,
    ) -> CharacteristicBinding<C> {
        let smooth_ms = self.smooth_ms;
        CharacteristicBinding::new(
            Characteristic::Brightness,
            self.client.map_get(&format!("get{label}"), move |status| {
                if !status.is_on(power_key) {
                    return Ok(CharacteristicValue::Int(0));
                }
                Ok(CharacteristicValue::number(status.number(bright_key)?))
            }),
            self.client.map_set(
                &format!("set{label}"),
                api,
                move |value, _| {
                    let brightness = CharacteristicValue::number(value.as_f64()?);
                    Ok(smoothed(brightness.into(), smooth_ms))
                },
                SetOptions::new().check(power_is_on(power_key)),
            ),
        )
        .ignoring_zero()
    }

    fn hue(&self) -> CharacteristicBinding<C> {
        let read = Arc::clone(self.color);
        let write = Arc::clone(self.color);
        CharacteristicBinding::new(
            Characteristic::Hue,
            self.client.map_get("getHue", move |status| {
                let (hue, _) = packed_to_hue_saturation(packed_from_property(status.get(keys::BG_RGB)));
                read.lock().hue = hue;
                Ok(CharacteristicValue::number(hue))
            }),
            self.client.map_set(
                "setHue",
                "bg_set_rgb",
                move |value, _| {
                    let hue = value.as_f64()?;
                    let mut memory = write.lock();
                    memory.hue = hue;
                    Ok(json!(hue_saturation_to_packed(hue, memory.saturation)))
                },
                SetOptions::new().check(power_is_on(keys::BG_POWER)),
            ),
        )
    }

    fn saturation(&self) -> CharacteristicBinding<C> {
        let read = Arc::clone(self.color);
        let write = Arc::clone(self.color);
        CharacteristicBinding::new(
            Characteristic::Saturation,
            self.client.map_get("getSaturation", move |status| {
                let (_, saturation) =
                    packed_to_hue_saturation(packed_from_property(status.get(keys::BG_RGB)));
                read.lock().saturation = saturation;
                Ok(CharacteristicValue::number(saturation))
            }),
            self.client.map_set(
                "setSaturation",
                "bg_set_rgb",
                move |value, _| {
                    let saturation = value.as_f64()?;
                    let mut memory = write.lock();
                    memory.saturation = saturation;
                    Ok(json!(hue_saturation_to_packed(memory.hue, saturation)))
                },
                SetOptions::new().check(power_is_on(keys::BG_POWER)),
            ),
        )
    }
}

/// `[value, "smooth", ms]`
fn smoothed(value: PropertyValue, smooth_ms: u64) -> PropertyValue {
    json!([value, "smooth", smooth_ms])
}

fn switch_arg(value: &CharacteristicValue) -> PropertyValue {
    SwitchState::from(value.as_bool()).into()
}

fn power_is_on(
    power_key: &'static str,
) -> impl Fn(&CharacteristicValue, Option<&DeviceStatus>) -> bool + Send + Sync + 'static {
    move |_, status| status.is_some_and(|s| s.is_on(power_key))
}

/// Stores the switch argument that was sent under `key`.
fn store_first_arg(
    key: &'static str,
) -> impl Fn(&CharacteristicValue, &[PropertyValue], &DeviceStatus) -> DeviceStatus + Send + Sync + 'static
{
    move |_, args, status| status.with(key, args.first().cloned().unwrap_or_default())
}

/// Maps the changed properties of a poll to host updates.
fn status_events(
    change: &StatusChange,
    status: &DeviceStatus,
    background_color: bool,
    color: &Mutex<ColorMemory>,
) -> Vec<AccessoryEvent> {
    let mut events = Vec::new();

    let mut push_number = |service: ServiceKind, characteristic: Characteristic, key: &str| {
        match status.number(key) {
            Ok(n) => events.push(AccessoryEvent::updated(
                service,
                characteristic,
                CharacteristicValue::number(n),
            )),
            Err(err) => tracing::debug!(%key, error = %err, "Skipping update"),
        }
    };

    if change.contains(keys::BRIGHT) {
        push_number(ServiceKind::MainLight, Characteristic::Brightness, keys::BRIGHT);
    }
    if background_color && change.contains(keys::BG_BRIGHT) {
        push_number(ServiceKind::BackgroundLight, Characteristic::Brightness, keys::BG_BRIGHT);
    }

    if change.contains(keys::MAIN_POWER) {
        events.push(AccessoryEvent::updated(
            ServiceKind::MainLight,
            Characteristic::On,
            status.is_on(keys::MAIN_POWER),
        ));
    }
    if change.contains(keys::BG_POWER) {
        events.push(AccessoryEvent::updated(
            ServiceKind::BackgroundLight,
            Characteristic::On,
            status.is_on(keys::BG_POWER),
        ));
    }

    if background_color && let Some(rgb) = change.get(keys::BG_RGB) {
        let (hue, saturation) = packed_to_hue_saturation(packed_from_property(Some(rgb)));
        *color.lock() = ColorMemory { hue, saturation };
        events.push(AccessoryEvent::updated(
            ServiceKind::BackgroundLight,
            Characteristic::Hue,
            CharacteristicValue::number(hue),
        ));
        events.push(AccessoryEvent::updated(
            ServiceKind::BackgroundLight,
            Characteristic::Saturation,
            CharacteristicValue::number(saturation),
        ));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(previous: Option<&DeviceStatus>, next: &DeviceStatus) -> StatusChange {
        StatusChange::between(previous, next)
    }

    fn status(pairs: &[(&str, &str)]) -> DeviceStatus {
        pairs.iter().map(|(k, v)| (*k, json!(v))).collect()
    }

    fn find(events: &[AccessoryEvent], service: ServiceKind, characteristic: Characteristic) -> Option<CharacteristicValue> {
        events.iter().find_map(|event| match event {
            AccessoryEvent::CharacteristicUpdated {
                service: s,
                characteristic: c,
                value,
            } if *s == service && *c == characteristic => Some(*value),
            _ => None,
        })
    }

    #[test]
    fn first_poll_updates_everything() {
        let next = status(&[
            ("main_power", "on"),
            ("bright", "80"),
            ("bg_power", "off"),
            ("bg_bright", "30"),
            ("bg_rgb", "16711680"),
        ]);
        let color = Mutex::new(ColorMemory::default());

        let events = status_events(&poll(None, &next), &next, true, &color);

        assert_eq!(events.len(), 6);
        assert_eq!(find(&events, ServiceKind::MainLight, Characteristic::On), Some(CharacteristicValue::Bool(true)));
        assert_eq!(
            find(&events, ServiceKind::MainLight, Characteristic::Brightness),
            Some(CharacteristicValue::Int(80))
        );
        assert_eq!(
            find(&events, ServiceKind::BackgroundLight, Characteristic::On),
            Some(CharacteristicValue::Bool(false))
        );
        assert_eq!(
            find(&events, ServiceKind::BackgroundLight, Characteristic::Saturation),
            Some(CharacteristicValue::Int(100))
        );
        assert_eq!(*color.lock(), ColorMemory { hue: 0.0, saturation: 100.0 });
    }

    #[test]
    fn only_changed_keys_produce_events() {
        let previous = status(&[("main_power", "on"), ("bright", "80")]);
        let next = status(&[("main_power", "on"), ("bright", "40")]);
        let color = Mutex::new(ColorMemory::default());

        let events = status_events(&poll(Some(&previous), &next), &next, true, &color);

        assert_eq!(
            events,
            vec![AccessoryEvent::updated(
                ServiceKind::MainLight,
                Characteristic::Brightness,
                CharacteristicValue::Int(40),
            )]
        );
    }

    #[test]
    fn colour_keys_ignored_without_background_color() {
        let next = status(&[("bg_power", "on"), ("bg_bright", "30"), ("bg_rgb", "255")]);
        let color = Mutex::new(ColorMemory::default());

        let events = status_events(&poll(None, &next), &next, false, &color);

        assert_eq!(
            events,
            vec![AccessoryEvent::updated(
                ServiceKind::BackgroundLight,
                Characteristic::On,
                true,
            )]
        );
        assert_eq!(*color.lock(), ColorMemory::default());
    }

    #[test]
    fn unparseable_brightness_is_skipped() {
        let next: DeviceStatus = [("bright", PropertyValue::Null)].into_iter().collect();
        let color = Mutex::new(ColorMemory::default());

        assert!(status_events(&poll(None, &next), &next, true, &color).is_empty());
    }

    #[test]
    fn smoothed_args() {
        assert_eq!(smoothed(json!(50), 500), json!([50, "smooth", 500]));
    }
}
