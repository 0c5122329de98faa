// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversions between the host's characteristic value space and the
//! device's property value space.
//!
//! The device packs background colors into a single 24-bit integer
//! (`r * 65536 + g * 256 + b`) and uses its own ranges for color
//! temperature, while the host speaks hue/saturation and mireds. All
//! functions here are pure.
//!
//! # Examples
//!
//! ```
//! use screenbar_lib::convert::{pack_rgb, rescale, unpack_rgb};
//!
//! // Inverted mapping: 500 mireds is the warm end (2700K on the device).
//! assert_eq!(rescale(500.0, (500.0, 140.0), (2700.0, 6500.0)), 2700.0);
//!
//! assert_eq!(pack_rgb(255, 128, 0), 16_744_448);
//! assert_eq!(unpack_rgb(16_744_448), (255, 128, 0));
//! ```

use crate::types::PropertyValue;

/// A `(from, to)` pair describing a linear range. `from` may be larger than
/// `to` for inverted mappings.
pub type Span = (f64, f64);

/// Clamps `value` into `[min, max]`.
///
/// Returns `max` if `value >= max`, `min` if `value <= min`, and `value`
/// otherwise.
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value >= max {
        return max;
    }
    if value <= min {
        return min;
    }
    value
}

/// Linearly maps `value` from `old` into `new`, rounding to the nearest
/// integer, then clamps into `new`.
#[must_use]
pub fn rescale(value: f64, old: Span, new: Span) -> f64 {
    rescale_with(value, old, new, true)
}

/// Linearly maps `value` from `old` into `new`, optionally rounding, then
/// clamps into `new`.
///
/// The clamp bounds are `min(new.0, new.1)..=max(new.0, new.1)`, so inverted
/// target ranges work as expected.
#[must_use]
pub fn rescale_with(value: f64, (old_from, old_to): Span, (new_from, new_to): Span, round: bool) -> f64 {
    let fraction = (value - old_from) / (old_to - old_from);
    let mut result = fraction * (new_to - new_from) + new_from;

    if round {
        result = result.round();
    }

    if new_from < new_to {
        clamp(result, new_from, new_to)
    } else {
        clamp(result, new_to, new_from)
    }
}

/// Packs three channels into the device's color integer.
///
/// Each channel is clamped to `[0, 255]` first.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pack_rgb(red: i64, green: i64, blue: i64) -> u32 {
    let channel = |c: i64| c.clamp(0, 255) as u32;
    channel(red) * 65_536 + channel(green) * 256 + channel(blue)
}

/// Unpacks the device's color integer into `(red, green, blue)`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn unpack_rgb(packed: u32) -> (u8, u8, u8) {
    let mut x = packed;
    let blue = (x % 256) as u8;
    x /= 256;
    let green = (x % 256) as u8;
    x /= 256;
    let red = (x % 256) as u8;
    (red, green, blue)
}

/// Reads a packed color from a raw property value.
///
/// The device reports colors either as a number or a decimal string. Absent
/// or unparseable values read as `0` (black).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn packed_from_property(raw: Option<&PropertyValue>) -> u32 {
    match raw {
        Some(PropertyValue::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
        Some(PropertyValue::String(s)) => s.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    }
}

/// Converts a host hue (degrees) and saturation (percent) into the device's
/// packed color at full value.
///
/// Each channel is scaled by 256, rounded and clamped to 255 before packing.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn hue_saturation_to_packed(hue: f64, saturation: f64) -> u32 {
    let (r, g, b) = hsv_to_rgb(hue, saturation / 100.0, 1.0);
    let channel = |c: f64| clamp((c * 256.0).round(), 0.0, 255.0) as i64;
    pack_rgb(channel(r), channel(g), channel(b))
}

/// Converts the device's packed color into `(hue, saturation)` where hue is
/// in degrees `[0, 360)` and saturation is a percentage.
#[must_use]
pub fn packed_to_hue_saturation(packed: u32) -> (f64, f64) {
    let (r, g, b) = unpack_rgb(packed);
    let (hue, saturation, _) = rgb_to_hsv(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    );
    (hue, saturation * 100.0)
}

/// HSV to RGB with every component in `[0, 1]` except hue (degrees).
#[allow(clippy::many_single_char_names)]
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let h = h.rem_euclid(360.0);
    let s = clamp(s, 0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// RGB (components in `[0, 1]`) to HSV with hue in degrees.
#[allow(clippy::many_single_char_names)]
fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    let hue = if delta < f64::EPSILON {
        0.0
    } else if (max - r).abs() < f64::EPSILON {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if (max - g).abs() < f64::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (hue, saturation, max)
}
