// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device property keys.

pub const BRIGHT: &str = "bright";
pub const CT: &str = "ct";
pub const COLOR_MODE: &str = "color_mode";
pub const BG_BRIGHT: &str = "bg_bright";
pub const BG_RGB: &str = "bg_rgb";
pub const BG_HUE: &str = "bg_hue";
pub const BG_SAT: &str = "bg_sat";
pub const BG_PROACT: &str = "bg_proact";
pub const MAIN_POWER: &str = "main_power";
pub const BG_POWER: &str = "bg_power";
pub const BG_LMODE: &str = "bg_lmode";
pub const BG_CT: &str = "bg_ct";
pub const POWER: &str = "power";

/// Every key fetched by a poll, in request order.
pub const ALL: [&str; 13] = [
    BRIGHT, CT, COLOR_MODE, BG_BRIGHT, BG_RGB, BG_HUE, BG_SAT, BG_PROACT, MAIN_POWER, BG_POWER,
    BG_LMODE, BG_CT, POWER,
];
