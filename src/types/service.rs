// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light service identifiers.

use std::fmt;

/// One of the two lightbulb services an accessory exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// The front-facing screen light.
    MainLight,
    /// The rear ambient light.
    BackgroundLight,
}

impl ServiceKind {
    /// Service subtype, unique within an accessory.
    #[must_use]
    pub const fn subtype(&self) -> &'static str {
        match self {
            Self::MainLight => "main-light",
            Self::BackgroundLight => "background-light",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subtype())
    }
}
