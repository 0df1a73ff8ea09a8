// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary actuator state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// The state of a binary actuator (relay).
///
/// The wire format is the case-sensitive ASCII literal `ON` or `OFF`;
/// no other spelling is accepted, in either direction.
///
/// # Examples
///
/// ```
/// use homesync::SwitchState;
///
/// assert_eq!("ON".parse::<SwitchState>().unwrap(), SwitchState::On);
/// assert_eq!(SwitchState::Off.as_str(), "OFF");
///
/// // Lowercase and numeric spellings are rejected.
/// assert!("on".parse::<SwitchState>().is_err());
/// assert!("1".parse::<SwitchState>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchState {
    /// The actuator is off.
    Off,
    /// The actuator is on.
    On,
}

impl SwitchState {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns `true` if the actuator is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchState {
    type Err = PayloadError;

    /// Parses the exact wire literals `ON` and `OFF`.
    ///
    /// Case-sensitive: anything else is an unrecognized payload.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            _ => Err(PayloadError::UnrecognizedSwitch(s.to_string())),
        }
    }
}

impl From<bool> for SwitchState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}
