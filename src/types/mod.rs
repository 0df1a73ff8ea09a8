// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core value types for device state.
//!
//! This module provides the typed representations of wire values:
//! [`SwitchState`] for binary actuators, and the comfort-band helpers
//! ([`TemperatureBand`], [`HumidityBand`]) used by presentation layers to
//! classify sensor readings.

mod band;
mod switch;

pub use band::{HumidityBand, TemperatureBand};
pub use switch::SwitchState;
