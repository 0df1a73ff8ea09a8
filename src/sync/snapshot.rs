// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Immutable state snapshots.

use std::collections::HashMap;
use std::fmt;

use crate::channel::ChannelId;
use crate::transport::ConnectionState;
use crate::types::SwitchState;

/// Current value of a device channel.
///
/// Every configured channel starts as [`Unknown`](DeviceState::Unknown)
/// and stays that way until the first observation (an inbound message or
/// an optimistic command write). Values are never destroyed afterwards;
/// in particular, a reconnection does not reset them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DeviceState {
    /// No observation yet.
    #[default]
    Unknown,
    /// A binary actuator state.
    Switch(SwitchState),
    /// A numeric sensor reading.
    Reading(f64),
}

impl DeviceState {
    /// Returns `true` if the channel has not been observed yet.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the switch state, if this is a known actuator value.
    #[must_use]
    pub const fn switch(&self) -> Option<SwitchState> {
        match self {
            Self::Switch(state) => Some(*state),
            _ => None,
        }
    }

    /// Returns the sensor reading, if this is a known numeric value.
    #[must_use]
    pub const fn reading(&self) -> Option<f64> {
        match self {
            Self::Reading(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceState {
    /// Dashboard-style rendering: `--` until the first observation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("--"),
            Self::Switch(state) => write!(f, "{state}"),
            Self::Reading(value) => write!(f, "{value}"),
        }
    }
}

/// An immutable point-in-time view of connection and device state.
///
/// Snapshots are constructed wholesale on every transition and shared as
/// `Arc<Snapshot>`; consumers can never observe a half-updated state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    connection: ConnectionState,
    devices: HashMap<ChannelId, DeviceState>,
}

impl Snapshot {
    pub(crate) fn new(
        connection: ConnectionState,
        devices: HashMap<ChannelId, DeviceState>,
    ) -> Self {
        Self {
            connection,
            devices,
        }
    }

    /// Returns the connection state at the time of the snapshot.
    #[must_use]
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Returns `true` if the session was connected at snapshot time.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Returns the state of a channel, or `None` for unconfigured ids.
    #[must_use]
    pub fn device(&self, id: &str) -> Option<DeviceState> {
        self.devices.get(id).copied()
    }

    /// Iterates over all channel states.
    pub fn devices(&self) -> impl Iterator<Item = (&ChannelId, DeviceState)> {
        self.devices.iter().map(|(id, state)| (id, *state))
    }

    /// Returns the number of configured channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.devices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut devices = HashMap::new();
        devices.insert(
            ChannelId::new("relay1"),
            DeviceState::Switch(SwitchState::On),
        );
        devices.insert(ChannelId::new("temperature"), DeviceState::Reading(23.5));
        devices.insert(ChannelId::new("humidity"), DeviceState::Unknown);
        Snapshot::new(ConnectionState::Connected, devices)
    }

    #[test]
    fn device_lookup() {
        let snapshot = sample();
        assert_eq!(
            snapshot.device("relay1"),
            Some(DeviceState::Switch(SwitchState::On))
        );
        assert_eq!(snapshot.device("temperature"), Some(DeviceState::Reading(23.5)));
        assert_eq!(snapshot.device("humidity"), Some(DeviceState::Unknown));
        assert_eq!(snapshot.device("nope"), None);
    }

    #[test]
    fn accessors() {
        let snapshot = sample();
        assert!(snapshot.is_connected());
        assert_eq!(snapshot.connection(), ConnectionState::Connected);
        assert_eq!(snapshot.channel_count(), 3);
    }

    #[test]
    fn device_state_helpers() {
        assert!(DeviceState::Unknown.is_unknown());
        assert_eq!(
            DeviceState::Switch(SwitchState::Off).switch(),
            Some(SwitchState::Off)
        );
        assert_eq!(DeviceState::Switch(SwitchState::Off).reading(), None);
        assert_eq!(DeviceState::Reading(42.0).reading(), Some(42.0));
    }

    #[test]
    fn device_state_display() {
        assert_eq!(DeviceState::Unknown.to_string(), "--");
        assert_eq!(DeviceState::Switch(SwitchState::On).to_string(), "ON");
        assert_eq!(DeviceState::Reading(23.5).to_string(), "23.5");
    }
}
