// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device channel definitions.
//!
//! A [`DeviceChannel`] binds a named device axis (a relay, a sensor
//! reading) to exactly one MQTT topic. Channels are declared once in the
//! static configuration and are immutable for the process lifetime.
//!
//! # Examples
//!
//! ```
//! use homesync::{ChannelKind, DeviceChannel};
//!
//! let relay = DeviceChannel::actuator("relay1", "home/relay1");
//! assert_eq!(relay.kind(), ChannelKind::Actuator);
//! assert_eq!(relay.topic(), "home/relay1");
//!
//! let temp = DeviceChannel::sensor("temperature", "home/room1/temperature");
//! assert_eq!(temp.id().as_str(), "temperature");
//! ```

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a device channel.
///
/// Channel ids are opaque names chosen by the embedding application
/// (e.g. `relay1`, `temperature`). They identify a channel in snapshots
/// and in command issuance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a new channel id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// Allows HashMap<ChannelId, _> lookups with a plain &str.
impl Borrow<str> for ChannelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The kind of device axis a channel represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// A binary actuator (relay): accepts and reports `ON`/`OFF`.
    Actuator,
    /// A read-only numeric sensor (temperature, humidity, ...).
    Sensor,
}

/// A named device axis bound to exactly one MQTT topic.
///
/// Actuator channels use the same topic for inbound state updates and
/// outbound commands. Sensor channels are inbound-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceChannel {
    id: ChannelId,
    topic: String,
    kind: ChannelKind,
}

impl DeviceChannel {
    /// Creates a new channel of the given kind.
    #[must_use]
    pub fn new(id: impl Into<ChannelId>, topic: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            kind,
        }
    }

    /// Creates an actuator channel.
    #[must_use]
    pub fn actuator(id: impl Into<ChannelId>, topic: impl Into<String>) -> Self {
        Self::new(id, topic, ChannelKind::Actuator)
    }

    /// Creates a sensor channel.
    #[must_use]
    pub fn sensor(id: impl Into<ChannelId>, topic: impl Into<String>) -> Self {
        Self::new(id, topic, ChannelKind::Sensor)
    }

    /// Returns the channel id.
    #[must_use]
    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    /// Returns the topic this channel is bound to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the channel kind.
    #[must_use]
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Returns `true` if this channel accepts commands.
    #[must_use]
    pub fn is_actuator(&self) -> bool {
        self.kind == ChannelKind::Actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actuator_constructor() {
        let ch = DeviceChannel::actuator("relay1", "home/relay1");
        assert_eq!(ch.id().as_str(), "relay1");
        assert_eq!(ch.topic(), "home/relay1");
        assert_eq!(ch.kind(), ChannelKind::Actuator);
        assert!(ch.is_actuator());
    }

    #[test]
    fn sensor_constructor() {
        let ch = DeviceChannel::sensor("temperature", "home/room1/temperature");
        assert_eq!(ch.kind(), ChannelKind::Sensor);
        assert!(!ch.is_actuator());
    }

    #[test]
    fn channel_id_display() {
        let id = ChannelId::new("humidity");
        assert_eq!(id.to_string(), "humidity");
    }

    #[test]
    fn channel_id_borrow_lookup() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(ChannelId::new("relay1"), 1);
        assert_eq!(map.get("relay1"), Some(&1));
        assert_eq!(map.get("relay2"), None);
    }

    #[test]
    fn channel_deserializes_from_config_table() {
        let json = r#"{"id":"relay1","topic":"home/relay1","kind":"actuator"}"#;
        let ch: DeviceChannel = serde_json::from_str(json).unwrap();
        assert_eq!(ch, DeviceChannel::actuator("relay1", "home/relay1"));
    }

    #[test]
    fn channel_serializes_round_trip() {
        let ch = DeviceChannel::sensor("humidity", "home/room1/humidity");
        let json = serde_json::to_string(&ch).unwrap();
        let back: DeviceChannel = serde_json::from_str(&json).unwrap();
        assert_eq!(ch, back);
    }
}
