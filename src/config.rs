// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static configuration for a synchronization session.
//!
//! The embedding application supplies the broker endpoint and the
//! channel-to-topic table; nothing is read from the environment here.

use std::time::Duration;

use crate::channel::DeviceChannel;

/// Configuration for [`HomeSync::connect`](crate::HomeSync::connect).
///
/// # Examples
///
/// ```
/// use homesync::{DeviceChannel, SyncConfig};
///
/// let config = SyncConfig::new("mqtt://broker.hivemq.com:1883")
///     .channel(DeviceChannel::actuator("relay1", "mohith123/home/relay1"))
///     .channel(DeviceChannel::sensor(
///         "temperature",
///         "mohith123/home/room1/temperature",
///     ))
///     .channel(DeviceChannel::sensor(
///         "humidity",
///         "mohith123/home/room1/humidity",
///     ));
///
/// assert_eq!(config.channels().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    endpoint: String,
    channels: Vec<DeviceChannel>,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    reconnect_delay: Duration,
}

impl SyncConfig {
    /// Creates a configuration for the given broker endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            channels: Vec::new(),
            credentials: None,
            keep_alive: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(3),
        }
    }

    /// Adds a device channel.
    #[must_use]
    pub fn channel(mut self, channel: DeviceChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Adds several device channels.
    #[must_use]
    pub fn channels_from<I>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = DeviceChannel>,
    {
        self.channels.extend(channels);
        self
    }

    /// Sets broker authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = duration;
        self
    }

    /// Sets the delay between reconnection attempts (default: 3 seconds).
    #[must_use]
    pub fn reconnect_delay(mut self, duration: Duration) -> Self {
        self.reconnect_delay = duration;
        self
    }

    /// Returns the broker endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the configured channels.
    #[must_use]
    pub fn channels(&self) -> &[DeviceChannel] {
        &self.channels
    }

    /// Decomposes the configuration for session setup.
    #[allow(clippy::type_complexity)]
    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        Vec<DeviceChannel>,
        Option<(String, String)>,
        Duration,
        Duration,
    ) {
        (
            self.endpoint,
            self.channels,
            self.credentials,
            self.keep_alive,
            self.reconnect_delay,
        )
    }
}
