// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The connected synchronization handle.
//!
//! [`HomeSync`] wires the pieces together: it opens a transport session
//! subscribed to every configured topic, builds the synchronizer, and
//! pumps session events into it on a background task.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::SyncConfig;
use crate::error::{CommandError, Result};
use crate::sync::{Snapshot, Synchronizer};
use crate::transport::{ConnectionState, MqttSession, SessionEvent};
use crate::types::SwitchState;

/// A running device-state synchronization session.
///
/// Data flows one way inward (broker → session → synchronizer →
/// snapshots) and one way outward (commands → synchronizer → session →
/// broker). Dropping the handle tears the session and the event pump
/// down.
///
/// # Examples
///
/// ```no_run
/// use homesync::{DeviceChannel, HomeSync, SyncConfig};
///
/// #[tokio::main]
/// async fn main() -> homesync::Result<()> {
///     let sync = HomeSync::connect(
///         SyncConfig::new("mqtt://broker.hivemq.com:1883")
///             .channel(DeviceChannel::actuator("relay1", "mohith123/home/relay1"))
///             .channel(DeviceChannel::sensor(
///                 "temperature",
///                 "mohith123/home/room1/temperature",
///             )),
///     )?;
///
///     let mut snapshots = sync.subscribe();
///     sync.issue_command("relay1", "ON")?;
///
///     while let Ok(snapshot) = snapshots.recv().await {
///         println!("{}: relay1 = {:?}", snapshot.connection(), snapshot.device("relay1"));
///     }
///
///     sync.close().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct HomeSync {
    session: MqttSession,
    sync: Synchronizer,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl HomeSync {
    /// Opens the session and starts synchronizing.
    ///
    /// Non-blocking: returns as soon as the background tasks are
    /// spawned. Connection progress is observable through
    /// [`subscribe`](Self::subscribe) and [`snapshot`](Self::snapshot).
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable endpoint or an invalid
    /// channel table (empty, duplicate topic, duplicate id). Transport
    /// failures after this point surface only as [`ConnectionState`]
    /// transitions.
    pub fn connect(config: SyncConfig) -> Result<Self> {
        let (endpoint, channels, credentials, keep_alive, reconnect_delay) = config.into_parts();

        let mut builder = MqttSession::builder()
            .endpoint(endpoint)
            .topics(channels.iter().map(|c| c.topic().to_string()))
            .keep_alive(keep_alive)
            .reconnect_delay(reconnect_delay);
        if let Some((username, password)) = credentials {
            builder = builder.credentials(username, password);
        }
        let (session, events) = builder.open()?;

        let sync = Synchronizer::new(channels, Arc::new(session.sink()))?;
        let pump = tokio::spawn(pump_events(sync.clone(), events));

        Ok(Self {
            session,
            sync,
            pump: Mutex::new(Some(pump)),
        })
    }

    /// Returns the latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.sync.snapshot()
    }

    /// Subscribes to snapshot transitions.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.sync.subscribe()
    }

    /// Issues an actuator command; see [`Synchronizer::issue_command`].
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] for an unknown channel or an invalid
    /// value.
    pub fn issue_command(&self, channel: &str, value: &str) -> std::result::Result<(), CommandError> {
        self.sync.issue_command(channel, value)
    }

    /// Typed variant of [`issue_command`](Self::issue_command).
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownChannel`] if `channel` does not
    /// name a configured actuator channel.
    pub fn set_switch(&self, channel: &str, state: SwitchState) -> std::result::Result<(), CommandError> {
        self.sync.set_switch(channel, state)
    }

    /// Returns the synchronizer for direct access.
    #[must_use]
    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    /// Returns whether the transport is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Closes the session.
    ///
    /// Idempotent and safe to call multiple times. After closing, the
    /// final snapshot reports `Disconnected` and commands become
    /// transport-level no-ops.
    pub async fn close(&self) {
        self.session.close().await;
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
        // The pump may have been stopped before the transport's final
        // lifecycle event went through; settle the store directly.
        self.sync
            .apply(SessionEvent::ConnectionChanged(ConnectionState::Disconnected));
    }
}

impl Drop for HomeSync {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
    }
}

/// Forwards session events into the synchronizer, in delivery order.
async fn pump_events(sync: Synchronizer, mut events: mpsc::Receiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        sync.apply(event);
    }
    tracing::debug!("Event pump stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::channel::DeviceChannel;
    use crate::error::{ConfigError, Error, TransportError};
    use crate::sync::DeviceState;

    fn unreachable_config() -> SyncConfig {
        // Port 1 never accepts; the session stays disconnected.
        SyncConfig::new("mqtt://127.0.0.1:1")
            .channel(DeviceChannel::actuator("relay1", "home/relay1"))
            .channel(DeviceChannel::sensor("temperature", "home/room1/temperature"))
            .reconnect_delay(Duration::from_millis(50))
    }

    #[tokio::test]
    async fn connect_rejects_bad_endpoint() {
        let config = SyncConfig::new("mqtt://")
            .channel(DeviceChannel::actuator("relay1", "home/relay1"));
        let result = HomeSync::connect(config);
        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::InvalidEndpoint(_)))
        ));
    }

    #[tokio::test]
    async fn connect_rejects_duplicate_topics() {
        let config = SyncConfig::new("mqtt://127.0.0.1:1")
            .channel(DeviceChannel::actuator("relay1", "home/shared"))
            .channel(DeviceChannel::sensor("temperature", "home/shared"));
        let result = HomeSync::connect(config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::DuplicateTopic { .. }))
        ));
    }

    #[tokio::test]
    async fn commands_are_optimistic_without_a_broker() {
        let sync = HomeSync::connect(unreachable_config()).unwrap();

        sync.issue_command("relay1", "ON").unwrap();
        assert_eq!(
            sync.snapshot().device("relay1"),
            Some(DeviceState::Switch(crate::types::SwitchState::On))
        );

        sync.close().await;
    }

    #[tokio::test]
    async fn connect_reports_lifecycle_transitions() {
        let sync = HomeSync::connect(unreachable_config()).unwrap();

        // The endpoint is unreachable, so the session cycles between
        // Connecting and Error; either proves the pump is delivering.
        let mut observed = None;
        for _ in 0..50 {
            let state = sync.snapshot().connection();
            if state != ConnectionState::Disconnected {
                observed = Some(state);
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let state = observed.expect("no lifecycle transition observed");
        assert!(matches!(
            state,
            ConnectionState::Connecting | ConnectionState::Error
        ));

        sync.close().await;
    }

    #[tokio::test]
    async fn close_is_idempotent_and_settles_disconnected() {
        let sync = HomeSync::connect(unreachable_config()).unwrap();

        sync.close().await;
        sync.close().await;

        assert!(!sync.is_connected());
        assert_eq!(
            sync.snapshot().connection(),
            ConnectionState::Disconnected
        );
    }
}
