// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device state synchronizer.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::channel::{ChannelId, DeviceChannel};
use crate::error::{CommandError, ConfigError, PayloadError};
use crate::transport::{ConnectionState, SessionEvent};
use crate::types::SwitchState;

use super::{DeviceState, Snapshot};

/// Capacity of the snapshot broadcast channel.
///
/// A subscriber that falls further behind than this loses the oldest
/// snapshots (`RecvError::Lagged`) but always converges on the latest.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 256;

/// Outbound seam between the synchronizer and the transport.
///
/// Publishing is fire-and-forget: implementations must return
/// immediately and may drop the message (e.g. while disconnected).
/// [`SessionSink`](crate::transport::SessionSink) is the production
/// implementation; tests substitute a recording sink.
pub trait CommandSink: Send + Sync {
    /// Hands a payload to the transport for best-effort delivery.
    fn publish(&self, topic: &str, payload: &str);
}

/// Maintains a consistent local view of remote device state.
///
/// The synchronizer owns the only mutable store in the crate. It is
/// mutated through exactly two entry points: [`apply`](Self::apply) for
/// transport events and [`issue_command`](Self::issue_command) for user
/// actions. Everything else sees immutable [`Snapshot`]s.
///
/// `Synchronizer` is cheaply cloneable (via `Arc`); clones share the
/// same store.
#[derive(Clone)]
pub struct Synchronizer {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    /// Dispatch table: topic → channel, built once at construction.
    routes: HashMap<String, DeviceChannel>,
    /// Lookup table: channel id → channel.
    channels: HashMap<ChannelId, DeviceChannel>,
    /// The single owned mutable store.
    store: RwLock<Store>,
    /// Snapshot broadcast bus.
    events: broadcast::Sender<Arc<Snapshot>>,
    /// Outbound command path.
    sink: Arc<dyn CommandSink>,
}

struct Store {
    connection: ConnectionState,
    devices: HashMap<ChannelId, DeviceState>,
    /// Latest emitted snapshot; always present.
    snapshot: Arc<Snapshot>,
}

impl Synchronizer {
    /// Creates a synchronizer from the static channel list.
    ///
    /// Every channel starts in the `Unknown` state and the connection
    /// starts as `Disconnected` until the transport reports otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the list is empty, a topic is bound
    /// to more than one channel, or a channel id is declared twice. The
    /// dispatch table requires each topic to map to at most one channel.
    pub fn new(
        channels: impl IntoIterator<Item = DeviceChannel>,
        sink: Arc<dyn CommandSink>,
    ) -> Result<Self, ConfigError> {
        let mut routes = HashMap::new();
        let mut by_id = HashMap::new();
        let mut devices = HashMap::new();

        for channel in channels {
            if routes.contains_key(channel.topic()) {
                return Err(ConfigError::DuplicateTopic {
                    topic: channel.topic().to_string(),
                });
            }
            if by_id.contains_key(channel.id()) {
                return Err(ConfigError::DuplicateChannel {
                    id: channel.id().to_string(),
                });
            }
            devices.insert(channel.id().clone(), DeviceState::Unknown);
            routes.insert(channel.topic().to_string(), channel.clone());
            by_id.insert(channel.id().clone(), channel);
        }

        if routes.is_empty() {
            return Err(ConfigError::NoChannels);
        }

        let connection = ConnectionState::Disconnected;
        let snapshot = Arc::new(Snapshot::new(connection, devices.clone()));
        let (events, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(SyncInner {
                routes,
                channels: by_id,
                store: RwLock::new(Store {
                    connection,
                    devices,
                    snapshot,
                }),
                events,
                sink,
            }),
        })
    }

    /// Returns the sorted set of topics the transport must subscribe to.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.inner.routes.keys().cloned().collect();
        topics.sort_unstable();
        topics
    }

    /// Returns the configured channel for an id, if any.
    #[must_use]
    pub fn channel(&self, id: &str) -> Option<&DeviceChannel> {
        self.inner.channels.get(id)
    }

    /// Returns the latest snapshot.
    ///
    /// Always defined: before any event this is the all-`Unknown`,
    /// `Disconnected` initial snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.read().snapshot.clone()
    }

    /// Subscribes to snapshot transitions.
    ///
    /// The receiver gets one delivery per transition, in emission order.
    /// Delivery through the channel defers observer execution, so an
    /// observer can never re-enter the store mutation path.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.inner.events.subscribe()
    }

    /// Applies a transport event to the store.
    ///
    /// Pure synchronous state transition; called by the event pump with
    /// events in transport-delivery order.
    pub fn apply(&self, event: SessionEvent) {
        match event {
            SessionEvent::ConnectionChanged(state) => self.apply_connection(state),
            SessionEvent::Message { topic, payload } => self.apply_message(&topic, &payload),
        }
    }

    /// Issues an actuator command.
    ///
    /// The local state is updated optimistically and a snapshot emitted
    /// *before* the payload is handed to the transport, so a caller
    /// reading [`snapshot`](Self::snapshot) right after this returns
    /// always sees the commanded value, regardless of connection state.
    /// A later inbound message on the same topic overwrites the
    /// optimistic value (last-observed-wins).
    ///
    /// # Errors
    ///
    /// - [`CommandError::UnknownChannel`] if `channel` does not name a
    ///   configured actuator channel (sensor channels do not accept
    ///   commands).
    /// - [`CommandError::InvalidCommand`] if `value` is not the literal
    ///   `ON` or `OFF`.
    ///
    /// Failed validation leaves the store untouched and emits nothing.
    pub fn issue_command(&self, channel: &str, value: &str) -> Result<(), CommandError> {
        // Channel validation comes first: an unknown channel with a
        // garbled value is still an unknown channel.
        let channel = self.actuator(channel)?;
        let state: SwitchState = value
            .parse()
            .map_err(|_| CommandError::InvalidCommand(value.to_string()))?;
        self.commit_command(channel, state);
        Ok(())
    }

    /// Typed variant of [`issue_command`](Self::issue_command).
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownChannel`] if `channel` does not
    /// name a configured actuator channel.
    pub fn set_switch(&self, channel: &str, state: SwitchState) -> Result<(), CommandError> {
        let channel = self.actuator(channel)?;
        self.commit_command(channel, state);
        Ok(())
    }

    /// Resolves an id to a configured actuator channel.
    fn actuator(&self, id: &str) -> Result<&DeviceChannel, CommandError> {
        self.inner
            .channels
            .get(id)
            .filter(|c| c.is_actuator())
            .ok_or_else(|| CommandError::UnknownChannel(id.to_string()))
    }

    /// Optimistic write, snapshot emission, then best-effort publish.
    fn commit_command(&self, channel: &DeviceChannel, state: SwitchState) {
        tracing::debug!(channel = %channel.id(), state = %state, "Issuing command");
        {
            let mut store = self.inner.store.write();
            store
                .devices
                .insert(channel.id().clone(), DeviceState::Switch(state));
            self.emit_locked(&mut store);
        }
        self.inner.sink.publish(channel.topic(), state.as_str());
    }

    /// Handles a connection lifecycle transition.
    ///
    /// Device state survives reconnection untouched: the broker is not
    /// assumed to replay retained messages, so last-known values stay
    /// visible until superseded by fresh inbound traffic.
    fn apply_connection(&self, state: ConnectionState) {
        let mut store = self.inner.store.write();
        if store.connection == state {
            return;
        }
        tracing::info!(from = %store.connection, to = %state, "Connection state changed");
        store.connection = state;
        self.emit_locked(&mut store);
    }

    /// Handles an inbound message.
    fn apply_message(&self, topic: &str, payload: &str) {
        let Some(channel) = self.inner.routes.get(topic) else {
            // Forward-compatible: topics this view does not render yet.
            tracing::trace!(topic = %topic, "Ignoring message on unconfigured topic");
            return;
        };

        let state = match parse_payload(channel, payload) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    topic = %topic,
                    channel = %channel.id(),
                    error = %e,
                    "Discarding unrecognized payload"
                );
                return;
            }
        };

        let mut store = self.inner.store.write();
        store.devices.insert(channel.id().clone(), state);
        self.emit_locked(&mut store);
    }

    /// Rebuilds and publishes the snapshot.
    ///
    /// Runs under the store's write guard so broadcast order equals
    /// state-transition order.
    fn emit_locked(&self, store: &mut Store) {
        let snapshot = Arc::new(Snapshot::new(store.connection, store.devices.clone()));
        store.snapshot = Arc::clone(&snapshot);
        // No subscribers is fine; the snapshot accessor still advances.
        let _ = self.inner.events.send(snapshot);
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.inner.store.read();
        f.debug_struct("Synchronizer")
            .field("channels", &self.inner.channels.len())
            .field("connection", &store.connection)
            .finish_non_exhaustive()
    }
}

/// Parses a payload according to the channel kind.
fn parse_payload(channel: &DeviceChannel, payload: &str) -> Result<DeviceState, PayloadError> {
    if channel.is_actuator() {
        let state: SwitchState = payload.parse()?;
        Ok(DeviceState::Switch(state))
    } else {
        let value: f64 = payload
            .parse()
            .map_err(|_| PayloadError::MalformedReading(payload.to_string()))?;
        // The wire format is a plain decimal number; "inf"/"NaN" parse
        // as f64 but are not sensor readings.
        if !value.is_finite() {
            return Err(PayloadError::MalformedReading(payload.to_string()));
        }
        Ok(DeviceState::Reading(value))
    }
}
