// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `HomeSync` - a Rust library to mirror smart-home device state over MQTT.
//!
//! This library maintains a consistent local view of remote device state
//! (relays, temperature/humidity sensors) over an unreliable,
//! reconnecting MQTT link, and reconciles locally-issued commands with
//! asynchronously-arriving confirmations.
//!
//! # How it works
//!
//! - A [`transport::MqttSession`] owns one logical broker connection,
//!   resubscribes on every reconnect, and delivers lifecycle transitions
//!   and raw messages as one serialized event stream.
//! - A [`sync::Synchronizer`] maps those events onto a typed
//!   device-state mapping through a topic dispatch table, applies
//!   optimistic updates for locally-issued commands, and publishes
//!   immutable [`Snapshot`]s.
//! - Commands are reconciled last-observed-wins: an optimistic write is
//!   visible immediately, and any later inbound message on the same
//!   topic overwrites it, since the broker link is best-effort and sends
//!   no acknowledgments.
//!
//! Loss of connectivity degrades to "last known state, no new updates,
//! commands dropped at the transport" and is visible through
//! [`ConnectionState`]; it never blocks interaction or resets values.
//!
//! # Quick Start
//!
//! ```no_run
//! use homesync::{DeviceChannel, HomeSync, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> homesync::Result<()> {
//!     let sync = HomeSync::connect(
//!         SyncConfig::new("mqtt://broker.hivemq.com:1883")
//!             .channel(DeviceChannel::actuator("relay1", "mohith123/home/relay1"))
//!             .channel(DeviceChannel::sensor(
//!                 "temperature",
//!                 "mohith123/home/room1/temperature",
//!             ))
//!             .channel(DeviceChannel::sensor(
//!                 "humidity",
//!                 "mohith123/home/room1/humidity",
//!             )),
//!     )?;
//!
//!     // Turn the light on; the snapshot reflects it immediately.
//!     sync.issue_command("relay1", "ON")?;
//!
//!     // Watch state transitions as the broker reports them.
//!     let mut snapshots = sync.subscribe();
//!     while let Ok(snapshot) = snapshots.recv().await {
//!         println!(
//!             "[{}] relay1={} temperature={}",
//!             snapshot.connection(),
//!             snapshot.device("relay1").unwrap_or_default(),
//!             snapshot.device("temperature").unwrap_or_default(),
//!         );
//!     }
//!
//!     sync.close().await;
//!     Ok(())
//! }
//! ```

mod channel;
mod config;
pub mod error;
mod home_sync;
pub mod sync;
pub mod transport;
pub mod types;

pub use channel::{ChannelId, ChannelKind, DeviceChannel};
pub use config::SyncConfig;
pub use error::{CommandError, ConfigError, Error, PayloadError, Result, TransportError};
pub use home_sync::HomeSync;
pub use sync::{CommandSink, DeviceState, Snapshot, Synchronizer};
pub use transport::{ConnectionState, MqttSession, MqttSessionBuilder, SessionEvent, SessionSink};
pub use types::{HumidityBand, SwitchState, TemperatureBand};
