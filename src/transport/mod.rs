// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport session for the broker link.
//!
//! This module owns the single logical MQTT connection: connect and
//! reconnect handling, topic subscription bookkeeping, and delivery of
//! raw topic/payload pairs as a serialized [`SessionEvent`] stream.
//!
//! Transport failures never cross this boundary as errors; they surface
//! as [`ConnectionState`] transitions on the event stream, and the
//! underlying client retries autonomously.

use std::fmt;

mod session;

pub use session::{MqttSession, MqttSessionBuilder, SessionSink};

/// Lifecycle state of the broker connection.
///
/// Owned exclusively by the transport session; read-only everywhere else.
/// `Disconnected` and `Error` are both re-enterable: the session may
/// cycle through them indefinitely. The only terminal state is reached
/// via [`MqttSession::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// A connection attempt is in progress.
    Connecting,
    /// The session is connected and subscribed.
    Connected,
    /// The connection was closed or lost.
    Disconnected,
    /// The transport reported a failure; reconnection will follow.
    Error,
}

impl ConnectionState {
    /// Returns `true` if the session is currently connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    /// Human-readable status label, suitable for a dashboard badge.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "Connecting…",
            Self::Connected => "Connected",
            Self::Disconnected => "Offline",
            Self::Error => "Error",
        })
    }
}

/// An event delivered by the transport session.
///
/// Events are serialized through one channel, so consumers observe
/// lifecycle transitions and messages in the exact order the transport
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The connection lifecycle state changed.
    ConnectionChanged(ConnectionState),
    /// A message arrived on a subscribed topic.
    Message {
        /// The full topic the message was published on.
        topic: String,
        /// The UTF-8 message body.
        payload: String,
    },
}
