// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `homesync` library.
//!
//! This module provides the error hierarchy for failures across the
//! library: channel configuration, transport setup, command validation,
//! and wire payload parsing.
//!
//! Runtime transport faults (a dropped broker connection, a failed
//! publish) are deliberately *not* part of this hierarchy: they surface
//! as [`ConnectionState`](crate::ConnectionState) transitions on the
//! session event stream, never as errors returned to callers.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error in the static channel configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error while setting up or tearing down the transport session.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A command was rejected before publishing.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// Errors in the static channel-to-topic configuration.
///
/// These are construction-time failures: the channel table is immutable
/// for the process lifetime, so a bad table is rejected before any
/// connection is opened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two channels are bound to the same topic.
    ///
    /// The dispatch table maps each topic to exactly one channel.
    #[error("topic {topic:?} is bound to more than one channel")]
    DuplicateTopic {
        /// The topic that appears more than once.
        topic: String,
    },

    /// Two channels share the same identifier.
    #[error("channel id {id:?} is declared more than once")]
    DuplicateChannel {
        /// The channel id that appears more than once.
        id: String,
    },

    /// The channel list is empty.
    #[error("channel list is empty")]
    NoChannels,
}

/// Errors related to transport session setup and teardown.
///
/// Once a session is running, transport failures are reported through
/// [`ConnectionState`](crate::ConnectionState) transitions instead.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The broker endpoint could not be parsed.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// MQTT client operation failed.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),
}

/// Synchronous validation failures from command issuance.
///
/// These are returned as values so the presentation layer can reject the
/// user action (e.g. disable a control); they are never raised as faults.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The channel id does not refer to a configured actuator channel.
    #[error("unknown actuator channel: {0}")]
    UnknownChannel(String),

    /// The command value is not a valid actuator state.
    #[error("invalid command value: {0:?} (expected \"ON\" or \"OFF\")")]
    InvalidCommand(String),
}

/// Errors from parsing inbound wire payloads.
///
/// Unrecognized payloads are treated as noise: logged, discarded, and the
/// previous device state retained. They never reach subscribers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// An actuator payload that is not the literal `ON` or `OFF`.
    #[error("unrecognized switch payload: {0:?}")]
    UnrecognizedSwitch(String),

    /// A sensor payload that does not parse as a finite decimal number.
    #[error("malformed sensor reading: {0:?}")]
    MalformedReading(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::DuplicateTopic {
            topic: "home/relay1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "topic \"home/relay1\" is bound to more than one channel"
        );
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::UnknownChannel("relay9".to_string());
        assert_eq!(err.to_string(), "unknown actuator channel: relay9");
    }

    #[test]
    fn error_from_command_error() {
        let cmd_err = CommandError::InvalidCommand("BLINK".to_string());
        let err: Error = cmd_err.into();
        assert!(matches!(
            err,
            Error::Command(CommandError::InvalidCommand(_))
        ));
    }

    #[test]
    fn payload_error_display() {
        let err = PayloadError::MalformedReading("abc".to_string());
        assert_eq!(err.to_string(), "malformed sensor reading: \"abc\"");
    }
}
