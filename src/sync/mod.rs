// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state synchronization.
//!
//! The [`Synchronizer`] turns the transport's raw topic/payload stream
//! and user-issued commands into a consistent device-state mapping, and
//! publishes immutable [`Snapshot`]s to subscribed consumers.
//!
//! # Reconciliation model
//!
//! Commands are applied optimistically: the local state changes the
//! moment a command is issued, before the broker ever sees it. Inbound
//! messages always take precedence over earlier optimistic writes
//! (last-observed-wins), since they are the one confirmable source of
//! truth over a best-effort pub/sub link with no acknowledgments.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use homesync::sync::{CommandSink, Synchronizer};
//! use homesync::{DeviceChannel, DeviceState, SwitchState};
//!
//! struct NullSink;
//! impl CommandSink for NullSink {
//!     fn publish(&self, _topic: &str, _payload: &str) {}
//! }
//!
//! # fn main() -> homesync::Result<()> {
//! let sync = Synchronizer::new(
//!     [DeviceChannel::actuator("relay1", "home/relay1")],
//!     Arc::new(NullSink),
//! )?;
//!
//! sync.issue_command("relay1", "ON")?;
//! assert_eq!(
//!     sync.snapshot().device("relay1"),
//!     Some(DeviceState::Switch(SwitchState::On))
//! );
//! # Ok(())
//! # }
//! ```

mod snapshot;
mod synchronizer;

pub use snapshot::{DeviceState, Snapshot};
pub use synchronizer::{CommandSink, Synchronizer};
