// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport session.
//!
//! [`MqttSession`] maintains one logical connection to the broker and
//! feeds [`SessionEvent`]s into a channel consumed by the synchronizer.
//! Opening is non-blocking: the connection is established by a spawned
//! event-loop task, and callers learn about lifecycle transitions from
//! the event stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::TransportError;
use crate::sync::CommandSink;

use super::{ConnectionState, SessionEvent};

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A transport session holding one logical broker connection.
///
/// Created via [`MqttSession::builder`]. The session subscribes to the
/// configured topics on every successful (re)connection, since the
/// broker is not assumed to remember subscriptions across sessions.
///
/// # Examples
///
/// ```no_run
/// use homesync::transport::{MqttSession, SessionEvent};
///
/// # fn example() -> homesync::Result<()> {
/// let (session, mut events) = MqttSession::builder()
///     .endpoint("mqtt://broker.hivemq.com:1883")
///     .topic("mohith123/home/relay1")
///     .open()?;
///
/// // events now yields ConnectionChanged and Message items.
/// session.publish("mohith123/home/relay1", "ON");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MqttSession {
    sink: SessionSink,
    endpoint: String,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl MqttSession {
    /// Creates a new builder for configuring a transport session.
    #[must_use]
    pub fn builder() -> MqttSessionBuilder {
        MqttSessionBuilder::default()
    }

    /// Returns the configured broker endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns whether the session is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.sink.is_connected()
    }

    /// Publishes a best-effort, non-retained message.
    ///
    /// Fire-and-forget: no acknowledgment is awaited and nothing is
    /// guaranteed beyond "handed to the transport if currently
    /// connected". While disconnected the message is dropped, not
    /// queued; the dashboard reflects reality once the link returns.
    pub fn publish(&self, topic: &str, payload: &str) {
        self.sink.publish(topic, payload);
    }

    /// Returns a cheap handle for publishing through this session.
    #[must_use]
    pub fn sink(&self) -> SessionSink {
        self.sink.clone()
    }

    /// Closes the session and stops the event loop.
    ///
    /// Idempotent: calling it again (or after the connection already
    /// dropped) is a no-op.
    pub async fn close(&self) {
        if self.sink.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.sink.connected.store(false, Ordering::Release);

        tracing::info!(endpoint = %self.endpoint, "Closing transport session");
        if let Err(e) = self.sink.client.disconnect().await {
            // The event loop may already be gone; nothing left to release.
            tracing::debug!(error = %e, "Disconnect after close");
        }
    }
}

impl Drop for MqttSession {
    fn drop(&mut self) {
        self.sink.closed.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

/// A cheap, cloneable publishing handle for a session.
///
/// Carries the same drop-when-disconnected semantics as
/// [`MqttSession::publish`].
#[derive(Debug, Clone)]
pub struct SessionSink {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl SessionSink {
    /// Returns whether the session is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && !self.closed.load(Ordering::Acquire)
    }

    /// Publishes a best-effort, non-retained message.
    ///
    /// A documented no-op while disconnected: the message is dropped,
    /// not queued.
    pub fn publish(&self, topic: &str, payload: &str) {
        if !self.is_connected() {
            tracing::debug!(topic = %topic, "Not connected; dropping outbound message");
            return;
        }

        tracing::debug!(topic = %topic, payload = %payload, "Publishing message");
        if let Err(e) = self
            .client
            .try_publish(topic, QoS::AtMostOnce, false, payload)
        {
            // Best-effort: a full request queue or a racing disconnect
            // loses the message, same as a broker-side drop would.
            tracing::warn!(topic = %topic, error = %e, "Failed to hand message to transport");
        }
    }
}

impl CommandSink for SessionSink {
    fn publish(&self, topic: &str, payload: &str) {
        Self::publish(self, topic, payload);
    }
}

/// Builder for a transport session.
#[derive(Debug, Default)]
pub struct MqttSessionBuilder {
    endpoint: Option<String>,
    topics: Vec<String>,
    credentials: Option<(String, String)>,
    client_id: Option<String>,
    keep_alive: Option<Duration>,
    reconnect_delay: Option<Duration>,
}

impl MqttSessionBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the broker endpoint.
    ///
    /// Accepts `mqtt://host:port`, `tcp://host:port`, or a bare
    /// `host[:port]`; the default port is 1883.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Adds a topic to subscribe on every (re)connection.
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topics.push(topic.into());
        self
    }

    /// Adds several topics to subscribe on every (re)connection.
    #[must_use]
    pub fn topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics.extend(topics.into_iter().map(Into::into));
        self
    }

    /// Sets authentication credentials for the broker.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets a custom client ID.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = Some(duration);
        self
    }

    /// Sets the delay between reconnection attempts (default: 3 seconds).
    #[must_use]
    pub fn reconnect_delay(mut self, duration: Duration) -> Self {
        self.reconnect_delay = Some(duration);
        self
    }

    /// Opens the session.
    ///
    /// Non-blocking: returns as soon as the event-loop task is spawned.
    /// The first [`SessionEvent`] on the returned receiver is
    /// `ConnectionChanged(Connecting)`; connection progress and all
    /// subsequent traffic follow on the same channel.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] if the endpoint is
    /// missing or unparseable. Transport failures after this point are
    /// reported on the event stream, never as errors.
    pub fn open(self) -> Result<(MqttSession, mpsc::Receiver<SessionEvent>), TransportError> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| TransportError::InvalidEndpoint("endpoint is required".to_string()))?;
        let (host, port) = parse_endpoint(&endpoint)?;

        let client_id = self.client_id.unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("homesync_{}_{}", std::process::id(), counter)
        });

        let mut mqtt_options = MqttOptions::new(&client_id, host, port);
        mqtt_options.set_keep_alive(self.keep_alive.unwrap_or(Duration::from_secs(30)));
        mqtt_options.set_clean_session(true);
        if let Some((username, password)) = self.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(EVENT_CHANNEL_CAPACITY);

        let sink = SessionSink {
            client: client.clone(),
            connected: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
        };

        // The consumer sees the initial lifecycle state before any
        // traffic; the channel is empty at this point.
        let _ = event_tx.try_send(SessionEvent::ConnectionChanged(ConnectionState::Connecting));

        tracing::info!(endpoint = %endpoint, client_id = %client_id, "Opening transport session");

        let loop_ctx = EventLoopContext {
            client,
            topics: self.topics,
            events: event_tx,
            connected: Arc::clone(&sink.connected),
            closed: Arc::clone(&sink.closed),
            reconnect_delay: self.reconnect_delay.unwrap_or(Duration::from_secs(3)),
        };
        let task = tokio::spawn(run_event_loop(event_loop, loop_ctx));

        let session = MqttSession {
            sink,
            endpoint,
            task: Mutex::new(Some(task)),
        };
        Ok((session, event_rx))
    }
}

/// Shared state handed to the event-loop task.
struct EventLoopContext {
    client: AsyncClient,
    topics: Vec<String>,
    events: mpsc::Sender<SessionEvent>,
    connected: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    reconnect_delay: Duration,
}

/// Drives the MQTT event loop until the session is closed or the
/// consumer goes away.
async fn run_event_loop(mut event_loop: EventLoop, ctx: EventLoopContext) {
    loop {
        if ctx.closed.load(Ordering::Acquire) {
            break;
        }

        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "Broker connection acknowledged");
                ctx.connected.store(true, Ordering::Release);

                // Clean session: the broker forgot our subscriptions, so
                // every (re)connection re-subscribes the full topic set.
                for topic in &ctx.topics {
                    if let Err(e) = ctx.client.subscribe(topic, QoS::AtLeastOnce).await {
                        tracing::warn!(topic = %topic, error = %e, "Failed to subscribe");
                    }
                }

                if !send_event(
                    &ctx.events,
                    SessionEvent::ConnectionChanged(ConnectionState::Connected),
                )
                .await
                {
                    break;
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "Subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match String::from_utf8(publish.payload.to_vec()) {
                    Ok(payload) => {
                        tracing::debug!(
                            topic = %publish.topic,
                            payload = %payload,
                            "Message received"
                        );
                        let event = SessionEvent::Message {
                            topic: publish.topic,
                            payload,
                        };
                        if !send_event(&ctx.events, event).await {
                            break;
                        }
                    }
                    Err(_) => {
                        tracing::debug!(topic = %publish.topic, "Dropping non-UTF-8 payload");
                    }
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("Broker requested disconnect");
                ctx.connected.store(false, Ordering::Release);
                if !send_event(
                    &ctx.events,
                    SessionEvent::ConnectionChanged(ConnectionState::Disconnected),
                )
                .await
                {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                ctx.connected.store(false, Ordering::Release);

                if ctx.closed.load(Ordering::Acquire) {
                    break;
                }

                tracing::warn!(error = %e, "Transport error; will reconnect");
                if !send_event(
                    &ctx.events,
                    SessionEvent::ConnectionChanged(ConnectionState::Error),
                )
                .await
                {
                    break;
                }

                // rumqttc retries the connection on the next poll; the
                // delay just spaces the attempts out.
                tokio::time::sleep(ctx.reconnect_delay).await;

                if !send_event(
                    &ctx.events,
                    SessionEvent::ConnectionChanged(ConnectionState::Connecting),
                )
                .await
                {
                    break;
                }
            }
        }
    }

    ctx.connected.store(false, Ordering::Release);
    let _ = ctx
        .events
        .try_send(SessionEvent::ConnectionChanged(ConnectionState::Disconnected));
    tracing::debug!("Transport event loop stopped");
}

/// Sends an event to the consumer; returns `false` if the consumer is gone.
async fn send_event(events: &mpsc::Sender<SessionEvent>, event: SessionEvent) -> bool {
    events.send(event).await.is_ok()
}

/// Parses a broker endpoint into host and port.
fn parse_endpoint(endpoint: &str) -> Result<(String, u16), TransportError> {
    let trimmed = endpoint
        .strip_prefix("mqtt://")
        .or_else(|| endpoint.strip_prefix("tcp://"))
        .unwrap_or(endpoint);

    if trimmed.is_empty() {
        return Err(TransportError::InvalidEndpoint(endpoint.to_string()));
    }

    let (host, port) = if let Some((h, p)) = trimmed.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| TransportError::InvalidEndpoint(format!("invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (trimmed.to_string(), 1883)
    };

    if host.is_empty() {
        return Err(TransportError::InvalidEndpoint(endpoint.to_string()));
    }

    Ok((host, port))
}
