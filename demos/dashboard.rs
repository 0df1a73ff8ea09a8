// SPDX-License-Identifier: MPL-2.0

//! Dashboard backend demo.
//!
//! Mirrors the reference smart-climate dashboard: one relay-controlled
//! light and two sensors, synchronized against a public broker. Prints
//! every snapshot transition and toggles the relay every few seconds so
//! the optimistic-update path is visible.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example dashboard -- [broker_endpoint] [topic_prefix]
//!
//! # Against the public HiveMQ broker with a custom prefix
//! cargo run --example dashboard -- mqtt://broker.hivemq.com:1883 myhome123
//! ```
//!
//! Feed it sensor data from another terminal, e.g. with mosquitto:
//!
//! ```bash
//! mosquitto_pub -h broker.hivemq.com -t 'myhome123/home/room1/temperature' -m '23.5'
//! ```

use std::env;
use std::time::Duration;

use homesync::{DeviceChannel, HomeSync, SwitchState, SyncConfig, TemperatureBand};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let endpoint = args
        .get(1)
        .map_or("mqtt://broker.hivemq.com:1883", String::as_str);
    let prefix = args.get(2).map_or("homesync-demo", String::as_str);

    let sync = HomeSync::connect(
        SyncConfig::new(endpoint)
            .channel(DeviceChannel::actuator("relay1", format!("{prefix}/home/relay1")))
            .channel(DeviceChannel::sensor(
                "temperature",
                format!("{prefix}/home/room1/temperature"),
            ))
            .channel(DeviceChannel::sensor(
                "humidity",
                format!("{prefix}/home/room1/humidity"),
            )),
    )?;

    println!("Dashboard backend running against {endpoint} (prefix: {prefix})");

    let mut snapshots = sync.subscribe();
    let mut toggle = tokio::time::interval(Duration::from_secs(5));
    let mut light = SwitchState::Off;

    loop {
        tokio::select! {
            snapshot = snapshots.recv() => {
                let snapshot = match snapshot {
                    Ok(snapshot) => snapshot,
                    // A slow terminal only loses intermediate frames.
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                };
                let temperature = snapshot
                    .device("temperature")
                    .and_then(|s| s.reading())
                    .map_or_else(|| "--".to_string(), |t| {
                        format!("{t:.1} °C ({})", TemperatureBand::classify(t))
                    });
                println!(
                    "[{}] light={} temperature={} humidity={}",
                    snapshot.connection(),
                    snapshot.device("relay1").unwrap_or_default(),
                    temperature,
                    snapshot.device("humidity").unwrap_or_default(),
                );
            }
            _ = toggle.tick() => {
                if sync.is_connected() {
                    light = if light.is_on() { SwitchState::Off } else { SwitchState::On };
                    sync.set_switch("relay1", light)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    sync.close().await;
    Ok(())
}
