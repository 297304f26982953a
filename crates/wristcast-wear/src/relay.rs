//! Relay task: `weather_info` -> `weather_info/wear`.
//!
//! A pure copy-and-relabel hop between the phone-side producer and the
//! watch face: `{low, high, image}` pass through untouched, only the
//! timestamp is re-stamped. Deletions and undecodable payloads are
//! ignored.

use std::sync::Arc;

use tokio::sync::watch;
use zenoh::bytes::ZBytes;
use zenoh::sample::SampleKind;

use wristcast_bus::{BusError, ConnectionManager, DEFAULT_CONNECT_TIMEOUT};
use wristcast_protocol::{channels, WeatherSnapshot};

use crate::WearError;

/// Project a snapshot onto the watch-face channel: same fields, fresh
/// timestamp.
pub fn forward(snapshot: &WeatherSnapshot, now_ms: i64) -> WeatherSnapshot {
    WeatherSnapshot {
        low: snapshot.low,
        high: snapshot.high,
        image: snapshot.image.clone(),
        timestamp_ms: now_ms,
    }
}

pub struct Relay {
    manager: Arc<ConnectionManager>,
}

impl Relay {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// Main loop. Blocks until the shutdown signal fires.
    pub async fn run(self, mut shutdown: watch::Receiver<()>) -> Result<(), WearError> {
        let session = self.manager.connect(DEFAULT_CONNECT_TIMEOUT).await?;
        let subscriber = session
            .declare_subscriber(channels::WEATHER_INFO)
            .await
            .map_err(BusError::Zenoh)?;
        log::info!(
            "Relaying {} -> {}",
            channels::WEATHER_INFO,
            channels::WEATHER_INFO_WEAR
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    log::info!("Relay shutting down");
                    break;
                }
                sample = subscriber.recv_async() => {
                    match sample {
                        Ok(sample) => {
                            if sample.kind() != SampleKind::Put {
                                continue;
                            }
                            let payload = sample.payload().to_bytes();
                            let snapshot = match WeatherSnapshot::from_payload(&payload) {
                                Ok(snapshot) => snapshot,
                                Err(e) => {
                                    log::warn!("Undecodable snapshot on {}: {}", channels::WEATHER_INFO, e);
                                    continue;
                                }
                            };
                            let out = forward(&snapshot, chrono::Utc::now().timestamp_millis());
                            match out.to_payload() {
                                Ok(bytes) => {
                                    if let Err(e) = session
                                        .put(channels::WEATHER_INFO_WEAR, ZBytes::from(bytes))
                                        .await
                                    {
                                        log::warn!("Failed to republish snapshot: {}", e);
                                    }
                                }
                                Err(e) => log::warn!("Failed to encode relayed snapshot: {}", e),
                            }
                        }
                        Err(e) => {
                            log::warn!("Relay subscriber closed: {}", e);
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_is_a_pure_projection() {
        let input = WeatherSnapshot {
            low: -2.5,
            high: 7.0,
            image: vec![16, 16, 0xde, 0xad, 0xbe, 0xef],
            timestamp_ms: 1_000,
        };
        let out = forward(&input, 2_000);
        assert_eq!(out.low, input.low);
        assert_eq!(out.high, input.high);
        assert_eq!(out.image, input.image);
        assert_eq!(out.timestamp_ms, 2_000);
    }
}
