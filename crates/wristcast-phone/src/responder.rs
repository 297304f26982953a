//! The fetch-and-push responder.
//!
//! Subscribes to the ack channel and answers every `send_weather`
//! token with one publish attempt on `weather_info`. There is no
//! request de-duplication: duplicate tokens each trigger a fresh
//! fetch-and-publish cycle. All failures are logged and dropped; the
//! next request starts clean.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use zenoh::bytes::ZBytes;

use wristcast_bus::{BusError, ConnectionManager, DEFAULT_CONNECT_TIMEOUT};
use wristcast_protocol::{channels, ProtocolError, RequestToken, WeatherSnapshot};

use crate::art::{art_for_condition, resolve_art, ArtKind};
use crate::config::Config;
use crate::store::{StoreError, WeatherStore};

#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Payload error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("weather store lock poisoned")]
    StoreLock,
}

/// Today's day key in the local timezone, `YYYY-MM-DD`.
pub fn today_day_key() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub struct Responder {
    manager: Arc<ConnectionManager>,
    // rusqlite's Connection is Send but not Sync; lock briefly, never
    // across an await point.
    store: Mutex<WeatherStore>,
    http: reqwest::Client,
    location: String,
    art_base_url: String,
    art_timeout: Duration,
}

impl Responder {
    pub fn new(
        manager: Arc<ConnectionManager>,
        store: WeatherStore,
        http: reqwest::Client,
        config: &Config,
    ) -> Self {
        Self {
            manager,
            store: Mutex::new(store),
            http,
            location: config.location.clone(),
            art_base_url: config.art_base_url.clone(),
            art_timeout: Duration::from_secs(config.art_fetch_timeout_secs),
        }
    }

    /// Main loop. Blocks until the shutdown signal fires.
    pub async fn run(self, mut shutdown: watch::Receiver<()>) -> Result<(), ResponderError> {
        let session = self.manager.connect(DEFAULT_CONNECT_TIMEOUT).await?;
        let subscriber = session
            .declare_subscriber(channels::ACK)
            .await
            .map_err(BusError::Zenoh)?;
        log::info!("Listening for weather requests on {}", channels::ACK);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    log::info!("Responder shutting down");
                    break;
                }
                sample = subscriber.recv_async() => {
                    match sample {
                        Ok(sample) => {
                            let payload = sample.payload().to_bytes();
                            self.handle_request(&payload).await;
                        }
                        Err(e) => {
                            log::warn!("Request subscriber closed: {}", e);
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle_request(&self, payload: &[u8]) {
        let token = match RequestToken::from_payload(payload) {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Undecodable request token: {}", e);
                return;
            }
        };
        log::debug!("Message received: {:?}", token);
        if !token.is_send_weather() {
            log::debug!("Ignoring unrecognized token value: {}", token.ack);
            return;
        }
        match self.fetch_and_publish().await {
            Ok(true) => log::debug!("Weather data sent"),
            Ok(false) => log::debug!("No weather record for today; nothing sent"),
            Err(e) => log::error!("Weather data not sent: {}", e),
        }
    }

    /// One full cycle: query, resolve art, publish. Returns whether a
    /// snapshot was published.
    pub async fn fetch_and_publish(&self) -> Result<bool, ResponderError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let snapshot = match self.prepare_snapshot(now_ms).await? {
            Some(snapshot) => snapshot,
            None => return Ok(false),
        };
        let payload = snapshot.to_payload()?;
        self.manager
            .with_connection(DEFAULT_CONNECT_TIMEOUT, move |session| async move {
                session
                    .put(channels::WEATHER_INFO, ZBytes::from(payload))
                    .await?;
                Ok(())
            })
            .await?;
        Ok(true)
    }

    /// Build the snapshot for today's record, if one exists.
    pub async fn prepare_snapshot(
        &self,
        now_ms: i64,
    ) -> Result<Option<WeatherSnapshot>, ResponderError> {
        let day = today_day_key();
        let record = {
            let store = self.store.lock().map_err(|_| ResponderError::StoreLock)?;
            store.for_day(&self.location, &day)?
        };
        let Some(record) = record else {
            return Ok(None);
        };

        let kind = match art_for_condition(record.condition_id) {
            Some(kind) => kind,
            None => {
                log::debug!(
                    "No art mapping for condition {}; defaulting to clear",
                    record.condition_id
                );
                ArtKind::Clear
            }
        };
        let image = resolve_art(&self.http, &self.art_base_url, kind, self.art_timeout).await;

        Ok(Some(WeatherSnapshot {
            low: record.min_temp,
            high: record.max_temp,
            image,
            timestamp_ms: now_ms,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WeatherRecord;

    fn make_responder(config: Config) -> (tempfile::TempDir, Responder) {
        let dir = tempfile::tempdir().unwrap();
        let store = WeatherStore::open(&dir.path().join("weather.db")).unwrap();
        let manager = Arc::new(ConnectionManager::new(None));
        let http = reqwest::Client::builder().build().unwrap();
        let responder = Responder::new(manager, store, http, &config);
        (dir, responder)
    }

    fn seed(responder: &Responder, location: &str, record: &WeatherRecord) {
        let store = responder.store.lock().unwrap();
        store.upsert(&today_day_key(), location, record).unwrap();
    }

    #[tokio::test]
    async fn snapshot_carries_record_temps_and_publish_time() {
        let (_dir, responder) = make_responder(Config::default());
        seed(
            &responder,
            "94043",
            &WeatherRecord {
                condition_id: 200,
                max_temp: 25.0,
                min_temp: 10.0,
            },
        );

        let snapshot = responder.prepare_snapshot(1234).await.unwrap().unwrap();
        assert_eq!(snapshot.low, 10.0);
        assert_eq!(snapshot.high, 25.0);
        assert_eq!(snapshot.timestamp_ms, 1234);
        assert!(!snapshot.image.is_empty());
        assert_eq!(snapshot.image, ArtKind::Storm.asset().to_vec());
    }

    #[tokio::test]
    async fn missing_record_yields_no_snapshot() {
        let (_dir, responder) = make_responder(Config::default());
        assert!(responder.prepare_snapshot(1234).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_for_other_location_is_ignored() {
        let (_dir, responder) = make_responder(Config::default());
        seed(
            &responder,
            "10001",
            &WeatherRecord {
                condition_id: 800,
                max_temp: 20.0,
                min_temp: 5.0,
            },
        );
        assert!(responder.prepare_snapshot(1234).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_remote_fetch_falls_back_to_bundled_asset() {
        let config = Config {
            art_base_url: "http://127.0.0.1:1/art".to_string(),
            art_fetch_timeout_secs: 1,
            ..Config::default()
        };
        let (_dir, responder) = make_responder(config);
        seed(
            &responder,
            "94043",
            &WeatherRecord {
                condition_id: 500,
                max_temp: 18.0,
                min_temp: 12.0,
            },
        );

        let snapshot = responder.prepare_snapshot(99).await.unwrap().unwrap();
        assert_eq!(snapshot.image, ArtKind::Rain.asset().to_vec());
    }

    #[tokio::test]
    async fn unknown_condition_defaults_to_clear_art() {
        let (_dir, responder) = make_responder(Config::default());
        seed(
            &responder,
            "94043",
            &WeatherRecord {
                condition_id: 950,
                max_temp: 15.0,
                min_temp: 7.0,
            },
        );

        let snapshot = responder.prepare_snapshot(7).await.unwrap().unwrap();
        assert_eq!(snapshot.image, ArtKind::Clear.asset().to_vec());
    }
}
