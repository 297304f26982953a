//! Bus payloads: the weather request token and the weather snapshot.
//!
//! Both are JSON documents. The snapshot's `image` field is an
//! [`IconBitmap`](crate::IconBitmap) wire blob, hex-encoded so it can
//! ride inside JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Icon error: {0}")]
    Icon(#[from] crate::IconError),
}

/// The single recognized request token value.
const SEND_WEATHER: &str = "send_weather";

/// A weather request: one payload key, one recognized value.
///
/// Carries no further state; it is only a trigger. Receivers ignore
/// tokens with any other value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestToken {
    pub ack: String,
}

impl RequestToken {
    pub fn send_weather() -> Self {
        Self {
            ack: SEND_WEATHER.to_string(),
        }
    }

    pub fn is_send_weather(&self) -> bool {
        self.ack == SEND_WEATHER
    }

    pub fn to_payload(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_payload(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// A published weather summary: immutable once on the bus, superseded
/// only by a snapshot with a newer timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub low: f64,
    pub high: f64,
    #[serde(with = "hex_blob")]
    pub image: Vec<u8>,
    /// Publish time, epoch milliseconds.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
}

impl WeatherSnapshot {
    pub fn to_payload(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_payload(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

mod hex_blob {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_recognizes_send_weather() {
        let token = RequestToken::send_weather();
        assert!(token.is_send_weather());
        let other = RequestToken {
            ack: "refresh_calendar".to_string(),
        };
        assert!(!other.is_send_weather());
    }

    #[test]
    fn token_wire_field_is_ack() {
        let bytes = RequestToken::send_weather().to_payload().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["ack"], "send_weather");
    }

    #[test]
    fn snapshot_round_trip_preserves_image_bytes() {
        let snapshot = WeatherSnapshot {
            low: 10.0,
            high: 25.0,
            image: vec![0x01, 0x02, 0xff, 0x00],
            timestamp_ms: 1_754_000_000_000,
        };
        let bytes = snapshot.to_payload().unwrap();
        let back = WeatherSnapshot::from_payload(&bytes).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn snapshot_wire_fields_match_channel_contract() {
        let snapshot = WeatherSnapshot {
            low: -3.5,
            high: 4.0,
            image: vec![0xab],
            timestamp_ms: 42,
        };
        let value: serde_json::Value =
            serde_json::from_slice(&snapshot.to_payload().unwrap()).unwrap();
        assert_eq!(value["low"], -3.5);
        assert_eq!(value["high"], 4.0);
        assert_eq!(value["image"], "ab");
        assert_eq!(value["timestamp"], 42);
    }

    #[test]
    fn snapshot_rejects_bad_hex() {
        let raw = br#"{"low":1.0,"high":2.0,"image":"zz","timestamp":1}"#;
        assert!(WeatherSnapshot::from_payload(raw).is_err());
    }
}
