//! Wearable-side services for wristcast.
//!
//! Hosts three cooperating pieces, mirroring the services of the
//! source system:
//! - The relay task republishing `weather_info` under the
//!   watch-face channel
//! - The weather request initiator (discovery-gated token send)
//! - The watch face itself: a terminal renderer with visibility and
//!   ambient states

mod config;
mod relay;
mod requester;
pub mod watchface;

pub use config::Config;
pub use relay::{forward, Relay};
pub use requester::{request_weather, RequestOutcome};

/// Errors from wearable-side tasks.
#[derive(Debug, thiserror::Error)]
pub enum WearError {
    #[error("Bus error: {0}")]
    Bus(#[from] wristcast_bus::BusError),
    #[error("Payload error: {0}")]
    Protocol(#[from] wristcast_protocol::ProtocolError),
}
