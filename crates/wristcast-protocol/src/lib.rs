//! Shared protocol types for wristcast nodes.
//!
//! Every process on the bus depends on this crate for:
//! - Channel key constants and presence-key parsing
//! - The `WeatherSnapshot` and `RequestToken` payloads (JSON on the wire)
//! - The 1-bit `IconBitmap` blob format carried in snapshots

pub mod channels;
mod icon;
mod payload;

pub use channels::Node;
pub use icon::{IconBitmap, IconError};
pub use payload::{ProtocolError, RequestToken, WeatherSnapshot};
