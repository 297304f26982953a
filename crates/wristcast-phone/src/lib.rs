//! Phone-side weather responder for wristcast.
//!
//! Listens for request tokens on the ack channel and answers each one
//! with a freshly built weather snapshot on `weather_info`:
//! - Today's record comes from the local SQLite weather store
//! - The condition icon is fetched remotely with a bounded wait,
//!   falling back to a bundled bitmap asset

pub mod art;
mod config;
mod responder;
mod store;

pub use art::{art_for_condition, fetch_remote_art, resolve_art, ArtFetchError, ArtKind};
pub use config::Config;
pub use responder::{today_day_key, Responder, ResponderError};
pub use store::{StoreError, WeatherRecord, WeatherStore};
