//! Bus plumbing shared by the phone and wearable daemons.
//!
//! Wraps the zenoh session lifecycle behind a connection manager with a
//! bounded connect wait, advertises node presence through liveliness
//! tokens, and carries the scaffolding every daemon needs (signal
//! handling, YAML config loading).

mod config;
mod connection;
mod discovery;
mod session;
mod shutdown;

pub use config::load_config;
pub use connection::{BusError, ConnectionManager, DEFAULT_CONNECT_TIMEOUT};
pub use discovery::{declare_presence, discover_nodes};
pub use session::open_session;
pub use shutdown::setup_shutdown;
