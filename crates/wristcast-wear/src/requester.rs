//! Weather request initiator.
//!
//! Invoked by the watch face's request timer. Sends a `send_weather`
//! token only when the bus connection is already established and a
//! nearby node is discoverable; both missing conditions are silent
//! no-ops, not errors. Repeated invocations send repeated requests;
//! there is no idempotency guard.

use std::time::Duration;

use zenoh::bytes::ZBytes;

use wristcast_bus::{discover_nodes, BusError, ConnectionManager};
use wristcast_protocol::channels::{self, first_nearby};
use wristcast_protocol::RequestToken;

use crate::WearError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Sent,
    NoConnection,
    NoNearbyNode,
}

pub async fn request_weather(
    manager: &ConnectionManager,
    discovery_timeout: Duration,
) -> Result<RequestOutcome, WearError> {
    let Some(session) = manager.current().await else {
        log::debug!("No active bus connection; skipping weather request");
        return Ok(RequestOutcome::NoConnection);
    };

    let nodes = discover_nodes(&session, discovery_timeout).await?;
    let Some(node) = first_nearby(&nodes) else {
        log::debug!("No nearby node; skipping weather request");
        return Ok(RequestOutcome::NoNearbyNode);
    };

    let payload = RequestToken::send_weather().to_payload()?;
    session
        .put(channels::ACK, ZBytes::from(payload))
        .await
        .map_err(BusError::Zenoh)?;
    log::debug!("Weather request sent towards {}", node.id);
    Ok(RequestOutcome::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_connection_is_a_silent_noop() {
        let manager = ConnectionManager::new(None);
        let outcome = request_weather(&manager, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(outcome, RequestOutcome::NoConnection);
    }
}
