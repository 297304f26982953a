//! Node presence and discovery over zenoh liveliness tokens.
//!
//! Each daemon declares a token under `wristcast/presence/{reach}/{id}`
//! for as long as it is up. Discovery queries the presence namespace
//! and parses the reach segment; no payloads involved.

use std::time::Duration;

use zenoh::liveliness::LivelinessToken;
use zenoh::Session;

use wristcast_protocol::channels::{self, parse_presence_key, presence_key};
use wristcast_protocol::Node;

use crate::connection::BusError;

/// Advertise this node on the bus. The token lives until dropped or
/// the session closes.
pub async fn declare_presence(
    session: &Session,
    node_id: &str,
    nearby: bool,
) -> Result<LivelinessToken, BusError> {
    let reach = if nearby {
        channels::REACH_DIRECT
    } else {
        channels::REACH_CLOUD
    };
    let key = presence_key(reach, node_id);
    log::info!("Declaring presence: {}", key);
    let token = session.liveliness().declare_token(key).await?;
    Ok(token)
}

/// Query the presence namespace and collect every reachable node.
///
/// The returned set is unordered. Keys that don't parse as presence
/// entries are skipped.
pub async fn discover_nodes(session: &Session, timeout: Duration) -> Result<Vec<Node>, BusError> {
    let replies = session
        .liveliness()
        .get(channels::PRESENCE_ALL)
        .timeout(timeout)
        .await?;

    let mut nodes = Vec::new();
    while let Ok(reply) = replies.recv_async().await {
        if let Ok(sample) = reply.result() {
            match parse_presence_key(sample.key_expr().as_str()) {
                Some(node) => nodes.push(node),
                None => log::debug!("Ignoring foreign presence key: {}", sample.key_expr()),
            }
        }
    }
    log::debug!("Discovered {} node(s)", nodes.len());
    Ok(nodes)
}
