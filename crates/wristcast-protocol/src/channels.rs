//! Channel key expressions shared by all wristcast processes.
//!
//! Zenoh key expressions forbid empty chunks, so none of these carry a
//! leading slash.

/// Inbound weather request tokens (wearable -> phone).
pub const ACK: &str = "sunshine_watch/ack";

/// Weather snapshots published by the phone-side responder.
pub const WEATHER_INFO: &str = "weather_info";

/// Re-published snapshots consumed by the watch face.
pub const WEATHER_INFO_WEAR: &str = "weather_info/wear";

/// Liveliness tokens advertising reachable nodes.
pub const PRESENCE_ALL: &str = "wristcast/presence/**";

const PRESENCE_PREFIX: &str = "wristcast/presence";

/// Reach segment for nodes with low-latency direct connectivity.
pub const REACH_DIRECT: &str = "direct";

/// Reach segment for nodes only reachable through a cloud relay.
pub const REACH_CLOUD: &str = "cloud";

/// A reachable companion node, parsed from its presence key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub nearby: bool,
}

/// Build the presence key for a node: `wristcast/presence/{reach}/{id}`.
pub fn presence_key(reach: &str, node_id: &str) -> String {
    format!("{}/{}/{}", PRESENCE_PREFIX, reach, node_id)
}

/// Parse a presence key expression back into a [`Node`].
///
/// Returns `None` for keys outside the presence namespace or with an
/// unknown reach segment.
pub fn parse_presence_key(key: &str) -> Option<Node> {
    let rest = key.strip_prefix(PRESENCE_PREFIX)?.strip_prefix('/')?;
    let (reach, id) = rest.split_once('/')?;
    let nearby = match reach {
        REACH_DIRECT => true,
        REACH_CLOUD => false,
        _ => return None,
    };
    if id.is_empty() {
        return None;
    }
    Some(Node {
        id: id.to_string(),
        nearby,
    })
}

/// Pick the first nearby node, if any. The set is unordered; no
/// prioritization beyond the nearby filter.
pub fn first_nearby(nodes: &[Node]) -> Option<&Node> {
    nodes.iter().find(|n| n.nearby)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_key_round_trip() {
        let key = presence_key(REACH_DIRECT, "pixel_7");
        assert_eq!(key, "wristcast/presence/direct/pixel_7");
        let node = parse_presence_key(&key).unwrap();
        assert_eq!(node.id, "pixel_7");
        assert!(node.nearby);
    }

    #[test]
    fn cloud_nodes_are_not_nearby() {
        let node = parse_presence_key("wristcast/presence/cloud/tablet").unwrap();
        assert!(!node.nearby);
    }

    #[test]
    fn rejects_foreign_keys() {
        assert!(parse_presence_key("weather_info").is_none());
        assert!(parse_presence_key("wristcast/presence/bluetooth/x").is_none());
        assert!(parse_presence_key("wristcast/presence/direct/").is_none());
    }

    #[test]
    fn first_nearby_skips_cloud_nodes() {
        let nodes = vec![
            Node {
                id: "far".into(),
                nearby: false,
            },
            Node {
                id: "near".into(),
                nearby: true,
            },
            Node {
                id: "also_near".into(),
                nearby: true,
            },
        ];
        assert_eq!(first_nearby(&nodes).unwrap().id, "near");
        assert!(first_nearby(&nodes[..1]).is_none());
    }
}
