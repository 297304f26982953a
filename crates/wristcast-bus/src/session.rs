use std::sync::Arc;

use crate::connection::BusError;

/// Open a zenoh session in client mode.
///
/// Resolution order for the endpoint:
/// 1. `WRISTCAST_ENDPOINT` env var
/// 2. Provided `endpoint` argument
/// 3. Default: `tcp/127.0.0.1:7447`
pub async fn open_session(endpoint: &Option<String>) -> Result<Arc<zenoh::Session>, BusError> {
    let endpoint = std::env::var("WRISTCAST_ENDPOINT")
        .ok()
        .or_else(|| endpoint.clone())
        .unwrap_or_else(|| "tcp/127.0.0.1:7447".to_string());

    log::info!("Connecting to bus at: {}", endpoint);

    let mut config = zenoh::Config::default();
    // Client mode is mandatory; peer mode does not route through the router
    config
        .insert_json5("mode", r#""client""#)
        .map_err(|e| BusError::Config(format!("failed to set mode: {}", e)))?;
    config
        .insert_json5("connect/endpoints", &format!(r#"["{}"]"#, endpoint))
        .map_err(|e| BusError::Config(format!("failed to set endpoint: {}", e)))?;
    // Disable scouting so we only ever reach the configured router
    config
        .insert_json5("scouting/multicast/enabled", "false")
        .map_err(|e| BusError::Config(format!("failed to disable multicast: {}", e)))?;
    config
        .insert_json5("scouting/gossip/enabled", "false")
        .map_err(|e| BusError::Config(format!("failed to disable gossip: {}", e)))?;

    let session = zenoh::open(config).await?;

    log::info!("Connected to bus");
    Ok(Arc::new(session))
}
