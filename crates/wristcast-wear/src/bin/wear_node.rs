use std::path::PathBuf;
use std::sync::Arc;

use argh::FromArgs;

use wristcast_bus::{load_config, setup_shutdown, ConnectionManager};
use wristcast_wear::{watchface, Config, Relay};

#[derive(FromArgs)]
/// Wearable-side relay and watch face for the wristcast bus
struct Args {
    /// path to the configuration file (optional, defaults apply)
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// zenoh router endpoint to connect to
    /// Default: tcp/127.0.0.1:7447 (local zenohd router)
    #[argh(option, short = 'e')]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; the watch face owns stdout.
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let config: Config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            log::info!("No config file specified, using defaults");
            Config::default()
        }
    };

    let (shutdown_tx, shutdown_rx) = setup_shutdown()?;

    // The relay runs on its own session, mirroring the standalone
    // relay service of the source system.
    let relay_manager = Arc::new(ConnectionManager::new(args.endpoint.clone()));
    let relay = Relay::new(relay_manager);
    let relay_handle = tokio::spawn(relay.run(shutdown_tx.subscribe()));

    // The watch face owns its own connection lifecycle (connect on
    // visible, disconnect on invisible).
    let face_manager = Arc::new(ConnectionManager::new(args.endpoint));
    watchface::run(face_manager, config, shutdown_rx).await?;

    // Watch face exited; stop the relay too.
    let _ = shutdown_tx.send(());
    match relay_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::error!("Relay exited with error: {}", e),
        Err(e) => log::error!("Relay task failed: {}", e),
    }

    log::info!("Wearable node shut down, exiting");
    Ok(())
}
