use std::path::PathBuf;
use std::sync::Arc;

use argh::FromArgs;

use wristcast_bus::{
    declare_presence, load_config, setup_shutdown, ConnectionManager, DEFAULT_CONNECT_TIMEOUT,
};
use wristcast_phone::{today_day_key, Config, Responder, WeatherRecord, WeatherStore};

#[derive(FromArgs)]
/// Phone-side weather responder for the wristcast bus
struct Args {
    /// path to the configuration file (optional, defaults apply)
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// zenoh router endpoint to connect to
    /// Default: tcp/127.0.0.1:7447 (local zenohd router)
    #[argh(option, short = 'e')]
    endpoint: Option<String>,

    /// seed today's weather record as "condition_id,max,min" and exit
    #[argh(option)]
    seed: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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

    let db_path = config.resolved_db_path();

    if let Some(spec) = &args.seed {
        return seed_record(&db_path, &config.location, spec);
    }

    let (_shutdown_tx, shutdown_rx) = setup_shutdown()?;

    let manager = Arc::new(ConnectionManager::new(args.endpoint));
    let session = manager.connect(DEFAULT_CONNECT_TIMEOUT).await?;
    let _presence = declare_presence(&session, &config.resolved_node_id(), config.nearby).await?;

    let store = WeatherStore::open(&db_path)?;
    let http = reqwest::Client::builder().build()?;

    let responder = Responder::new(manager, store, http, &config);
    responder.run(shutdown_rx).await?;

    log::info!("Responder shut down, exiting");
    Ok(())
}

/// Insert today's record directly into the store. Stands in for the
/// weather sync pipeline that fills this table in the full system.
fn seed_record(db_path: &std::path::Path, location: &str, spec: &str) -> anyhow::Result<()> {
    let parts: Vec<&str> = spec.split(',').collect();
    if parts.len() != 3 {
        anyhow::bail!("seed expects \"condition_id,max,min\", got '{}'", spec);
    }
    let record = WeatherRecord {
        condition_id: parts[0].trim().parse()?,
        max_temp: parts[1].trim().parse()?,
        min_temp: parts[2].trim().parse()?,
    };

    let store = WeatherStore::open(db_path)?;
    let day = today_day_key();
    store.upsert(&day, location, &record)?;
    log::info!(
        "Seeded {} at {}: condition={} max={} min={}",
        day,
        location,
        record.condition_id,
        record.max_temp,
        record.min_temp
    );
    Ok(())
}
