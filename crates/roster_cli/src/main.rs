//! Roster server entry point.
//!
//! # Responsibility
//! - Load `.env`, read `ROSTER_*` configuration and start logging.
//! - Open the store and serve HTTP until Ctrl-C.

use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;
use roster_core::init_logging;
use roster_http::{serve, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the process environment still applies.
    dotenv().ok();

    let config = ServerConfig::from_env().context("invalid roster configuration")?;
    init_logging(&config.log_level, config.log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;
    info!(
        "event=server_start module=cli status=start version={} bind={}",
        roster_core::core_version(),
        config.bind
    );

    let conn = config
        .db
        .open()
        .with_context(|| format!("failed to open roster store {:?}", config.db))?;
    serve(config.bind, AppState::new(conn))
        .await
        .context("roster server failed")?;

    info!("event=server_stop module=cli status=ok");
    Ok(())
}
