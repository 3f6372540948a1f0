mod config;
mod server;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use log::info;
use tokio::sync::oneshot;

use crate::config::Config;
use crate::server::{run_server, LockoutGuard};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env();
    info!(
        "lockdash starting: {} attempts before a {}s lockout",
        config.max_attempts,
        config.lockout_duration.as_secs()
    );

    let guard = Arc::new(Mutex::new(LockoutGuard::new(&config)));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    run_server(config.port, guard, shutdown_rx).await
}
