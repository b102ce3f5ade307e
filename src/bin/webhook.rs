use anyhow::Result;
use dotenvy::dotenv;
use log::info;
use std::sync::Arc;

use remindkun::core::Config;
use remindkun::webhook::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting remind-kun webhook server...");
    info!("Data: {} | TZ: {}", config.data_dir, config.timezone);

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));
    let app = webhook::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
