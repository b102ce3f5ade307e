use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};

use remindkun::core::Config;
use remindkun::features::sweep::{next_sleep_duration, sweep, DEFAULT_POLL_INTERVAL};
use remindkun::line::LineClient;
use remindkun::storage::Storage;

/// One scheduler cycle: load the full snapshot, process due reminders,
/// archive the finished ones, save the rest.
async fn run_cycle(storage: &Storage, line: &LineClient, config: &Config) -> Result<()> {
    let reminders = storage.load()?;
    let now = config.now();

    let outcome = sweep(reminders, now, line).await;

    if !outcome.retired.is_empty() {
        info!("Archiving {} completed reminder(s)", outcome.retired.len());
        storage.append_to_archive(outcome.retired, &now.to_rfc3339())?;
    }
    storage.save(&outcome.updated)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting remind-kun scheduler daemon");
    info!(
        "Data: {} | TZ: {} | Adaptive interval: max {}s",
        config.data_dir,
        config.timezone,
        DEFAULT_POLL_INTERVAL.as_secs()
    );

    let storage = Storage::new(&config.data_dir);
    let line = LineClient::new(config.channel_access_token.clone());

    loop {
        // A failed cycle is abandoned; the loop continues on the default
        // interval
        let sleep_duration = match run_cycle(&storage, &line, &config).await {
            Ok(()) => match storage.load() {
                Ok(reminders) => next_sleep_duration(&reminders, config.now()),
                Err(e) => {
                    error!("Error loading reminders: {e:#}");
                    DEFAULT_POLL_INTERVAL
                }
            },
            Err(e) => {
                error!("Error in scheduler cycle: {e:#}");
                DEFAULT_POLL_INTERVAL
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(sleep_duration) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Scheduler stopped");
                break;
            }
        }
    }

    Ok(())
}
