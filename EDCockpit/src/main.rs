mod logging;
mod observer;

use anyhow::Result;
use edconfig::{Config, get_config};
use edlink::{EdlaClient, GameLink, LinkConfigExt, LinkHandle, TelemetryState};
use edradio::{MetadataScheduler, RadioConfigExt, StationStates, configured_stations};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Optional timeout from a `*_request_timeout_ms` setting
fn timeout_from_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn start_link(config: &Config, telemetry: TelemetryState) -> Result<LinkHandle> {
    let mut builder = EdlaClient::builder()
        .base_url(config.get_link_base_url()?)
        .challenge_route(config.get_link_challenge_route()?);
    if let Some(timeout) = timeout_from_ms(config.get_link_request_timeout_ms()?) {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;
    info!(base_url = client.base_url(), "Linking to companion server");

    let probe_interval = Duration::from_millis(config.get_link_probe_interval_ms()?);
    Ok(GameLink::new(Arc::new(client), telemetry)
        .with_probe_interval(probe_interval)
        .spawn())
}

fn start_radio(config: &Config, scheduler: &mut MetadataScheduler) -> Result<usize> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout_from_ms(config.get_radio_request_timeout_ms()?) {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    Ok(scheduler.start_all(configured_stations(&client, config)?))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = get_config();
    logging::init_logging(&config);

    if let Some(dir) = config.directory() {
        info!(config_dir = dir, "EDCockpit starting");
    }

    // ========== Game telemetry ==========
    let telemetry = TelemetryState::new();
    let link = if config.get_link_enabled()? {
        Some(start_link(&config, telemetry.clone())?)
    } else {
        info!("Game link disabled");
        None
    };

    // ========== Radio metadata ==========
    let stations = StationStates::new();
    let mut scheduler = MetadataScheduler::new(stations.clone())
        .with_min_refresh(Duration::from_millis(config.get_radio_min_refresh_ms()?));
    if config.get_radio_enabled()? {
        let started = start_radio(&config, &mut scheduler)?;
        info!(stations = started, "Radio metadata scheduler started");
    } else {
        info!("Radio metadata disabled");
    }

    let observers = observer::spawn_observers(&telemetry, &stations);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    for observer in &observers {
        observer.abort();
    }
    scheduler.abort_all();
    if let Some(link) = link {
        link.abort();
        link.wait().await?;
    }

    Ok(())
}
