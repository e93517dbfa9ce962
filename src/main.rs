use launchwatch::config::WatchConfig;
use launchwatch::logging;
use launchwatch::module::launches::{LaunchApiClient, LaunchCoordinator, LaunchSensor};

use anyhow::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = WatchConfig::from_file("config.toml")?;

    // Initialize logging
    let _logging_guard = logging::init_logging("logs", "launchwatch", &config.log_level);

    tracing::info!("Launchwatch starting...");
    tracing::info!(
        "Monitoring {} station(s), refresh every {}s, fetch timeout {}s",
        config.stations.len(),
        config.refresh_interval_secs,
        config.fetch_timeout_secs
    );

    // One coordinator per configured station; each owns its own client and
    // cache, so stations poll independently.
    let mut coordinators: Vec<Arc<LaunchCoordinator>> = Vec::new();
    for station in &config.stations {
        let mut client = LaunchApiClient::new(config.fetch_timeout());
        if let Some(url) = &config.api_url {
            client = client.with_endpoint(url.clone());
        }

        let coordinator = LaunchCoordinator::new(station.clone(), Arc::new(client));
        coordinator.start_periodic(config.refresh_interval()).await;

        log_current_state(&coordinator).await;
        spawn_state_logger(coordinator.clone());

        coordinators.push(coordinator);
    }
    tracing::info!("All coordinators started");

    // Keep the program running
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received.");

    for coordinator in &coordinators {
        coordinator.stop();
    }

    Ok(())
}

async fn log_current_state(coordinator: &Arc<LaunchCoordinator>) {
    let sensor = LaunchSensor::new(coordinator.station());
    let entry = coordinator.get_cached().await;
    let (state, _attributes) = sensor.render(&entry);

    match &entry.last_error {
        Some(err) => tracing::warn!("{}: initial refresh failed ({})", sensor.name(), err),
        None => tracing::info!("{}: state {}", sensor.name(), state),
    }
}

/// Log every subsequent refresh outcome for one station.
fn spawn_state_logger(coordinator: Arc<LaunchCoordinator>) {
    let sensor = LaunchSensor::new(coordinator.station());
    let mut updates = coordinator.subscribe();

    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let entry = coordinator.get_cached().await;
            let (state, attributes) = sensor.render(&entry);

            match &entry.last_error {
                Some(err) => tracing::warn!(
                    "{}: refresh failed ({}), state stays {}",
                    sensor.name(),
                    err,
                    state
                ),
                None => tracing::info!(
                    "{}: state {} ({} attributes)",
                    sensor.name(),
                    state,
                    attributes.len()
                ),
            }
        }
    });
}
