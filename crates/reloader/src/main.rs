mod api;
mod error;
mod metrics;
mod state;
mod worker;

use crate::state::AppState;
use anyhow::{Context, Result};
use ble_config_common::config::AppConfig;
use ble_config_common::{
    ConfigFileWriter, ConfigReloader, ConfigSnapshot, DeviceNameProvider, HostnameProvider,
    PropertyResolver, SnapshotStore, StaticDeviceName, SystemctlController,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;
    std::fs::create_dir_all(&config.base_dir)
        .with_context(|| format!("failed to create {}", config.base_dir.display()))?;

    let device: Arc<dyn DeviceNameProvider> = match &config.device_name {
        Some(name) => Arc::new(StaticDeviceName(name.clone())),
        None => Arc::new(HostnameProvider::default()),
    };
    let controller = Arc::new(SystemctlController::new(
        config.systemctl_bin.clone(),
        config.log_path(),
    ));
    let reloader = ConfigReloader::new(
        config.service_name.clone(),
        PropertyResolver::new(device),
        ConfigFileWriter::new(config.config_path()),
        controller,
    )
    .with_write_failure_policy(config.write_failure_policy);

    let (snapshots, snapshot_rx) = SnapshotStore::new(ConfigSnapshot::default());
    let state = AppState {
        snapshots: snapshots.clone(),
        reloader,
        last_report: Arc::new(RwLock::new(None)),
    };

    let worker_task = tokio::spawn(worker::run_updates(state.clone(), snapshot_rx));

    info!(
        service = %config.service_name,
        config_path = %config.config_path().display(),
        policy = ?config.write_failure_policy,
        "configuration reloader started"
    );

    if let Some(path) = &config.properties_file {
        match load_properties(path) {
            Ok(snapshot) => {
                info!("applying start-up properties from {}", path.display());
                snapshots.apply(snapshot).await;
            }
            Err(err) => warn!("ignoring start-up properties: {:#}", err),
        }
    }

    let control_addr = config.control_addr.clone();
    let api_state = state.clone();
    let api_task = tokio::spawn(async move {
        let app = api::router(api_state);
        match tokio::net::TcpListener::bind(&control_addr).await {
            Ok(listener) => {
                info!("control api listening on {}", control_addr);
                if let Err(err) = axum::serve(listener, app).await {
                    warn!("control api exited: {}", err);
                }
            }
            Err(err) => warn!("failed to bind control api: {}", err),
        }
    });

    tokio::select! {
        _ = api_task => {},
        _ = worker_task => {},
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
        }
    }

    Ok(())
}

fn load_properties(path: &std::path::Path) -> Result<ConfigSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON object of scalar properties", path.display()))?;
    Ok(snapshot)
}
