use ble_config_common::models::UpdateReport;
use ble_config_common::{ConfigReloader, SnapshotStore};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotStore,
    pub reloader: ConfigReloader,
    pub last_report: Arc<RwLock<Option<UpdateReport>>>,
}
