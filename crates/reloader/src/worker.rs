use crate::metrics;
use crate::state::AppState;
use ble_config_common::models::UpdateReport;
use ble_config_common::{ConfigSnapshot, ReloaderError};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// 逐个消费快照通知；上一次更新（包括 systemctl 阻塞）结束后才读取下一个
pub async fn run_updates(state: AppState, mut snapshot_rx: watch::Receiver<ConfigSnapshot>) {
    while snapshot_rx.changed().await.is_ok() {
        let snapshot = snapshot_rx.borrow_and_update().clone();
        match apply_snapshot(&state, snapshot).await {
            Ok(report) => {
                log_report(&report);
                *state.last_report.write().await = Some(report);
            }
            Err(err) => error!("configuration update failed: {}", err),
        }
    }
    info!("snapshot channel closed, update worker exiting");
}

/// 执行一次更新；被拒绝的配置同样返回报告（结果为 `Rejected`）
pub async fn apply_snapshot(
    state: &AppState,
    snapshot: ConfigSnapshot,
) -> Result<UpdateReport, ReloaderError> {
    let reloader = state.reloader.clone();
    let started = Instant::now();

    let result = tokio::task::spawn_blocking(move || reloader.update(Some(&snapshot)))
        .await
        .map_err(|err| ReloaderError::Internal(anyhow::anyhow!("update task failed: {}", err)))?;

    let report = match result {
        Ok(report) => report,
        Err(rejected) => {
            warn!(
                update_id = %rejected.report.update_id,
                "configuration update rejected: {}",
                rejected.error
            );
            rejected.report
        }
    };
    metrics::observe_report(&report, started.elapsed().as_secs_f64());
    Ok(report)
}

fn log_report(report: &UpdateReport) {
    let update_id = report.update_id;
    for call in std::iter::once(&report.stop).chain(report.start.as_ref()) {
        if let Some(err) = &call.error {
            error!(%update_id, action = call.action.as_str(), error = %err, "service call failed");
        } else if !call.succeeded() {
            warn!(
                %update_id,
                action = call.action.as_str(),
                exit_code = ?call.exit_code,
                "service manager exited with failure"
            );
        }
    }
    if let Some(err) = &report.write_error {
        error!(%update_id, error = %err, "failed to write transport config");
    }
    info!(%update_id, outcome = report.outcome.label(), "configuration update finished");
}
