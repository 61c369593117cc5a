use crate::error::AppError;
use crate::metrics;
use crate::state::AppState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, middleware};
use ble_config_common::models::UpdateReport;
use ble_config_common::render::render;
use ble_config_common::{ConfigSnapshot, Resolution, TransportSettings};
use serde_json::{Value as JsonValue, json};
use tower_http::trace::TraceLayer;

type ApiResult<T> = std::result::Result<T, AppError>;

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/api/v1/config", get(get_config).put(put_config))
        .route("/api/v1/config/preview", post(preview_config))
        .route("/api/v1/config/rendered", get(get_rendered))
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/metrics", get(get_metrics))
        .layer(middleware::from_fn(metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn parse_snapshot(payload: Result<Json<ConfigSnapshot>, JsonRejection>) -> ApiResult<ConfigSnapshot> {
    payload
        .map(|Json(snapshot)| snapshot)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigSnapshot> {
    Json(state.snapshots.current().await)
}

async fn put_config(
    State(state): State<AppState>,
    payload: Result<Json<ConfigSnapshot>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JsonValue>)> {
    let snapshot = parse_snapshot(payload)?;
    let properties = snapshot.len();
    state.snapshots.apply(snapshot).await;
    tracing::info!(properties, "configuration update queued");
    Ok((StatusCode::ACCEPTED, Json(json!({"queued": true}))))
}

async fn preview_config(
    State(state): State<AppState>,
    payload: Result<Json<ConfigSnapshot>, JsonRejection>,
) -> ApiResult<Json<JsonValue>> {
    let snapshot = parse_snapshot(payload)?;
    match state.reloader.resolver().resolve(Some(&snapshot))? {
        Resolution::Skip(reason) => Ok(Json(json!({"skipped": reason}))),
        Resolution::Resolved(config) => Ok(Json(json!({
            "path": state.reloader.writer().path(),
            "contents": render(&config),
        }))),
    }
}

async fn get_rendered(State(state): State<AppState>) -> ApiResult<Json<TransportSettings>> {
    let path = state.reloader.writer().path();
    if !path.exists() {
        return Err(AppError::NotFound(format!("{} not written yet", path.display())));
    }
    Ok(Json(TransportSettings::load(path)?))
}

async fn get_status(State(state): State<AppState>) -> ApiResult<Json<UpdateReport>> {
    state
        .last_report
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no update processed yet".to_string()))
}

async fn get_metrics() -> axum::response::Response {
    metrics::render_metrics()
}
