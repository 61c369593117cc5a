use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ble_config_common::models::{ServiceCall, UpdateReport};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, TextEncoder, register_histogram,
    register_int_counter_vec,
};
use std::sync::OnceLock;

const METRIC_PREFIX: &str = "ble_config";

/// Metrics 注册结果，可能包含注册错误
type MetricRegistration<T> = Result<T, prometheus::Error>;

fn http_requests_total() -> &'static MetricRegistration<IntCounterVec> {
    static METRIC: OnceLock<MetricRegistration<IntCounterVec>> = OnceLock::new();
    METRIC.get_or_init(|| {
        register_int_counter_vec!(
            Opts::new(
                format!("{METRIC_PREFIX}_http_requests_total"),
                "控制接口 HTTP 请求总数"
            ),
            &["method", "path", "status"]
        )
    })
}

fn updates_total() -> &'static MetricRegistration<IntCounterVec> {
    static METRIC: OnceLock<MetricRegistration<IntCounterVec>> = OnceLock::new();
    METRIC.get_or_init(|| {
        register_int_counter_vec!(
            Opts::new(format!("{METRIC_PREFIX}_updates_total"), "配置更新事件总数"),
            &["outcome"]
        )
    })
}

fn service_calls_total() -> &'static MetricRegistration<IntCounterVec> {
    static METRIC: OnceLock<MetricRegistration<IntCounterVec>> = OnceLock::new();
    METRIC.get_or_init(|| {
        register_int_counter_vec!(
            Opts::new(
                format!("{METRIC_PREFIX}_service_calls_total"),
                "systemctl 调用总数"
            ),
            &["action", "result"]
        )
    })
}

fn config_writes_total() -> &'static MetricRegistration<IntCounterVec> {
    static METRIC: OnceLock<MetricRegistration<IntCounterVec>> = OnceLock::new();
    METRIC.get_or_init(|| {
        register_int_counter_vec!(
            Opts::new(
                format!("{METRIC_PREFIX}_config_writes_total"),
                "配置文件写入次数"
            ),
            &["result"]
        )
    })
}

fn update_duration_seconds() -> &'static MetricRegistration<Histogram> {
    static METRIC: OnceLock<MetricRegistration<Histogram>> = OnceLock::new();
    METRIC.get_or_init(|| {
        register_histogram!(HistogramOpts::new(
            format!("{METRIC_PREFIX}_update_duration_seconds"),
            "单次配置更新耗时（秒，包含 systemctl 阻塞时间）",
        ))
    })
}

fn observe_service_call(call: &ServiceCall) {
    let result = if call.error.is_some() {
        "error"
    } else if call.succeeded() {
        "ok"
    } else {
        "non_zero_exit"
    };
    if let Ok(counter) = service_calls_total() {
        counter
            .with_label_values(&[call.action.as_str(), result])
            .inc();
    }
}

pub fn observe_report(report: &UpdateReport, seconds: f64) {
    if let Ok(counter) = updates_total() {
        counter.with_label_values(&[report.outcome.label()]).inc();
    }
    observe_service_call(&report.stop);
    if let Some(start) = &report.start {
        observe_service_call(start);
    }
    if report.outcome.attempted_write() {
        let result = if report.write_error.is_some() { "error" } else { "ok" };
        if let Ok(counter) = config_writes_total() {
            counter.with_label_values(&[result]).inc();
        }
    }
    if let Ok(histogram) = update_duration_seconds() {
        histogram.observe(seconds);
    }
}

pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().as_str().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "<unmatched>".to_string());

    let response = next.run(req).await;
    let status = response.status().as_u16().to_string();

    if let Ok(counter) = http_requests_total() {
        counter.with_label_values(&[&method, &path, &status]).inc();
    }

    response
}

pub fn render_metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => {
            let mut resp = Response::new(Body::from(buffer));
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_str(encoder.format_type())
                    .unwrap_or_else(|_| HeaderValue::from_static("text/plain; version=0.0.4")),
            );
            resp
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Metrics encoding failed",
            )
                .into_response()
        }
    }
}
