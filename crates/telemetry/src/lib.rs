//! telemetry - 可观测性库
//!
//! 插件可能被宿主多次注册，所以这里的初始化函数都允许重复调用

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 调用计数（按方法与结果分组）
pub const METRIC_INVOCATIONS_TOTAL: &str = "app_limiter_invocations_total";
/// 调用耗时
pub const METRIC_INVOCATION_DURATION_MS: &str = "app_limiter_invocation_duration_ms";
/// 执行层推送计数（按目标与结果分组）
pub const METRIC_ENFORCEMENT_PUSHES_TOTAL: &str = "app_limiter_enforcement_pushes_total";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to install Prometheus recorder: {0}")]
    Metrics(String),
}

/// 初始化 tracing
///
/// 已存在全局 subscriber 时返回 false
pub fn init_tracing(log_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok()
}

/// 初始化 Prometheus metrics
pub fn init_metrics() -> Result<PrometheusHandle, TelemetryError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;

    metrics::describe_counter!(
        METRIC_INVOCATIONS_TOTAL,
        "Boundary method invocations by method and outcome"
    );
    metrics::describe_histogram!(
        METRIC_INVOCATION_DURATION_MS,
        "Boundary method latency in milliseconds"
    );
    metrics::describe_counter!(
        METRIC_ENFORCEMENT_PUSHES_TOTAL,
        "Enforcement store pushes by target and outcome"
    );

    Ok(handle)
}
