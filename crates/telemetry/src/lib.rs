//! telemetry - 日志与指标初始化
//!
//! 翻译器只通过 `tracing` 与 `metrics` 门面输出，由这里安装具体的 subscriber 与 recorder。

use dbfault_ports::{REJECTIONS_TOTAL, TRANSLATIONS_TOTAL};
use metrics::{Unit, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),

    #[error("failed to install Prometheus recorder: {0}")]
    Recorder(String),
}

/// 日志过滤器：`RUST_LOG` 优先，否则使用给定级别
pub fn env_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    parse_filter(log_level)
}

fn parse_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(log_level).map_err(|e| TelemetryError::InvalidFilter {
        filter: log_level.to_string(),
        message: e.to_string(),
    })
}

/// 初始化 tracing
pub fn init_tracing(log_level: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter(log_level)?)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter(log_level)?)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))
}

/// 初始化 Prometheus metrics 并登记翻译相关指标的说明
pub fn init_metrics() -> Result<PrometheusHandle, TelemetryError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::Recorder(e.to_string()))?;
    describe_translation_metrics();
    Ok(handle)
}

pub fn describe_translation_metrics() {
    describe_counter!(
        TRANSLATIONS_TOTAL,
        Unit::Count,
        "Database errors translated into classified exceptions"
    );
    describe_counter!(
        REJECTIONS_TOTAL,
        Unit::Count,
        "Errors a translator declined because they belong to another dialect"
    );
}
