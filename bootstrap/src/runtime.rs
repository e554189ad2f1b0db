//! 运行时初始化

use dbfault_config::AppConfig;
use dbfault_telemetry::{init_tracing, init_tracing_json};
use tracing::info;

use crate::BootstrapResult;

/// 运行时配置
pub struct RuntimeConfig {
    pub config_dir: String,
    /// 是否安装 Prometheus recorder
    pub enable_metrics: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_dir: "config".to_string(),
            enable_metrics: true,
        }
    }
}

/// 是否输出 JSON 日志：显式开启或生产环境
pub fn use_json_logs(config: &AppConfig) -> bool {
    config.telemetry.json_logs || config.is_production()
}

/// 初始化 tracing
pub fn init_runtime(config: &AppConfig) -> BootstrapResult<()> {
    if use_json_logs(config) {
        init_tracing_json(&config.telemetry.log_level)?;
    } else {
        init_tracing(&config.telemetry.log_level)?;
    }

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Runtime initialized"
    );
    Ok(())
}
