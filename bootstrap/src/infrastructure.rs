//! 翻译基础设施
//!
//! 按配置构建翻译器并注册到注册表，供调用方按方言名取用

use std::sync::Arc;

use dbfault_adapter_postgres::{POSTGRES_ALIASES, PostgresErrorTranslator, TranslatorSettings};
use dbfault_config::{AppConfig, TranslatorConfig};
use dbfault_ports::{ErrorTranslator, TranslatorRegistry};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use crate::{BootstrapResult, RuntimeConfig, init_runtime};

/// 配置 -> PostgreSQL 翻译器设置
pub fn translator_settings(config: &TranslatorConfig) -> TranslatorSettings {
    TranslatorSettings::new()
        .with_dialect(config.dialect.trim())
        .with_primary_key_prefix(config.primary_key_prefix.clone())
        .with_rule_input_logging(config.log_rule_inputs)
}

/// 注册全部内置翻译器
///
/// PostgreSQL 翻译器以内置别名和配置中的方言名同时注册。
pub fn build_registry(config: &AppConfig) -> TranslatorRegistry {
    let settings = translator_settings(&config.translator);
    let translator: Arc<dyn ErrorTranslator> = Arc::new(PostgresErrorTranslator::new(settings));

    let mut registry = TranslatorRegistry::new();
    registry.register(POSTGRES_ALIASES.iter().copied(), Arc::clone(&translator));
    registry.register([config.translator.dialect.as_str()], translator);
    registry
}

/// 翻译基础设施容器
pub struct Infrastructure {
    config: AppConfig,
    registry: TranslatorRegistry,
    metrics: Option<PrometheusHandle>,
}

impl Infrastructure {
    /// 只构建注册表，不触碰全局 subscriber / recorder
    pub fn from_config(config: AppConfig) -> Self {
        let registry = build_registry(&config);
        info!(dialects = ?registry.dialects(), "Error translators registered");
        Self {
            config,
            registry,
            metrics: None,
        }
    }

    /// 完整启动：加载配置、初始化日志与指标、构建注册表
    pub fn start(runtime: &RuntimeConfig) -> BootstrapResult<Self> {
        let config = AppConfig::load(&runtime.config_dir)?;
        init_runtime(&config)?;

        let metrics = if runtime.enable_metrics {
            Some(dbfault_telemetry::init_metrics()?)
        } else {
            None
        };

        let mut infra = Self::from_config(config);
        infra.metrics = metrics;
        Ok(infra)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &TranslatorRegistry {
        &self.registry
    }

    /// 配置中指定方言的翻译器
    pub fn default_translator(&self) -> BootstrapResult<Arc<dyn ErrorTranslator>> {
        Ok(self.registry.get(Some(self.config.translator.dialect.as_str()))?)
    }

    /// Prometheus 抓取文本；未启用指标时为 None
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(PrometheusHandle::render)
    }
}
