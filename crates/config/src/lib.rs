//! dbfault-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 环境变量前缀；嵌套字段以 `__` 分隔，如 `DBFAULT_TRANSLATOR__PRIMARY_KEY_PREFIX`
pub const ENV_PREFIX: &str = "DBFAULT_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 错误翻译器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// 唯一约束名带此前缀（忽略大小写）时视为主键，空字符串表示关闭
    #[serde(default = "default_primary_key_prefix")]
    pub primary_key_prefix: String,
    #[serde(default)]
    pub log_rule_inputs: bool,
}

fn default_dialect() -> String {
    "postgresql".to_string()
}

fn default_primary_key_prefix() -> String {
    "pk_".to_string()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            primary_key_prefix: default_primary_key_prefix(),
            log_rule_inputs: false,
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_app_name() -> String {
    "dbfault".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_env: default_app_env(),
            translator: TranslatorConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());
        Self::from_figment(Self::figment(config_dir, &env))
    }

    /// 合并顺序：默认值 < default.toml < {env}.toml < 环境变量
    pub fn figment(config_dir: &str, env: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig {
            app_env: env.to_string(),
            ..AppConfig::default()
        }))
        .merge(Toml::file(format!("{}/default.toml", config_dir)))
        .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
