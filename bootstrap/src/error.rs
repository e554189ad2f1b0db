use dbfault_config::ConfigError;
use dbfault_errors::RegistryError;
use dbfault_telemetry::TelemetryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("translator registry: {0}")]
    Registry(#[from] RegistryError),
}

pub type BootstrapResult<T> = Result<T, BootstrapError>;
