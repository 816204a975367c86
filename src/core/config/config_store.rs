use async_trait::async_trait;

use super::ads_config::AdsConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Where the `google-ads.yaml` settings live.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    fn exists(&self) -> bool;
    async fn load(&self) -> Result<AdsConfig, ConfigError>;
    async fn save(&self, config: &AdsConfig) -> Result<(), ConfigError>;
    async fn read_raw(&self) -> Result<String, ConfigError>;
    async fn write_raw(&self, text: &str) -> Result<(), ConfigError>;
}
