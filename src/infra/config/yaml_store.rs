use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::config::{AdsConfig, ConfigError, ConfigStore};

/// `google-ads.yaml` on the local filesystem.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ConfigStore for YamlConfigStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn load(&self) -> Result<AdsConfig, ConfigError> {
        let text = self.read_raw().await?;
        Ok(AdsConfig::from_yaml(&text)?)
    }

    async fn save(&self, config: &AdsConfig) -> Result<(), ConfigError> {
        self.write_raw(&config.to_yaml()?).await
    }

    async fn read_raw(&self) -> Result<String, ConfigError> {
        if !self.exists() {
            return Err(ConfigError::NotFound(self.path.display().to_string()));
        }
        Ok(fs::read_to_string(&self.path).await?)
    }

    async fn write_raw(&self, text: &str) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlConfigStore::new(dir.path().join("nested").join("google-ads.yaml"));

        let mut config = AdsConfig {
            developer_token: "dev".to_string(),
            json_key_file_path: Some("sa.json".to_string()),
            ..Default::default()
        };
        config.apply_network_overrides(Some("http://proxy:3128"));
        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlConfigStore::new(dir.path().join("google-ads.yaml"));

        assert!(!store.exists());
        assert!(matches!(store.load().await, Err(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_raw_text_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlConfigStore::new(dir.path().join("google-ads.yaml"));
        let text = "# comment kept\ndeveloper_token: \"x\"\n";

        store.write_raw(text).await.unwrap();
        assert_eq!(store.read_raw().await.unwrap(), text);
    }
}
