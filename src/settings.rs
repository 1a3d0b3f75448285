use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{EngineConfig, PersistedEngineConfig};

pub struct SettingsManager {
    path: PathBuf,
    data: RwLock<PersistedEngineConfig>,
}

impl SettingsManager {
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let initial = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => {
                serde_json::from_slice::<PersistedEngineConfig>(&bytes).unwrap_or_else(|e| {
                    warn!("配置文件 {:?} 解析失败，使用默认配置: {}", path, e);
                    PersistedEngineConfig::default()
                })
            }
            _ => {
                let default = PersistedEngineConfig::default();
                let json = serde_json::to_string_pretty(&default)?;
                tokio::fs::write(&path, json).await?;
                default
            }
        };

        Ok(Self {
            path,
            data: RwLock::new(initial),
        })
    }

    pub async fn get(&self) -> PersistedEngineConfig {
        self.data.read().await.clone()
    }

    pub async fn update(&self, update: EngineConfig) -> Result<PersistedEngineConfig> {
        let mut config = self.data.write().await;

        if let Some(store) = update.store {
            config.store = store;
        }
        if let Some(cache) = update.cache {
            config.cache = cache;
        }
        if let Some(logging) = update.logging {
            config.logging = logging;
        }

        self.save(&config).await?;
        Ok(config.clone())
    }

    async fn save(&self, config: &PersistedEngineConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
