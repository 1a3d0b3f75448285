//! 应用程序初始化和启动
//!
//! 负责引擎的完整启动流程，包括：
//! - 配置加载
//! - 日志系统初始化
//! - 数据源、缓存和表现计算服务的创建
//! - 后台缓存清理任务

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::analysis::{AccountDirectory, PerformanceService};
use crate::logger::{self, LogBroadcaster};
use crate::models::PersistedEngineConfig;
use crate::settings::SettingsManager;
use crate::storage::{self, AnalysisCache, AnalysisStore, CacheSweeper};

/// 引擎实例，拥有自己的缓存
pub struct InsightsApp {
    config: PersistedEngineConfig,
    cache: Arc<AnalysisCache>,
    service: PerformanceService,
    sweeper: Option<CacheSweeper>,
}

impl InsightsApp {
    /// 按配置连接数据源并创建引擎
    pub async fn new(config: PersistedEngineConfig, accounts: Arc<dyn AccountDirectory>) -> Result<Self> {
        info!("初始化认知洞察引擎...");
        let store = storage::connect_store(&config.store)
            .await
            .with_context(|| format!("连接分析数据源失败: {:?}", config.store))?;
        Ok(Self::with_store(config, store, accounts))
    }

    /// 使用已有的数据源创建引擎
    pub fn with_store(
        config: PersistedEngineConfig,
        store: Arc<dyn AnalysisStore>,
        accounts: Arc<dyn AccountDirectory>,
    ) -> Self {
        let cache = Arc::new(AnalysisCache::new(&config.cache));
        let service = PerformanceService::new(store, accounts, cache.clone());

        let sweeper = config
            .cache
            .auto_sweep_enabled
            .then(|| CacheSweeper::new(cache.clone(), config.cache.sweep_interval()));

        Self {
            config,
            cache,
            service,
            sweeper,
        }
    }

    /// 启动后台任务
    pub async fn start(&self) {
        info!("启动后台任务...");
        match &self.sweeper {
            Some(sweeper) => sweeper.start().await,
            None => info!("自动缓存清理已禁用"),
        }
    }

    /// 停止后台任务并清空缓存
    pub async fn shutdown(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.stop().await;
        }
        self.cache.clear();
        info!("认知洞察引擎已关闭");
    }

    pub fn service(&self) -> &PerformanceService {
        &self.service
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    pub fn sweeper(&self) -> Option<&CacheSweeper> {
        self.sweeper.as_ref()
    }

    pub fn config(&self) -> &PersistedEngineConfig {
        &self.config
    }
}

/// 应用程序入口
///
/// 1. 读取配置文件（不存在时写入默认配置）
/// 2. 初始化日志系统（控制台、文件、日志广播）
/// 3. 创建引擎并启动后台任务
pub async fn run(
    settings_path: PathBuf,
    accounts: Arc<dyn AccountDirectory>,
    broadcaster: Arc<LogBroadcaster>,
) -> Result<(InsightsApp, Arc<SettingsManager>)> {
    let settings = Arc::new(SettingsManager::new(settings_path).await?);
    let config = settings.get().await;

    logger::init(&config.logging, broadcaster).context("初始化日志系统失败")?;

    let app = InsightsApp::new(config, accounts).await?;
    app.start().await;
    info!("认知洞察引擎已启动");

    Ok((app, settings))
}
