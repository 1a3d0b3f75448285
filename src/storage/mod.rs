// 存储模块 - 分析数据源抽象与结果缓存

// 子模块
pub mod cache;
pub mod config;
pub mod models;
pub mod repository;
pub mod sweeper;

// 重新导出主要类型
pub use cache::{AnalysisCache, CacheCategory, CacheStats, Cacheable, CachedArtifact, CachedEntry};
pub use config::{CacheConfig, StoreConfig};
pub use models::tables;
pub use repository::{decode_row, decode_rows, AnalysisStore, Row, SelectQuery, SortOrder};
pub use sweeper::CacheSweeper;

// 重新导出具体实现
pub use repository::rest::RestAnalysisStore;
pub use repository::sqlite::SqliteAnalysisStore;

use anyhow::Result;
use std::sync::Arc;

/// 根据配置创建分析数据源
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn AnalysisStore>> {
    let store: Arc<dyn AnalysisStore> = match config {
        StoreConfig::Rest {
            base_url,
            api_key,
            timeout_secs,
        } => Arc::new(RestAnalysisStore::new(base_url, api_key, *timeout_secs)?),
        StoreConfig::SQLite { db_path } => Arc::new(SqliteAnalysisStore::new(db_path).await?),
    };
    Ok(store)
}
