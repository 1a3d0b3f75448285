// 认知洞察聚合与缓存引擎 - 主库

// 声明模块
pub mod analysis;
pub mod app;
pub mod logger;
pub mod models;
pub mod settings;
pub mod storage;
pub mod utils;

// 重新导出常用类型
pub use analysis::{AccountDirectory, PerformanceService, StaticAccountDirectory};
pub use app::InsightsApp;
pub use logger::{LogBroadcaster, LogMessage};
pub use models::{
    AnalysisKey, CognitiveScoresSummary, DecisionLabel, EngineConfig, OverallPerformance,
    PersistedEngineConfig,
};
pub use settings::SettingsManager;
pub use storage::{AnalysisCache, AnalysisStore, CacheStats, RestAnalysisStore, SqliteAnalysisStore};
