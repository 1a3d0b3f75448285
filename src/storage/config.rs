// 存储配置定义

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 分析数据源配置类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// 远程 REST 数据源（PostgREST 兼容接口）
    #[serde(rename = "rest")]
    Rest {
        /// 服务地址，例如 https://xxx.supabase.co
        base_url: String,
        /// 匿名访问密钥
        api_key: String,
        /// 请求超时（秒）
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// 本地 SQLite 镜像
    #[serde(rename = "sqlite")]
    SQLite {
        /// 数据库文件路径
        db_path: String,
    },
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::SQLite {
            db_path: "data/analysis.db".to_string(),
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// 普通类别数据的缓存时长（分钟）
    pub short_ttl_minutes: u64,
    /// 综合表现与认知汇总的缓存时长（分钟）
    pub long_ttl_minutes: u64,
    /// 过期清理间隔（分钟）
    pub sweep_interval_minutes: u64,
    /// 是否启用自动过期清理
    pub auto_sweep_enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            short_ttl_minutes: 30,
            long_ttl_minutes: 60,
            sweep_interval_minutes: 15,
            auto_sweep_enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn short_ttl(&self) -> Duration {
        Duration::from_secs(self.short_ttl_minutes * 60)
    }

    pub fn long_ttl(&self) -> Duration {
        Duration::from_secs(self.long_ttl_minutes * 60)
    }

    /// 清理间隔，至少 1 分钟
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes.max(1) * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.short_ttl(), Duration::from_secs(30 * 60));
        assert_eq!(config.long_ttl(), Duration::from_secs(60 * 60));
        assert!(config.auto_sweep_enabled);
    }

    #[test]
    fn test_store_config_tagged_json() {
        let json = r#"{"type":"rest","base_url":"https://example.supabase.co","api_key":"anon"}"#;
        let config: StoreConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config,
            StoreConfig::Rest {
                base_url: "https://example.supabase.co".to_string(),
                api_key: "anon".to_string(),
                timeout_secs: 30,
            }
        );

        let sqlite = serde_json::to_value(StoreConfig::default()).unwrap();
        assert_eq!(sqlite["type"], "sqlite");
    }

    #[test]
    fn test_sweep_interval_floor() {
        let config = CacheConfig {
            sweep_interval_minutes: 0,
            ..CacheConfig::default()
        };
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
    }
}
