// 分析结果缓存层 - 每个类别一个并发映射，条目带有过期时间

use crate::models::{
    ActivityDataAnalysisInfo, AnalysisKey, CallDataAnalysisInfo, CognitiveScoresSummary,
    DailySleepSummary, DeviceInteractionAnalysisInfo, GpsDataAnalysisInfo, OverallPerformance,
    TypingCategoryPercentages,
};
use crate::storage::config::CacheConfig;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// 缓存类别，每个类别独立存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CacheCategory {
    OverallPerformance,
    CognitiveSummary,
    Sleep,
    Activity,
    Call,
    Gps,
    DeviceInteraction,
    Typing,
}

impl CacheCategory {
    pub const COUNT: usize = 8;

    pub const ALL: [CacheCategory; CacheCategory::COUNT] = [
        CacheCategory::OverallPerformance,
        CacheCategory::CognitiveSummary,
        CacheCategory::Sleep,
        CacheCategory::Activity,
        CacheCategory::Call,
        CacheCategory::Gps,
        CacheCategory::DeviceInteraction,
        CacheCategory::Typing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CacheCategory::OverallPerformance => "Overall Performance",
            CacheCategory::CognitiveSummary => "Cognitive Summary",
            CacheCategory::Sleep => "Sleep",
            CacheCategory::Activity => "Activity",
            CacheCategory::Call => "Call",
            CacheCategory::Gps => "GPS",
            CacheCategory::DeviceInteraction => "Device Interaction",
            CacheCategory::Typing => "Typing",
        }
    }

    /// 综合表现和认知汇总使用长缓存时长
    pub fn uses_long_ttl(&self) -> bool {
        matches!(
            self,
            CacheCategory::OverallPerformance | CacheCategory::CognitiveSummary
        )
    }
}

/// 缓存中保存的分析产物
#[derive(Debug, Clone, PartialEq)]
pub enum CachedArtifact {
    OverallPerformance(OverallPerformance),
    CognitiveSummary(CognitiveScoresSummary),
    Sleep(DailySleepSummary),
    Activity(ActivityDataAnalysisInfo),
    Call(CallDataAnalysisInfo),
    Gps(GpsDataAnalysisInfo),
    DeviceInteraction(DeviceInteractionAnalysisInfo),
    Typing(TypingCategoryPercentages),
}

/// 可缓存的分析产物类型
pub trait Cacheable: Clone + Send + Sync + 'static {
    /// 该类型所属的缓存类别
    const CATEGORY: CacheCategory;

    fn wrap(self) -> CachedArtifact;

    fn unwrap_ref(artifact: &CachedArtifact) -> Option<&Self>;
}

macro_rules! impl_cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            const CATEGORY: CacheCategory = CacheCategory::$variant;

            fn wrap(self) -> CachedArtifact {
                CachedArtifact::$variant(self)
            }

            fn unwrap_ref(artifact: &CachedArtifact) -> Option<&Self> {
                match artifact {
                    CachedArtifact::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

impl_cacheable!(OverallPerformance, OverallPerformance);
impl_cacheable!(CognitiveScoresSummary, CognitiveSummary);
impl_cacheable!(DailySleepSummary, Sleep);
impl_cacheable!(ActivityDataAnalysisInfo, Activity);
impl_cacheable!(CallDataAnalysisInfo, Call);
impl_cacheable!(GpsDataAnalysisInfo, Gps);
impl_cacheable!(DeviceInteractionAnalysisInfo, DeviceInteraction);
impl_cacheable!(TypingCategoryPercentages, Typing);

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
    pub value: T,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl<T> CachedEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.stored_at + self.ttl
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// 缓存统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// 每个类别的条目数（包含尚未清理的过期条目）
    pub entries: Vec<(CacheCategory, usize)>,
    pub total_entries: usize,
    pub expired_entries: usize,
}

impl CacheStats {
    pub fn count(&self, category: CacheCategory) -> usize {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cache Statistics:")?;
        for (category, count) in &self.entries {
            writeln!(f, "  {}: {} entries", category.name(), count)?;
        }
        writeln!(f, "  Expired (pending sweep): {}", self.expired_entries)?;
        write!(f, "  Total: {} entries", self.total_entries)
    }
}

type CategoryMap = DashMap<AnalysisKey, CachedEntry<CachedArtifact>>;

/// 分析结果缓存
///
/// 过期只在读取时检查；过期条目留在映射中直到 `evict_expired` 或失效操作。
pub struct AnalysisCache {
    maps: [CategoryMap; CacheCategory::COUNT],
    short_ttl: Duration,
    long_ttl: Duration,
}

impl AnalysisCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttls(config.short_ttl(), config.long_ttl())
    }

    pub fn with_ttls(short_ttl: Duration, long_ttl: Duration) -> Self {
        Self {
            maps: std::array::from_fn(|_| DashMap::new()),
            short_ttl,
            long_ttl,
        }
    }

    fn map(&self, category: CacheCategory) -> &CategoryMap {
        &self.maps[category as usize]
    }

    /// 某个类别的缓存时长
    pub fn ttl_for(&self, category: CacheCategory) -> Duration {
        if category.uses_long_ttl() {
            self.long_ttl
        } else {
            self.short_ttl
        }
    }

    /// 读取未过期的缓存值
    pub fn get<T: Cacheable>(&self, key: &AnalysisKey) -> Option<T> {
        let entry = self.map(T::CATEGORY).get(key)?;
        if entry.is_expired() {
            debug!("缓存已过期: {} [{}]", key, T::CATEGORY.name());
            return None;
        }
        T::unwrap_ref(&entry.value).cloned()
    }

    /// 按类别默认时长写入
    pub fn put<T: Cacheable>(&self, key: AnalysisKey, value: T) {
        let ttl = self.ttl_for(T::CATEGORY);
        self.put_with_ttl(key, value, ttl);
    }

    pub fn put_with_ttl<T: Cacheable>(&self, key: AnalysisKey, value: T, ttl: Duration) {
        debug!("写入缓存: {} [{}] ttl={:?}", key, T::CATEGORY.name(), ttl);
        self.map(T::CATEGORY)
            .insert(key, CachedEntry::new(value.wrap(), ttl));
    }

    /// 从所有类别中移除该键，返回移除的条目数
    pub fn invalidate(&self, key: &AnalysisKey) -> usize {
        let removed = self
            .maps
            .iter()
            .filter(|map| map.remove(key).is_some())
            .count();
        debug!("缓存失效: {} (移除 {} 条)", key, removed);
        removed
    }

    /// 移除某个用户在所有类别中的条目
    pub fn invalidate_user(&self, user_uid: &str) -> usize {
        let mut removed = 0;
        for map in &self.maps {
            map.retain(|key, _| {
                if key.user_uid == user_uid {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }
        info!("已清除用户 {} 的缓存，共 {} 条", user_uid, removed);
        removed
    }

    /// 清理所有过期条目，返回清理数量
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for map in &self.maps {
            map.retain(|_, entry| {
                if entry.is_expired_at(now) {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }
        if removed > 0 {
            debug!("清理过期缓存 {} 条", removed);
        }
        removed
    }

    pub fn clear(&self) {
        for map in &self.maps {
            map.clear();
        }
        info!("已清空全部缓存");
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut expired_entries = 0;
        let entries: Vec<(CacheCategory, usize)> = CacheCategory::ALL
            .iter()
            .map(|category| {
                let map = self.map(*category);
                expired_entries += map.iter().filter(|e| e.is_expired_at(now)).count();
                (*category, map.len())
            })
            .collect();
        let total_entries = entries.iter().map(|(_, n)| n).sum();

        CacheStats {
            entries,
            total_entries,
            expired_entries,
        }
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
