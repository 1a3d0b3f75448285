// 表现计算服务 - 对外的查询入口与缓存管理

use super::categories::{activity, call, device_interaction, gps, sleep, typing};
use super::cognitive::{collect_scores, summarize};
use super::identity::AccountDirectory;
use crate::models::{
    ActivityDataAnalysisInfo, AnalysisKey, BaselineMetrics, CallDataAnalysisInfo,
    CognitiveScoresSummary, DailySleepSummary, DeviceInteractionAnalysisInfo, GpsDataAnalysisInfo,
    OverallPerformance, TypingCategoryPercentages, NO_DATA_LABEL,
};
use crate::storage::{decode_row, tables, AnalysisCache, AnalysisStore, CacheStats, Cacheable, SelectQuery, SortOrder};
use crate::utils::validate_analysis_key;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 表现计算服务
///
/// 所有查询在缓存未命中时读取数据源，失败或无数据时返回 `None`，错误只记录日志。
#[derive(Clone)]
pub struct PerformanceService {
    store: Arc<dyn AnalysisStore>,
    accounts: Arc<dyn AccountDirectory>,
    cache: Arc<AnalysisCache>,
}

impl PerformanceService {
    pub fn new(
        store: Arc<dyn AnalysisStore>,
        accounts: Arc<dyn AccountDirectory>,
        cache: Arc<AnalysisCache>,
    ) -> Self {
        info!("表现计算服务已创建，数据源: {}", store.store_type());
        Self {
            store,
            accounts,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    fn key(&self, user_uid: &str, date: &str) -> Option<AnalysisKey> {
        match validate_analysis_key(user_uid, date) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("参数无效 (user={:?}, date={:?}): {}", user_uid, date, e);
                None
            }
        }
    }

    /// 先查缓存，未命中时执行读取并写入缓存
    pub async fn cached_fetch<T, F, Fut>(&self, key: &AnalysisKey, fetch: F) -> Option<T>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let category = T::CATEGORY.name();
        if let Some(cached) = self.cache.get::<T>(key) {
            debug!("缓存命中: {} [{}]", key, category);
            return Some(cached);
        }
        debug!("缓存未命中: {} [{}]", key, category);

        match fetch().await {
            Ok(Some(value)) => {
                self.cache.put(key.clone(), value.clone());
                Some(value)
            }
            Ok(None) => {
                info!("{} [{}] 没有数据", key, category);
                None
            }
            Err(e) => {
                error!("读取 {} [{}] 失败: {:#}", key, category, e);
                None
            }
        }
    }

    // ========== 各类别表现 ==========

    pub async fn calculate_sleep_performance(&self, date: &str, user_uid: &str) -> Option<DailySleepSummary> {
        let key = self.key(user_uid, date)?;
        self.cached_fetch(&key, || sleep::fetch(self.store.as_ref(), &key))
            .await
    }

    pub async fn calculate_activity_performance(
        &self,
        date: &str,
        user_uid: &str,
    ) -> Option<ActivityDataAnalysisInfo> {
        let key = self.key(user_uid, date)?;
        self.cached_fetch(&key, || activity::fetch(self.store.as_ref(), &key))
            .await
    }

    pub async fn calculate_gps_mobility_performance(
        &self,
        date: &str,
        user_uid: &str,
    ) -> Option<GpsDataAnalysisInfo> {
        let key = self.key(user_uid, date)?;
        self.cached_fetch(&key, || gps::fetch(self.store.as_ref(), &key))
            .await
    }

    pub async fn calculate_call_performance(&self, date: &str, user_uid: &str) -> Option<CallDataAnalysisInfo> {
        let key = self.key(user_uid, date)?;
        self.cached_fetch(&key, || call::fetch(self.store.as_ref(), &key))
            .await
    }

    pub async fn calculate_device_interaction_performance(
        &self,
        date: &str,
        user_uid: &str,
    ) -> Option<DeviceInteractionAnalysisInfo> {
        let key = self.key(user_uid, date)?;
        self.cached_fetch(&key, || device_interaction::fetch(self.store.as_ref(), &key))
            .await
    }

    /// 打字结果按调用者的用户ID缓存，打字应用用户ID在未命中时解析
    pub async fn calculate_typing_overall_score_percentages(
        &self,
        date: &str,
        user_uid: &str,
    ) -> Option<TypingCategoryPercentages> {
        let key = self.key(user_uid, date)?;
        self.cached_fetch(&key, || {
            typing::fetch(self.store.as_ref(), self.accounts.as_ref(), &key)
        })
        .await
    }

    // ========== 认知汇总与综合表现 ==========

    pub async fn get_cognitive_scores_summary(
        &self,
        user_uid: &str,
        date: &str,
    ) -> Option<CognitiveScoresSummary> {
        let key = self.key(user_uid, date)?;
        Some(self.cognitive_summary(&key).await)
    }

    async fn cognitive_summary(&self, key: &AnalysisKey) -> CognitiveScoresSummary {
        if let Some(cached) = self.cache.get::<CognitiveScoresSummary>(key) {
            debug!("缓存命中: {} [认知汇总]", key);
            return cached;
        }

        let scores = collect_scores(self.store.as_ref(), self.accounts.as_ref(), key).await;
        let summary = summarize(key, scores);
        info!(
            "{} 认知汇总: 平均 {:?}, 等级 {:?}, 可用类别 {}",
            key, summary.mean_cognitive_score, summary.total_cognitive_decision, summary.total_scores_available
        );

        self.cache.put(key.clone(), summary.clone());
        summary
    }

    /// 综合表现：认知平均分 + 等级，没有任何类别得分时返回 `None`
    pub async fn calculate_overall_performance(&self, date: &str, user_uid: &str) -> Option<OverallPerformance> {
        let key = self.key(user_uid, date)?;

        if let Some(cached) = self.cache.get::<OverallPerformance>(&key) {
            debug!("缓存命中: {} [综合表现]", key);
            return Some(cached);
        }

        let summary = self.cognitive_summary(&key).await;
        let Some(score) = summary.mean_cognitive_score else {
            info!("{} 没有可用的认知得分，无法计算综合表现", key);
            return None;
        };

        let performance = OverallPerformance {
            score,
            decision: summary
                .total_cognitive_decision
                .map(|d| d.to_string())
                .unwrap_or_else(|| NO_DATA_LABEL.to_string()),
        };
        self.cache.put(key, performance.clone());
        Some(performance)
    }

    // ========== 基线 ==========

    /// 用户某项指标的最新基线，不缓存
    pub async fn latest_baseline_values(&self, metric: &str, user_uid: &str) -> Option<BaselineMetrics> {
        if metric.trim().is_empty() || user_uid.trim().is_empty() {
            warn!("指标名或用户ID为空");
            return None;
        }

        match self.fetch_latest_baseline(metric, user_uid).await {
            Ok(Some(baseline)) => Some(baseline),
            Ok(None) => {
                info!("用户 {} 没有指标 {} 的基线", user_uid, metric);
                None
            }
            Err(e) => {
                error!("读取用户 {} 指标 {} 的基线失败: {:#}", user_uid, metric, e);
                None
            }
        }
    }

    async fn fetch_latest_baseline(&self, metric: &str, user_uid: &str) -> Result<Option<BaselineMetrics>> {
        let query = SelectQuery::from(tables::BASELINE_METRICS)
            .columns(&[
                "metric_name",
                "baseline_mean",
                "baseline_std",
                "baseline_median",
                "baseline_mad",
            ])
            .eq("user_uid", user_uid)
            .eq("metric_name", metric)
            .order_by("date_created", SortOrder::Descending)
            .limit(1);

        self.store
            .select_optional(&query)
            .await
            .context("读取基线指标失败")?
            .map(decode_row)
            .transpose()
    }

    // ========== 缓存管理 ==========

    /// 清除某个用户某一天的所有缓存
    pub fn clear_cache_for_date(&self, user_uid: &str, date: &str) -> usize {
        match self.key(user_uid, date) {
            Some(key) => self.cache.invalidate(&key),
            None => 0,
        }
    }

    pub fn clear_cache_for_user(&self, user_uid: &str) -> usize {
        self.cache.invalidate_user(user_uid)
    }

    /// 强制下次查询重新读取数据源
    pub fn force_refresh_data(&self, user_uid: &str, date: &str) -> usize {
        let removed = self.clear_cache_for_date(user_uid, date);
        info!("强制刷新 {} {}，清除 {} 条缓存", user_uid, date, removed);
        removed
    }

    pub fn clear_all_cache(&self) {
        self.cache.clear();
    }

    pub fn clear_expired_cache(&self) -> usize {
        self.cache.evict_expired()
    }

    pub fn get_cache_stats(&self) -> String {
        self.cache.stats().to_string()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::categories::test_support::TableStore;
    use crate::analysis::identity::StaticAccountDirectory;
    use crate::models::DecisionLabel;
    use crate::storage::CacheCategory;
    use serde_json::json;

    fn service(store: TableStore) -> (PerformanceService, Arc<TableStore>) {
        let store = Arc::new(store);
        let accounts = Arc::new(StaticAccountDirectory::new().with("U1", "ada@example.com"));
        let service = PerformanceService::new(store.clone(), accounts, Arc::new(AnalysisCache::default()));
        (service, store)
    }

    fn scored_store() -> TableStore {
        TableStore::default()
            .with(
                "Sleep_Data_Analysis",
                vec![json!({"user_uid": "U1", "day_analyzed": "2025-03-02", "cognitive_score": 1.0})],
            )
            .with(
                "Activity_Data_Analysis",
                vec![json!({"id": 1, "user_uid": "U1", "day_analyzed": "2025-03-02", "cognitive_score": -1.0})],
            )
    }

    #[tokio::test(start_paused = true)]
    async fn test_overall_performance_mean() {
        let (service, store) = service(scored_store());

        let performance = service.calculate_overall_performance("2025-03-02", "U1").await.unwrap();
        assert_eq!(performance.score, 0.0);
        assert_eq!(performance.decision, "Normal");

        let summary = service.get_cognitive_scores_summary("U1", "2025-03-02").await.unwrap();
        assert_eq!(summary.total_scores_available, 2);
        assert_eq!(summary.total_cognitive_decision, Some(DecisionLabel::Normal));

        // 汇总已缓存，不会再次查询
        assert_eq!(store.query_count("Sleep_Data_Analysis"), 1);
        let stats = service.cache_stats();
        assert_eq!(stats.count(CacheCategory::OverallPerformance), 1);
        assert_eq!(stats.count(CacheCategory::CognitiveSummary), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_scores_caches_summary_only() {
        let (service, _) = service(TableStore::default());

        assert!(service.calculate_overall_performance("2025-03-02", "U1").await.is_none());

        let summary = service.get_cognitive_scores_summary("U1", "2025-03-02").await.unwrap();
        assert_eq!(summary.total_scores_available, 0);
        assert_eq!(summary.mean_cognitive_score, None);

        let stats = service.cache_stats();
        assert_eq!(stats.count(CacheCategory::OverallPerformance), 0);
        assert_eq!(stats.count(CacheCategory::CognitiveSummary), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_never_reaches_store() {
        let (service, store) = service(scored_store());

        assert!(service.calculate_call_performance("2025-03-02", "").await.is_none());
        assert!(service.calculate_sleep_performance("", "U1").await.is_none());
        assert!(service.calculate_overall_performance("03/02/2025", "U1").await.is_none());
        assert!(service.get_cognitive_scores_summary(" ", "2025-03-02").await.is_none());
        assert!(service.latest_baseline_values("", "U1").await.is_none());
        assert!(store.queries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_fetch_error_is_none_and_not_cached() {
        let (service, _) = service(TableStore::default());
        let key = validate_analysis_key("U1", "2025-03-02").unwrap();

        let result: Option<OverallPerformance> = service
            .cached_fetch(&key, || async { Err::<Option<OverallPerformance>, _>(anyhow::anyhow!("connection reset")) })
            .await;
        assert!(result.is_none());

        let result: Option<OverallPerformance> = service
            .cached_fetch(&key, || async { Ok::<_, anyhow::Error>(None) })
            .await;
        assert!(result.is_none());
        assert_eq!(service.cache_stats().total_entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_baseline() {
        let (service, _) = service(TableStore::default().with(
            "Baseline_Metrics",
            vec![json!({
                "user_uid": "U1", "metric_name": "screen_time",
                "baseline_mean": 14000.0, "baseline_std": 2100.0,
                "baseline_median": 13800.0, "baseline_mad": 1500.0
            })],
        ));

        let baseline = service.latest_baseline_values("screen_time", "U1").await.unwrap();
        assert_eq!(baseline.baseline_median, 13800.0);
        assert!(service.latest_baseline_values("sleep", "U1").await.is_none());
        // 基线不写入缓存
        assert_eq!(service.cache_stats().total_entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_administration() {
        let (service, _) = service(scored_store());
        service.calculate_overall_performance("2025-03-02", "U1").await.unwrap();
        service.calculate_activity_performance("2025-03-02", "U1").await.unwrap();

        assert_eq!(service.clear_cache_for_date("U1", "2025-03-01"), 0);
        assert_eq!(service.force_refresh_data("U1", "2025-03-02"), 3);
        assert!(service.get_cache_stats().contains("Total: 0 entries"));

        service.calculate_overall_performance("2025-03-02", "U1").await.unwrap();
        service.clear_all_cache();
        assert_eq!(service.cache_stats().total_entries, 0);
        assert_eq!(service.clear_expired_cache(), 0);
    }
}
