mod common;

use cognitive_insights::storage::CacheCategory;
use cognitive_insights::{AnalysisCache, PerformanceService, StaticAccountDirectory};
use common::MemoryStore;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn call_row(user: &str, day: &str, total: i64) -> serde_json::Value {
    json!({
        "user_uid": user, "day_analyzed": day,
        "day_call_ratio": 0.6, "night_call_ratio": 0.4, "avg_call_duration": 80.0,
        "total_calls_in_a_day": total, "missed_call_ratio": 0.0,
        "cognitive_score": 0.2, "cognitive_decision": "Normal"
    })
}

fn service(store: MemoryStore) -> (PerformanceService, Arc<MemoryStore>) {
    let store = Arc::new(store);
    let service = PerformanceService::new(
        store.clone(),
        Arc::new(StaticAccountDirectory::new()),
        Arc::new(AnalysisCache::default()),
    );
    (service, store)
}

#[tokio::test(start_paused = true)]
async fn repeated_call_is_served_from_cache() {
    let (service, store) = service(MemoryStore::new().table("Call_Data_Analysis", vec![call_row("U1", "2025-03-02", 9)]));

    let first = service.calculate_call_performance("2025-03-02", "U1").await.unwrap();
    let second = service.calculate_call_performance("2025-03-02", "U1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.calls("Call_Data_Analysis"), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_is_refetched() {
    let (service, store) = service(MemoryStore::new().table("Call_Data_Analysis", vec![call_row("U1", "2025-03-02", 9)]));

    service.calculate_call_performance("2025-03-02", "U1").await.unwrap();
    tokio::time::advance(Duration::from_secs(29 * 60)).await;
    service.calculate_call_performance("2025-03-02", "U1").await.unwrap();
    assert_eq!(store.calls("Call_Data_Analysis"), 1);

    tokio::time::advance(Duration::from_secs(2 * 60)).await;
    service.calculate_call_performance("2025-03-02", "U1").await.unwrap();
    assert_eq!(store.calls("Call_Data_Analysis"), 2);
}

#[tokio::test(start_paused = true)]
async fn overall_performance_outlives_category_entries() {
    let (service, store) = service(MemoryStore::new().table("Call_Data_Analysis", vec![call_row("U1", "2025-03-02", 9)]));

    let overall = service.calculate_overall_performance("2025-03-02", "U1").await.unwrap();
    assert_eq!(overall.score, 0.2);
    let reads = store.calls("Call_Data_Analysis");

    tokio::time::advance(Duration::from_secs(45 * 60)).await;
    service.calculate_overall_performance("2025-03-02", "U1").await.unwrap();
    assert_eq!(store.calls("Call_Data_Analysis"), reads);

    tokio::time::advance(Duration::from_secs(16 * 60)).await;
    service.calculate_overall_performance("2025-03-02", "U1").await.unwrap();
    assert_eq!(store.calls("Call_Data_Analysis"), reads + 1);
}

#[tokio::test(start_paused = true)]
async fn empty_inputs_never_reach_the_store() {
    let (service, store) = service(MemoryStore::new().table("Call_Data_Analysis", vec![call_row("U1", "2025-03-02", 9)]));

    assert!(service.calculate_call_performance("2025-03-02", "").await.is_none());
    assert!(service.calculate_gps_mobility_performance("", "U1").await.is_none());
    assert!(service.calculate_typing_overall_score_percentages("2025-03-02", "").await.is_none());
    assert!(service.calculate_overall_performance("", "").await.is_none());
    assert_eq!(store.total_calls(), 0);
    assert_eq!(service.cache_stats().total_entries, 0);
}

#[tokio::test(start_paused = true)]
async fn clearing_one_user_keeps_others() {
    let (service, store) = service(
        MemoryStore::new()
            .table("Call_Data_Analysis", vec![call_row("U1", "2025-03-02", 9), call_row("U2", "2025-03-02", 3)])
            .table("Call_Data_Analysis", vec![call_row("U1", "2025-03-03", 4)]),
    );

    service.calculate_call_performance("2025-03-02", "U1").await.unwrap();
    service.calculate_call_performance("2025-03-03", "U1").await.unwrap();
    service.calculate_call_performance("2025-03-02", "U2").await.unwrap();
    service.calculate_overall_performance("2025-03-02", "U1").await.unwrap();
    let stats = service.cache_stats();
    assert_eq!(stats.count(CacheCategory::Call), 3);

    let removed = service.clear_cache_for_user("U1");
    assert_eq!(removed, stats.total_entries - 1);

    let stats = service.cache_stats();
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.count(CacheCategory::Call), 1);

    // U2 仍然命中缓存
    let before = store.calls("Call_Data_Analysis");
    service.calculate_call_performance("2025-03-02", "U2").await.unwrap();
    assert_eq!(store.calls("Call_Data_Analysis"), before);
}

#[tokio::test(start_paused = true)]
async fn force_refresh_rereads_the_day() {
    let (service, store) = service(MemoryStore::new().table("Call_Data_Analysis", vec![call_row("U1", "2025-03-02", 9)]));

    service.calculate_call_performance("2025-03-02", "U1").await.unwrap();
    assert_eq!(service.force_refresh_data("U1", "2025-03-02"), 1);
    service.calculate_call_performance("2025-03-02", "U1").await.unwrap();
    assert_eq!(store.calls("Call_Data_Analysis"), 2);
}

#[tokio::test(start_paused = true)]
async fn sweep_removes_only_expired_entries() {
    let (service, _) = service(MemoryStore::new().table("Call_Data_Analysis", vec![call_row("U1", "2025-03-02", 9)]));

    service.calculate_overall_performance("2025-03-02", "U1").await.unwrap();
    service.calculate_call_performance("2025-03-02", "U1").await.unwrap();

    tokio::time::advance(Duration::from_secs(31 * 60)).await;
    assert_eq!(service.clear_expired_cache(), 1);

    let text = service.get_cache_stats();
    assert!(text.contains("Call: 0 entries"));
    assert!(text.contains("Total: 2 entries"));
}
