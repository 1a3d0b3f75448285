// GPS 移动性分析：主表 + 空间特征 + 关键地点

use super::{first_cognitive_score, query_for_key};
use crate::models::{AnalysisKey, GpsDataAnalysisInfo, KeyLocation};
use crate::storage::models::{GpsAnalysisRow, GpsSpatialFeaturesRow};
use crate::storage::{decode_row, decode_rows, tables, AnalysisStore, SelectQuery};
use anyhow::{Context, Result};
use tracing::{info, warn};

pub async fn fetch(store: &dyn AnalysisStore, key: &AnalysisKey) -> Result<Option<GpsDataAnalysisInfo>> {
    let query = query_for_key(tables::GPS, key).columns(&[
        "id",
        "total_time_spend_in_home_seconds",
        "time_period_active",
        "total_time_spend_travelling_seconds",
        "number_of_unique_locations",
        "first_move_timestamp_after_3am",
        "average_time_spend_in_locations_hours",
        "cognitive_decision",
        "cognitive_score",
    ]);

    let Some(row) = store
        .select_optional(&query)
        .await
        .with_context(|| format!("读取 GPS 分析失败 ({})", key))?
    else {
        info!("{} 没有 GPS 分析记录", key);
        return Ok(None);
    };
    let parent: GpsAnalysisRow = decode_row(row)?;

    if parent.id.is_empty() {
        warn!("{} 的 GPS 分析记录缺少 id", key);
        return Ok(None);
    }

    // 空间特征与主表一对一
    let query = SelectQuery::from(tables::GPS_SPATIAL_FEATURES)
        .columns(&["max_distance_timestamp"])
        .eq("gps_data_analysis_id", parent.id.as_str());
    let spatial = store
        .select_optional(&query)
        .await
        .with_context(|| format!("读取 GPS 空间特征失败 (analysis {})", parent.id))?
        .map(decode_row::<GpsSpatialFeaturesRow>)
        .transpose()?;

    let query = SelectQuery::from(tables::GPS_KEY_LOCATIONS)
        .columns(&["key_location_id", "latitude", "longitude", "key_loc_type"])
        .eq("gps_data_analysis_id", parent.id.as_str());
    let rows = store
        .select_many(&query)
        .await
        .with_context(|| format!("读取 GPS 关键地点失败 (analysis {})", parent.id))?;
    let key_locations: Vec<KeyLocation> = decode_rows(rows)?;

    Ok(Some(GpsDataAnalysisInfo {
        id: parent.id,
        total_time_spend_in_home_seconds: parent.total_time_spend_in_home_seconds,
        time_period_active: parent.time_period_active,
        total_time_spend_travelling_seconds: parent.total_time_spend_travelling_seconds,
        number_of_unique_locations: parent.number_of_unique_locations,
        first_move_timestamp_after_three_am: parent.first_move_timestamp_after_3am,
        average_time_spend_in_locations_hours: parent.average_time_spend_in_locations_hours,
        cognitive_decision: parent.cognitive_decision,
        cognitive_score: parent.cognitive_score,
        max_distance_timestamp: spatial.and_then(|s| s.max_distance_timestamp),
        key_locations,
    }))
}

pub async fn cognitive_score(store: &dyn AnalysisStore, key: &AnalysisKey) -> Result<Option<f64>> {
    first_cognitive_score(store, tables::GPS, key).await
}
