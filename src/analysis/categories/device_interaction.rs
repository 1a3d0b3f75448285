// 设备交互分析：主表 + 昼夜屏幕时间

use super::{first_cognitive_score, query_for_key};
use crate::models::{AnalysisKey, CircadianScreenTime, DeviceInteractionAnalysisInfo};
use crate::storage::models::DeviceInteractionRow;
use crate::storage::{decode_row, decode_rows, tables, AnalysisStore, SelectQuery};
use anyhow::{Context, Result};
use tracing::{info, warn};

pub async fn fetch(
    store: &dyn AnalysisStore,
    key: &AnalysisKey,
) -> Result<Option<DeviceInteractionAnalysisInfo>> {
    let query = query_for_key(tables::DEVICE_INTERACTION, key).columns(&[
        "id",
        "total_screen_time_sec",
        "total_low_light_time_sec",
        "total_device_drop_events",
        "cognitive_score",
        "cognitive_decision",
    ]);

    let Some(row) = store
        .select_optional(&query)
        .await
        .with_context(|| format!("读取设备交互分析失败 ({})", key))?
    else {
        info!("{} 没有设备交互分析记录", key);
        return Ok(None);
    };
    let parent: DeviceInteractionRow = decode_row(row)?;

    if parent.id.is_empty() {
        warn!("{} 的设备交互分析记录缺少 id", key);
        return Ok(None);
    }

    let query = SelectQuery::from(tables::CIRCADIAN_SCREEN_TIME)
        .columns(&["day_section", "duration", "percentage"])
        .eq("daily_interaction_data_analysis_id", parent.id.as_str());
    let rows = store
        .select_many(&query)
        .await
        .with_context(|| format!("读取昼夜屏幕时间失败 (analysis {})", parent.id))?;
    let circadian_screen_time: Vec<CircadianScreenTime> = decode_rows(rows)?;

    Ok(Some(DeviceInteractionAnalysisInfo {
        id: parent.id,
        total_screen_time_sec: parent.total_screen_time_sec,
        total_low_light_time_sec: parent.total_low_light_time_sec,
        total_device_drop_events: parent.total_device_drop_events,
        cognitive_score: parent.cognitive_score,
        cognitive_decision: parent.cognitive_decision,
        circadian_screen_time,
    }))
}

pub async fn cognitive_score(store: &dyn AnalysisStore, key: &AnalysisKey) -> Result<Option<f64>> {
    first_cognitive_score(store, tables::DEVICE_INTERACTION, key).await
}
