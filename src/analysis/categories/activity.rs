// 活动分析：主表 + 各时段活动分布

use super::{first_cognitive_score, query_for_key};
use crate::models::{ActivityDataAnalysisInfo, ActivityDistribution, AnalysisKey};
use crate::storage::models::ActivityAnalysisRow;
use crate::storage::{decode_row, decode_rows, tables, AnalysisStore, SelectQuery};
use anyhow::{Context, Result};
use tracing::{info, warn};

pub async fn fetch(
    store: &dyn AnalysisStore,
    key: &AnalysisKey,
) -> Result<Option<ActivityDataAnalysisInfo>> {
    let query = query_for_key(tables::ACTIVITY, key).columns(&[
        "id",
        "activity_entropy",
        "inactivity_percentage",
        "daily_active_minutes",
        "cognitive_score",
        "cognitive_decision",
    ]);

    let Some(row) = store
        .select_optional(&query)
        .await
        .with_context(|| format!("读取活动分析失败 ({})", key))?
    else {
        info!("{} 没有活动分析记录", key);
        return Ok(None);
    };
    let parent: ActivityAnalysisRow = decode_row(row)?;

    if parent.id.is_empty() {
        warn!("{} 的活动分析记录缺少 id", key);
        return Ok(None);
    }

    let query = SelectQuery::from(tables::ACTIVITY_DISTRIBUTION)
        .columns(&[
            "day_section",
            "in_vehicle",
            "on_bicycle",
            "on_foot",
            "still",
            "tilting",
            "unknown",
        ])
        .eq("activity_data_analysis_id", parent.id.as_str());
    let rows = store
        .select_many(&query)
        .await
        .with_context(|| format!("读取活动时段分布失败 (analysis {})", parent.id))?;
    let distribution: Vec<ActivityDistribution> = decode_rows(rows)?;

    Ok(Some(ActivityDataAnalysisInfo {
        id: parent.id,
        activity_entropy: parent.activity_entropy,
        inactivity_percentage: parent.inactivity_percentage,
        daily_active_minutes: parent.daily_active_minutes,
        cognitive_score: parent.cognitive_score,
        cognitive_decision: parent.cognitive_decision,
        distribution_per_day_section: distribution,
    }))
}

pub async fn cognitive_score(store: &dyn AnalysisStore, key: &AnalysisKey) -> Result<Option<f64>> {
    first_cognitive_score(store, tables::ACTIVITY, key).await
}
