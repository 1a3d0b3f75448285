// 通话分析：单表

use super::{first_cognitive_score, query_for_key};
use crate::models::{AnalysisKey, CallDataAnalysisInfo};
use crate::storage::{decode_row, tables, AnalysisStore};
use anyhow::{Context, Result};
use tracing::info;

pub async fn fetch(store: &dyn AnalysisStore, key: &AnalysisKey) -> Result<Option<CallDataAnalysisInfo>> {
    let query = query_for_key(tables::CALL, key).columns(&[
        "day_call_ratio",
        "night_call_ratio",
        "avg_call_duration",
        "total_calls_in_a_day",
        "missed_call_ratio",
        "cognitive_score",
        "cognitive_decision",
    ]);

    match store
        .select_optional(&query)
        .await
        .with_context(|| format!("读取通话分析失败 ({})", key))?
    {
        Some(row) => Ok(Some(decode_row(row)?)),
        None => {
            info!("{} 没有通话分析记录", key);
            Ok(None)
        }
    }
}

pub async fn cognitive_score(store: &dyn AnalysisStore, key: &AnalysisKey) -> Result<Option<f64>> {
    first_cognitive_score(store, tables::CALL, key).await
}
