//! 各类别分析数据的读取
//!
//! 每个类别提供两个查询：
//! - `fetch`：读取完整的分析记录（含子表）
//! - `cognitive_score`：只读取当天的认知得分

pub mod activity;
pub mod call;
pub mod device_interaction;
pub mod gps;
pub mod sleep;
pub mod typing;

use crate::models::AnalysisKey;
use crate::storage::models::CognitiveScoreRow;
use crate::storage::{decode_rows, AnalysisStore, SelectQuery};
use anyhow::{Context, Result};

/// 按用户和日期过滤的查询
pub(crate) fn query_for_key(table: &str, key: &AnalysisKey) -> SelectQuery {
    SelectQuery::from(table)
        .eq("user_uid", key.user_uid.as_str())
        .eq("day_analyzed", key.day_analyzed())
}

/// 读取某个表中第一个非空的认知得分
pub(crate) async fn first_cognitive_score(
    store: &dyn AnalysisStore,
    table: &str,
    key: &AnalysisKey,
) -> Result<Option<f64>> {
    let query = query_for_key(table, key).columns(&["day_analyzed", "user_uid", "cognitive_score"]);
    let rows = store
        .select_many(&query)
        .await
        .with_context(|| format!("读取 {} 的认知得分失败 ({})", table, key))?;

    let scores: Vec<CognitiveScoreRow> = decode_rows(rows)?;
    Ok(scores.into_iter().find_map(|row| row.cognitive_score))
}


#[cfg(test)]
mod tests {
    use super::test_support::TableStore;
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn key() -> AnalysisKey {
        AnalysisKey::new("U1", NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())
    }

    #[tokio::test]
    async fn test_first_non_null_score() {
        let store = TableStore::default().with(
            "Call_Data_Analysis",
            vec![
                json!({"user_uid": "U1", "day_analyzed": "2025-03-02", "cognitive_score": null}),
                json!({"user_uid": "U1", "day_analyzed": "2025-03-02", "cognitive_score": 0.42}),
                json!({"user_uid": "U2", "day_analyzed": "2025-03-02", "cognitive_score": -1.0}),
            ],
        );

        let score = first_cognitive_score(&store, "Call_Data_Analysis", &key())
            .await
            .unwrap();
        assert_eq!(score, Some(0.42));
    }

    #[tokio::test]
    async fn test_no_rows_is_none() {
        let store = TableStore::default();
        let score = first_cognitive_score(&store, "GPS_Data_Analysis", &key())
            .await
            .unwrap();
        assert_eq!(score, None);
    }
}
