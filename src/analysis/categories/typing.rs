// 打字分析：通过邮箱关联打字应用用户，再读取每日打字统计

use crate::analysis::identity::{resolve_typing_user, AccountDirectory};
use crate::models::{AnalysisKey, TypingCategoryPercentages};
use crate::storage::models::{DailyAnalysisRow, TypingStatsRow};
use crate::storage::{decode_row, decode_rows, tables, AnalysisStore, Row, SelectQuery};
use anyhow::{Context, Result};
use tracing::info;

/// 读取打字应用用户当天的每日分析记录
async fn daily_analysis(
    store: &dyn AnalysisStore,
    typing_uid: &str,
    key: &AnalysisKey,
) -> Result<Option<DailyAnalysisRow>> {
    let query = SelectQuery::from(tables::DAILY_ANALYSES)
        .columns(&["id", "user_uid", "day_analyzed"])
        .eq("user_uid", typing_uid)
        .eq("day_analyzed", key.day_analyzed());

    let row = store
        .select_optional(&query)
        .await
        .with_context(|| format!("读取每日分析失败 ({}_{})", typing_uid, key.day_analyzed()))?;

    match row.map(decode_row::<DailyAnalysisRow>).transpose()? {
        Some(analysis) if !analysis.id.is_empty() => Ok(Some(analysis)),
        _ => {
            info!("打字应用用户 {} 在 {} 没有每日分析", typing_uid, key.day_analyzed());
            Ok(None)
        }
    }
}

async fn typing_stats(store: &dyn AnalysisStore, analysis_id: &str, columns: &[&str]) -> Result<Vec<Row>> {
    let query = SelectQuery::from(tables::TYPING_STATS)
        .columns(columns)
        .eq("analysis_id", analysis_id);
    store
        .select_many(&query)
        .await
        .with_context(|| format!("读取打字统计失败 (analysis {})", analysis_id))
}

/// 读取打字表现各等级占比，`key.user_uid` 为调用者的用户ID
pub async fn fetch(
    store: &dyn AnalysisStore,
    accounts: &dyn AccountDirectory,
    key: &AnalysisKey,
) -> Result<Option<TypingCategoryPercentages>> {
    let Some(typing_uid) = resolve_typing_user(store, accounts, &key.user_uid).await? else {
        return Ok(None);
    };
    let Some(analysis) = daily_analysis(store, &typing_uid, key).await? else {
        return Ok(None);
    };

    let rows = typing_stats(
        store,
        &analysis.id,
        &[
            "analysis_id",
            "percentage_critical",
            "percentage_very_bad",
            "percentage_normal",
            "percentage_very_good",
            "percentage_excellent",
        ],
    )
    .await?;

    match rows.into_iter().next() {
        Some(row) => {
            let percentages: TypingCategoryPercentages = decode_row(row)?;
            info!(
                "{} 打字等级占比: Critical {:.1}%, Very Bad {:.1}%, Normal {:.1}%, Very Good {:.1}%, Excellent {:.1}%",
                key,
                percentages.percentage_critical,
                percentages.percentage_very_bad,
                percentages.percentage_normal,
                percentages.percentage_very_good,
                percentages.percentage_excellent
            );
            Ok(Some(percentages))
        }
        None => {
            info!("每日分析 {} 没有打字统计", analysis.id);
            Ok(None)
        }
    }
}

/// 读取打字认知得分，同样先解析打字应用用户ID
pub async fn cognitive_score(
    store: &dyn AnalysisStore,
    accounts: &dyn AccountDirectory,
    key: &AnalysisKey,
) -> Result<Option<f64>> {
    let Some(typing_uid) = resolve_typing_user(store, accounts, &key.user_uid).await? else {
        return Ok(None);
    };
    let Some(analysis) = daily_analysis(store, &typing_uid, key).await? else {
        return Ok(None);
    };

    let rows = typing_stats(store, &analysis.id, &["total_typing_cognitive_score", "analysis_id"]).await?;
    let stats: Vec<TypingStatsRow> = decode_rows(rows)?;
    Ok(stats.into_iter().find_map(|s| s.total_typing_cognitive_score))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TableStore;
    use super::*;
    use crate::analysis::identity::StaticAccountDirectory;
    use chrono::NaiveDate;
    use serde_json::json;

    fn key(user: &str) -> AnalysisKey {
        AnalysisKey::new(user, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())
    }

    fn store() -> TableStore {
        TableStore::default()
            .with("Users", vec![json!({"user_uid": "lb-1", "app_origin": "ada@example.com"})])
            .with(
                "Daily_Analyses",
                vec![json!({"id": 31, "user_uid": "lb-1", "day_analyzed": "2025-03-02"})],
            )
            .with(
                "Daily_Analysis_Typing_Stats",
                vec![
                    json!({
                        "analysis_id": 31, "percentage_critical": 5.0, "percentage_very_bad": 10.0,
                        "percentage_normal": 60.0, "percentage_very_good": 20.0, "percentage_excellent": 5.0,
                        "total_typing_cognitive_score": null
                    }),
                    json!({
                        "analysis_id": 31, "percentage_critical": 0.0, "percentage_very_bad": 0.0,
                        "percentage_normal": 100.0, "percentage_very_good": 0.0, "percentage_excellent": 0.0,
                        "total_typing_cognitive_score": 0.45
                    }),
                ],
            )
    }

    #[tokio::test]
    async fn test_fetch_takes_first_stats_row() {
        let accounts = StaticAccountDirectory::new().with("U1", "ada@example.com");
        let percentages = fetch(&store(), &accounts, &key("U1")).await.unwrap().unwrap();

        assert_eq!(percentages.analysis_id, "31");
        assert_eq!(percentages.percentage_normal, 60.0);
        assert_eq!(percentages.total(), 100.0);
    }

    #[tokio::test]
    async fn test_cognitive_score_uses_typing_namespace() {
        let accounts = StaticAccountDirectory::new().with("U1", "ada@example.com");
        let score = cognitive_score(&store(), &accounts, &key("U1")).await.unwrap();
        assert_eq!(score, Some(0.45));
    }

    #[tokio::test]
    async fn test_unresolved_user_stops_before_daily_analysis() {
        let store = store();
        let accounts = StaticAccountDirectory::new();

        assert!(fetch(&store, &accounts, &key("U1")).await.unwrap().is_none());
        assert_eq!(store.query_count("Daily_Analyses"), 0);
    }

    #[tokio::test]
    async fn test_no_daily_analysis_for_day() {
        let accounts = StaticAccountDirectory::new().with("U1", "ada@example.com");
        let other_day = AnalysisKey::new("U1", NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        let store = store();

        assert!(fetch(&store, &accounts, &other_day).await.unwrap().is_none());
        assert_eq!(store.query_count("Daily_Analysis_Typing_Stats"), 0);
    }
}
