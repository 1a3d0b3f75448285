// 睡眠分析：主睡眠 + 小睡汇总

use super::{first_cognitive_score, query_for_key};
use crate::models::{AnalysisKey, DailySleepSummary, SleepRecord};
use crate::storage::{decode_rows, tables, AnalysisStore, SortOrder};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

const SLEEP_COLUMNS: &[&str] = &[
    "estimated_start_date_time",
    "estimated_end_date_time",
    "total_duration",
    "actual_duration",
    "sleep_screen_time",
    "sleep_quality_score",
    "type",
    "cognitive_score",
    "cognitive_decision",
];

/// 读取当天所有睡眠记录并汇总
pub async fn fetch(store: &dyn AnalysisStore, key: &AnalysisKey) -> Result<Option<DailySleepSummary>> {
    let query = query_for_key(tables::SLEEP, key)
        .columns(SLEEP_COLUMNS)
        .order_by("estimated_start_date_time", SortOrder::Ascending);

    let rows = store
        .select_many(&query)
        .await
        .with_context(|| format!("读取睡眠记录失败 ({})", key))?;
    let records: Vec<SleepRecord> = decode_rows(rows)?;

    if records.is_empty() {
        info!("{} 没有睡眠记录", key);
        return Ok(None);
    }
    debug!("{} 共 {} 条睡眠记录", key, records.len());

    let summary = summarize_sleep(records);
    if let Some(summary) = &summary {
        if summary.main_sleep_inferred {
            warn!("{} 没有 main_sleep 记录，使用最早的一条作为主睡眠", key);
        }
    }
    Ok(summary)
}

pub async fn cognitive_score(store: &dyn AnalysisStore, key: &AnalysisKey) -> Result<Option<f64>> {
    first_cognitive_score(store, tables::SLEEP, key).await
}

/// 汇总一天的睡眠记录，记录需按开始时间升序
///
/// 总时长包含所有记录；质量和认知字段只取自主睡眠。
/// 没有 main_sleep 时以第一条记录作为主睡眠。
pub fn summarize_sleep(records: Vec<SleepRecord>) -> Option<DailySleepSummary> {
    let total_duration = records.iter().map(|r| r.total_duration).sum();
    let actual_duration = records.iter().map(|r| r.actual_duration).sum();

    let (main, main_sleep_inferred) = match records.iter().find(|r| r.is_main()) {
        Some(main) => (main.clone(), false),
        None => (records.first()?.clone(), true),
    };

    let naps: Vec<SleepRecord> = records.into_iter().filter(|r| r.is_nap()).collect();
    let total_nap_duration = naps.iter().map(|r| r.total_duration).sum();

    Some(DailySleepSummary {
        estimated_start_date_time: main.estimated_start_date_time,
        estimated_end_date_time: main.estimated_end_date_time,
        total_duration,
        actual_duration,
        sleep_screen_time: main.sleep_screen_time,
        sleep_quality_score: main.sleep_quality_score,
        cognitive_score: main.cognitive_score,
        cognitive_decision: main.cognitive_decision,
        main_sleep_duration: main.total_duration,
        total_nap_duration,
        number_of_naps: naps.len(),
        nap_details: naps,
        main_sleep_inferred,
    })
}
