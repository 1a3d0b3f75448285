//! 认知得分汇总
//!
//! 并发读取六个类别的认知得分，取已有得分的算术平均并分级。
//! 缺失的类别不参与平均（不按 0 计）。

use super::categories::{activity, call, device_interaction, gps, sleep, typing};
use super::identity::AccountDirectory;
use crate::models::{AnalysisCategory, AnalysisKey, CategoryScore, CognitiveScoresSummary, DecisionLabel};
use crate::storage::AnalysisStore;
use anyhow::Result;
use tracing::{debug, error};

/// 按得分分级，类别得分和平均得分使用同一套阈值
pub fn classify_decision(score: f64) -> DecisionLabel {
    if score > 0.965 {
        DecisionLabel::Excellent
    } else if score > 0.586 {
        DecisionLabel::VeryGood
    } else if score < -0.952 {
        DecisionLabel::Critical
    } else if score < -0.575 {
        DecisionLabel::VeryBad
    } else {
        DecisionLabel::Normal
    }
}

/// 六个类别的原始得分
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryScores {
    pub sleep: Option<f64>,
    pub activity: Option<f64>,
    pub call: Option<f64>,
    pub gps: Option<f64>,
    pub device_interaction: Option<f64>,
    pub typing: Option<f64>,
}

impl CategoryScores {
    pub fn get(&self, category: AnalysisCategory) -> Option<f64> {
        match category {
            AnalysisCategory::Sleep => self.sleep,
            AnalysisCategory::Activity => self.activity,
            AnalysisCategory::Call => self.call,
            AnalysisCategory::Gps => self.gps,
            AnalysisCategory::DeviceInteraction => self.device_interaction,
            AnalysisCategory::Typing => self.typing,
        }
    }
}

fn scored(score: Option<f64>) -> Option<CategoryScore> {
    score.map(|score| CategoryScore {
        score,
        decision: classify_decision(score),
    })
}

/// 由各类别得分计算汇总
pub fn summarize(key: &AnalysisKey, scores: CategoryScores) -> CognitiveScoresSummary {
    let present: Vec<f64> = AnalysisCategory::ALL
        .iter()
        .filter_map(|category| scores.get(*category))
        .collect();

    let mean_cognitive_score = if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    };

    CognitiveScoresSummary {
        user_uid: key.user_uid.clone(),
        analysis_date: key.date,
        sleep: scored(scores.sleep),
        activity: scored(scores.activity),
        call: scored(scores.call),
        gps: scored(scores.gps),
        device_interaction: scored(scores.device_interaction),
        typing: scored(scores.typing),
        mean_cognitive_score,
        total_cognitive_decision: mean_cognitive_score.map(classify_decision),
        total_scores_available: present.len(),
    }
}

/// 单个类别读取失败时记录日志并视为缺失
fn isolate(category: AnalysisCategory, key: &AnalysisKey, result: Result<Option<f64>>) -> Option<f64> {
    match result {
        Ok(score) => {
            debug!("{} [{}] 认知得分: {:?}", key, category.display_name(), score);
            score
        }
        Err(e) => {
            error!("读取 {} [{}] 认知得分失败: {:#}", key, category.display_name(), e);
            None
        }
    }
}

/// 并发读取六个类别的认知得分
pub async fn collect_scores(
    store: &dyn AnalysisStore,
    accounts: &dyn AccountDirectory,
    key: &AnalysisKey,
) -> CategoryScores {
    let (sleep, activity, call, gps, device_interaction, typing) = tokio::join!(
        sleep::cognitive_score(store, key),
        activity::cognitive_score(store, key),
        call::cognitive_score(store, key),
        gps::cognitive_score(store, key),
        device_interaction::cognitive_score(store, key),
        typing::cognitive_score(store, accounts, key),
    );

    CategoryScores {
        sleep: isolate(AnalysisCategory::Sleep, key, sleep),
        activity: isolate(AnalysisCategory::Activity, key, activity),
        call: isolate(AnalysisCategory::Call, key, call),
        gps: isolate(AnalysisCategory::Gps, key, gps),
        device_interaction: isolate(AnalysisCategory::DeviceInteraction, key, device_interaction),
        typing: isolate(AnalysisCategory::Typing, key, typing),
    }
}
