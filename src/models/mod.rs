// 数据模型模块 - 定义所有的数据结构

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// 重新导出存储层的行类型
pub use crate::storage::models::{
    ActivityDistribution, BaselineMetrics, CallDataAnalysisInfo, CircadianScreenTime, KeyLocation,
    SleepRecord, TypingCategoryPercentages,
};
pub use crate::storage::{CacheConfig, StoreConfig};

/// 综合表现缺少决策标签时使用的占位标签
pub const NO_DATA_LABEL: &str = "No Data";

/// 分析键：某个用户某一天的分析
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisKey {
    pub user_uid: String,
    pub date: NaiveDate,
}

impl AnalysisKey {
    pub fn new(user_uid: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_uid: user_uid.into(),
            date,
        }
    }

    /// 数据库中 day_analyzed 字段的格式 (YYYY-MM-DD)
    pub fn day_analyzed(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.user_uid, self.day_analyzed())
    }
}

/// 认知决策等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionLabel {
    #[serde(rename = "Critical")]
    Critical,
    #[serde(rename = "Very Bad")]
    VeryBad,
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Very Good")]
    VeryGood,
    #[serde(rename = "Excellent")]
    Excellent,
}

impl DecisionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionLabel::Critical => "Critical",
            DecisionLabel::VeryBad => "Very Bad",
            DecisionLabel::Normal => "Normal",
            DecisionLabel::VeryGood => "Very Good",
            DecisionLabel::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(DecisionLabel::Critical),
            "very bad" | "very_bad" => Ok(DecisionLabel::VeryBad),
            "normal" => Ok(DecisionLabel::Normal),
            "very good" | "very_good" => Ok(DecisionLabel::VeryGood),
            "excellent" => Ok(DecisionLabel::Excellent),
            other => Err(format!("未知的决策等级: {}", other)),
        }
    }
}

/// 数据类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisCategory {
    Sleep,
    Activity,
    Call,
    Gps,
    DeviceInteraction,
    Typing,
}

impl AnalysisCategory {
    pub const ALL: [AnalysisCategory; 6] = [
        AnalysisCategory::Sleep,
        AnalysisCategory::Activity,
        AnalysisCategory::Call,
        AnalysisCategory::Gps,
        AnalysisCategory::DeviceInteraction,
        AnalysisCategory::Typing,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisCategory::Sleep => "Sleep",
            AnalysisCategory::Activity => "Activity",
            AnalysisCategory::Call => "Call",
            AnalysisCategory::Gps => "GPS Mobility",
            AnalysisCategory::DeviceInteraction => "Device Interaction",
            AnalysisCategory::Typing => "Typing",
        }
    }
}

/// 单个类别的认知得分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: f64,
    pub decision: DecisionLabel,
}

/// 认知得分汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveScoresSummary {
    pub user_uid: String,
    pub analysis_date: NaiveDate,
    pub sleep: Option<CategoryScore>,
    pub activity: Option<CategoryScore>,
    pub call: Option<CategoryScore>,
    pub gps: Option<CategoryScore>,
    pub device_interaction: Option<CategoryScore>,
    pub typing: Option<CategoryScore>,
    pub mean_cognitive_score: Option<f64>,
    pub total_cognitive_decision: Option<DecisionLabel>,
    pub total_scores_available: usize,
}

impl CognitiveScoresSummary {
    pub fn category(&self, category: AnalysisCategory) -> Option<CategoryScore> {
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

/// 每日睡眠汇总（主睡眠 + 所有小睡）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySleepSummary {
    // 主睡眠信息
    pub estimated_start_date_time: String,
    pub estimated_end_date_time: String,
    pub total_duration: f64, // 主睡眠 + 所有小睡
    pub actual_duration: f64,
    pub sleep_screen_time: Option<f64>,
    pub sleep_quality_score: Option<f64>, // 仅主睡眠有
    pub cognitive_score: Option<f64>,
    pub cognitive_decision: Option<String>,

    // 汇总信息
    pub main_sleep_duration: f64,
    pub total_nap_duration: f64,
    pub number_of_naps: usize,
    pub nap_details: Vec<SleepRecord>,
    /// 没有 main_sleep 标记时为 true，此时主睡眠取自最早的一条记录
    pub main_sleep_inferred: bool,
}

/// GPS 移动性分析（主表 + 空间特征 + 关键地点）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsDataAnalysisInfo {
    pub id: String,
    pub total_time_spend_in_home_seconds: Option<f64>,
    pub time_period_active: Option<i64>,
    pub total_time_spend_travelling_seconds: Option<f64>,
    pub number_of_unique_locations: Option<i64>,
    pub first_move_timestamp_after_three_am: Option<String>,
    pub average_time_spend_in_locations_hours: Option<f64>,
    pub cognitive_decision: Option<String>,
    pub cognitive_score: Option<f64>,
    /// 离家最远的时间点
    pub max_distance_timestamp: Option<String>,
    pub key_locations: Vec<KeyLocation>,
}

/// 活动分析（主表 + 各时段分布）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDataAnalysisInfo {
    pub id: String,
    pub activity_entropy: Option<f64>,
    pub inactivity_percentage: Option<f64>,
    pub daily_active_minutes: Option<f64>,
    pub cognitive_score: Option<f64>,
    pub cognitive_decision: Option<String>,
    pub distribution_per_day_section: Vec<ActivityDistribution>,
}

/// 设备交互分析（主表 + 昼夜屏幕时间）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInteractionAnalysisInfo {
    pub id: String,
    pub total_screen_time_sec: Option<f64>,
    pub total_low_light_time_sec: Option<f64>,
    pub total_device_drop_events: Option<i64>,
    pub cognitive_score: Option<f64>,
    pub cognitive_decision: Option<String>,
    pub circadian_screen_time: Vec<CircadianScreenTime>,
}

/// 综合表现：平均得分 + 决策
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallPerformance {
    pub score: f64,
    pub decision: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// 日志级别: trace/debug/info/warn/error
    pub level: String,
    /// 日志文件目录，为空时只输出到控制台
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// 引擎配置（部分更新）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 数据源配置
    pub store: Option<StoreConfig>,
    /// 缓存配置
    pub cache: Option<CacheConfig>,
    /// 日志配置
    pub logging: Option<LoggingConfig>,
}

/// 持久化的引擎配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedEngineConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
