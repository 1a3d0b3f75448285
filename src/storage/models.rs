// 数据模型定义 - 分析数据库的行结构

use serde::{Deserialize, Deserializer, Serialize};

/// 分析数据库中的表名
pub mod tables {
    pub const SLEEP: &str = "Sleep_Data_Analysis";
    pub const ACTIVITY: &str = "Activity_Data_Analysis";
    pub const ACTIVITY_DISTRIBUTION: &str = "Activity_Distribution_Per_Day_Section_Analysis";
    pub const CALL: &str = "Call_Data_Analysis";
    pub const GPS: &str = "GPS_Data_Analysis";
    pub const GPS_SPATIAL_FEATURES: &str = "GPS_Spatial_Features";
    pub const GPS_KEY_LOCATIONS: &str = "GPS_Key_Locations";
    pub const DEVICE_INTERACTION: &str = "Device_Interaction_Data_Analysis";
    pub const CIRCADIAN_SCREEN_TIME: &str = "Circadian_Screen_Time_Analysis";
    pub const DAILY_ANALYSES: &str = "Daily_Analyses";
    pub const TYPING_STATS: &str = "Daily_Analysis_Typing_Stats";
    pub const USERS: &str = "Users";
    pub const BASELINE_METRICS: &str = "Baseline_Metrics";
}

/// 睡眠分析记录（主睡眠或小睡）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub estimated_start_date_time: String,
    pub estimated_end_date_time: String,
    pub total_duration: f64,
    pub actual_duration: f64,
    pub sleep_screen_time: Option<f64>,
    #[serde(default)]
    pub sleep_quality_score: Option<f64>, // 小睡没有质量分
    #[serde(rename = "type")]
    pub sleep_type: String, // main_sleep / nap_sleep
    #[serde(default)]
    pub cognitive_score: Option<f64>,
    #[serde(default)]
    pub cognitive_decision: Option<String>,
}

impl SleepRecord {
    pub const MAIN_SLEEP: &'static str = "main_sleep";
    pub const NAP_SLEEP: &'static str = "nap_sleep";

    pub fn is_main(&self) -> bool {
        self.sleep_type.eq_ignore_ascii_case(Self::MAIN_SLEEP)
    }

    pub fn is_nap(&self) -> bool {
        self.sleep_type.eq_ignore_ascii_case(Self::NAP_SLEEP)
    }
}

/// GPS 分析主表行
#[derive(Debug, Clone, Deserialize)]
pub struct GpsAnalysisRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub total_time_spend_in_home_seconds: Option<f64>,
    pub time_period_active: Option<i64>,
    pub total_time_spend_travelling_seconds: Option<f64>,
    pub number_of_unique_locations: Option<i64>,
    pub first_move_timestamp_after_3am: Option<String>,
    pub average_time_spend_in_locations_hours: Option<f64>,
    pub cognitive_decision: Option<String>,
    pub cognitive_score: Option<f64>,
}

/// GPS 空间特征（与主表一对一）
#[derive(Debug, Clone, Deserialize)]
pub struct GpsSpatialFeaturesRow {
    pub max_distance_timestamp: Option<String>,
}

/// 关键地点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLocation {
    pub key_location_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub key_loc_type: String,
}

/// 活动分析主表行
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityAnalysisRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub activity_entropy: Option<f64>,
    pub inactivity_percentage: Option<f64>,
    pub daily_active_minutes: Option<f64>,
    pub cognitive_score: Option<f64>,
    pub cognitive_decision: Option<String>,
}

/// 各时段活动分布
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDistribution {
    pub day_section: Option<String>,
    pub in_vehicle: Option<f64>,
    pub on_bicycle: Option<f64>,
    pub on_foot: Option<f64>,
    pub still: Option<f64>,
    pub tilting: Option<f64>,
    pub unknown: Option<f64>,
}

/// 通话分析（单表，无子表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDataAnalysisInfo {
    pub day_call_ratio: Option<f64>,
    pub night_call_ratio: Option<f64>,
    pub avg_call_duration: Option<f64>,
    pub total_calls_in_a_day: Option<i64>,
    pub missed_call_ratio: Option<f64>,
    pub cognitive_score: Option<f64>,
    pub cognitive_decision: Option<String>,
}

/// 设备交互分析主表行
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInteractionRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub total_screen_time_sec: Option<f64>,
    pub total_low_light_time_sec: Option<f64>,
    pub total_device_drop_events: Option<i64>,
    pub cognitive_score: Option<f64>,
    pub cognitive_decision: Option<String>,
}

/// 昼夜屏幕时间分布
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircadianScreenTime {
    pub day_section: Option<String>,
    pub duration: Option<f64>,
    pub percentage: Option<f64>,
}

/// 每日分析记录（打字分析的父表）
#[derive(Debug, Clone, Deserialize)]
pub struct DailyAnalysisRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub user_uid: String,
    pub day_analyzed: String,
}

/// 打字统计中的认知得分
#[derive(Debug, Clone, Deserialize)]
pub struct TypingStatsRow {
    pub total_typing_cognitive_score: Option<f64>,
}

/// 打字表现各等级占比（0-100）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingCategoryPercentages {
    #[serde(deserialize_with = "deserialize_id")]
    pub analysis_id: String,
    pub percentage_critical: f64,
    pub percentage_very_bad: f64,
    pub percentage_normal: f64,
    pub percentage_very_good: f64,
    pub percentage_excellent: f64,
}

impl TypingCategoryPercentages {
    /// 各等级占比之和，有效数据应约等于 100
    pub fn total(&self) -> f64 {
        self.percentage_critical
            + self.percentage_very_bad
            + self.percentage_normal
            + self.percentage_very_good
            + self.percentage_excellent
    }
}

/// 打字应用侧的用户记录
#[derive(Debug, Clone, Deserialize)]
pub struct TypingAccountRow {
    pub user_uid: String,
}

/// 仅包含认知得分的投影行
#[derive(Debug, Clone, Deserialize)]
pub struct CognitiveScoreRow {
    pub cognitive_score: Option<f64>,
}

/// 基线指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetrics {
    pub metric_name: String,
    pub baseline_mean: f64,
    pub baseline_std: f64,
    pub baseline_median: f64,
    pub baseline_mad: f64,
}

// 自定义反序列化：数字或字符串主键 -> String
// 远程库主键为 uuid 字符串，本地 SQLite 镜像为整数
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(s) => Ok(s),
        RawId::Int(n) => Ok(n.to_string()),
        RawId::Float(f) if f.fract() == 0.0 => Ok((f as i64).to_string()),
        RawId::Float(f) => Err(serde::de::Error::custom(format!("无效的主键: {}", f))),
    }
}
