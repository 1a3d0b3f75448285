//! 输入验证工具函数
//!
//! 提供各种输入参数的验证功能，防止SQL注入和无效输入

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::AnalysisKey;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("静态正则表达式"))
}

/// 验证表名/列名是否为安全的标识符
///
/// # 返回
/// - `Ok(())`: 验证通过
/// - `Err(String)`: 错误信息
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if !identifier_pattern().is_match(name) {
        return Err(format!("无效的标识符: {}", name));
    }
    Ok(())
}

/// 验证用户ID和日期 (YYYY-MM-DD)，构造分析键
///
/// # 返回
/// - `Ok(AnalysisKey)`: 验证通过
/// - `Err(String)`: 用户ID或日期为空，或日期格式错误
pub fn validate_analysis_key(user_uid: &str, date: &str) -> Result<AnalysisKey, String> {
    let user_uid = user_uid.trim();
    let date = date.trim();

    if user_uid.is_empty() || date.is_empty() {
        return Err("用户ID或日期为空".to_string());
    }

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| format!("无效的日期 {}: {}", date, e))?;

    Ok(AnalysisKey::new(user_uid, date))
}
