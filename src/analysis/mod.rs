//! 分析聚合模块
//!
//! 负责核心的聚合业务逻辑，包括：
//! - 各类别分析数据的读取与关联（categories）
//! - 打字应用用户ID关联（identity）
//! - 认知得分汇总与分级（cognitive）
//! - 对外的表现计算与缓存管理（performance）

pub mod categories;
pub mod cognitive;
pub mod identity;
pub mod performance;

// 重新导出常用结构体和函数
pub use categories::sleep::summarize_sleep;
pub use cognitive::{classify_decision, summarize, CategoryScores};
pub use identity::{resolve_typing_user, AccountDirectory, StaticAccountDirectory};
pub use performance::PerformanceService;
