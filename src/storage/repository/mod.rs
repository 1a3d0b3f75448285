// Repository 抽象层 - 定义分析数据源的查询接口

pub mod rest;
pub mod sqlite;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::utils::validate_identifier;

/// 查询结果行（列名 -> 值）
pub type Row = serde_json::Map<String, Value>;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// 单表查询：列投影 + 等值过滤 + 可选排序和条数限制
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<(String, Value)>,
    pub order: Option<(String, SortOrder)>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// 添加等值过滤条件
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.order = Some((column.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 校验表名和列名，拼接 SQL 或 URL 之前必须调用
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table).map_err(|e| anyhow!(e))?;
        for column in &self.columns {
            validate_identifier(column).map_err(|e| anyhow!(e))?;
        }
        for (column, _) in &self.filters {
            validate_identifier(column).map_err(|e| anyhow!(e))?;
        }
        if let Some((column, _)) = &self.order {
            validate_identifier(column).map_err(|e| anyhow!(e))?;
        }
        Ok(())
    }
}

/// 分析数据源接口 - 所有数据源实现必须实现此 trait
///
/// 只读：本模块从不写入分析数据库
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// 查询零到多行
    async fn select_many(&self, query: &SelectQuery) -> Result<Vec<Row>>;

    /// 查询恰好一行，零行或多行都视为错误
    async fn select_one(&self, query: &SelectQuery) -> Result<Row> {
        match self.select_optional(query).await? {
            Some(row) => Ok(row),
            None => bail!("{} 中没有匹配的记录", query.table),
        }
    }

    /// 查询至多一行，零行返回 None，多行视为错误
    async fn select_optional(&self, query: &SelectQuery) -> Result<Option<Row>> {
        let mut rows = self.select_many(query).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => bail!("{} 中期望至多一条记录，实际返回 {} 条", query.table, n),
        }
    }

    /// 获取数据源类型标识
    fn store_type(&self) -> &str;
}

/// 将查询结果行解码为具体类型
pub fn decode_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    serde_json::from_value(Value::Object(row))
        .with_context(|| format!("解码 {} 失败", std::any::type_name::<T>()))
}

/// 批量解码
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter().map(decode_row).collect()
}
