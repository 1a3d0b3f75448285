// 集成测试共用的内存数据源

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use cognitive_insights::storage::{AnalysisStore, Row, SelectQuery, SortOrder};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// 按表名存放行的数据源，记录每个表的查询次数
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Row>>,
    failing: HashSet<String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| row.as_object().cloned())
            .collect::<Vec<_>>();
        self.tables.entry(name.to_string()).or_default().extend(rows);
        self
    }

    /// 查询该表时返回错误
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn calls(&self, table: &str) -> usize {
        self.calls.lock().unwrap().get(table).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

fn matches(row: &Row, column: &str, expected: &Value) -> bool {
    match (row.get(column), expected) {
        (Some(Value::Number(n)), Value::String(s)) => n.to_string() == *s,
        (Some(actual), expected) => actual == expected,
        (None, _) => false,
    }
}

fn compare(a: &Row, b: &Row, column: &str) -> std::cmp::Ordering {
    let key = |row: &Row| row.get(column).map(|v| v.to_string()).unwrap_or_default();
    key(a).cmp(&key(b))
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn select_many(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        query.validate()?;
        *self
            .calls
            .lock()
            .unwrap()
            .entry(query.table.clone())
            .or_default() += 1;

        if self.failing.contains(&query.table) {
            bail!("connection reset while reading {}", query.table);
        }

        let mut rows: Vec<Row> = self
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|(c, v)| matches(row, c, v)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((column, order)) = &query.order {
            rows.sort_by(|a, b| compare(a, b, column));
            if *order == SortOrder::Descending {
                rows.reverse();
            }
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }

        Ok(rows)
    }

    fn store_type(&self) -> &str {
        "memory"
    }
}
