// SQLite 数据源实现 - 分析数据库的本地镜像

use super::{AnalysisStore, Row, SelectQuery, SortOrder};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{Number, Value};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tracing::{debug, info};

/// SQLite 数据源实现
pub struct SqliteAnalysisStore {
    pool: SqlitePool,
}

impl SqliteAnalysisStore {
    /// 创建新的 SQLite 数据库连接
    pub async fn new(db_path: &str) -> Result<Self> {
        info!("初始化 SQLite 分析数据源: {}", db_path);

        // 确保数据库文件的目录存在
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        // 创建连接池
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .idle_timeout(std::time::Duration::from_secs(180))
            .max_lifetime(std::time::Duration::from_secs(1800))
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await?;

        Ok(Self { pool })
    }

    /// 使用已有连接池
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 获取连接池引用
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// 拼接 SELECT 语句，标识符必须已经校验
pub(crate) fn build_select_sql(query: &SelectQuery) -> String {
    let columns = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!("SELECT {} FROM \"{}\"", columns, query.table);

    if !query.filters.is_empty() {
        let conditions = query
            .filters
            .iter()
            .map(|(column, _)| format!("\"{}\" = ?", column))
            .collect::<Vec<_>>()
            .join(" AND ");
        sql.push_str(" WHERE ");
        sql.push_str(&conditions);
    }

    if let Some((column, order)) = &query.order {
        let direction = match order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        sql.push_str(&format!(" ORDER BY \"{}\" {}", column, direction));
    }

    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    sql
}

/// 将 SQLite 行转换为 JSON 行，按值的实际存储类型解码
fn row_to_json(row: &SqliteRow) -> Result<Row> {
    let mut map = Row::new();

    for column in row.columns() {
        let index = column.ordinal();
        let type_name = {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_string())
            }
        };

        let value = match type_name.as_deref() {
            None => Value::Null,
            Some("INTEGER") | Some("BOOLEAN") => Value::from(row.try_get::<i64, _>(index)?),
            Some("REAL") => {
                let number = row.try_get::<f64, _>(index)?;
                Number::from_f64(number).map(Value::Number).unwrap_or(Value::Null)
            }
            Some("TEXT") | Some("DATE") | Some("DATETIME") | Some("TIME") => {
                Value::String(row.try_get::<String, _>(index)?)
            }
            Some(other) => bail!("列 {} 的类型 {} 不受支持", column.name(), other),
        };

        map.insert(column.name().to_string(), value);
    }

    Ok(map)
}

#[async_trait]
impl AnalysisStore for SqliteAnalysisStore {
    async fn select_many(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        query.validate()?;

        let sql = build_select_sql(query);
        debug!("SQLite 查询: {}", sql);

        let mut statement = sqlx::query(&sql);
        for (_, value) in &query.filters {
            statement = match value {
                Value::String(s) => statement.bind(s.clone()),
                Value::Bool(b) => statement.bind(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => statement.bind(i),
                    None => statement.bind(n.as_f64()),
                },
                Value::Null => statement.bind(None::<String>),
                other => statement.bind(other.to_string()),
            };
        }

        let rows = statement
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("查询 {} 失败", query.table))?;

        rows.iter().map(row_to_json).collect()
    }

    fn store_type(&self) -> &str {
        "sqlite"
    }
}
