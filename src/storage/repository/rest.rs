// REST 数据源实现 - PostgREST 兼容接口（Supabase）

use super::{AnalysisStore, Row, SelectQuery, SortOrder};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

const REST_PATH: &str = "rest/v1";

/// REST 数据源
#[derive(Clone)]
pub struct RestAnalysisStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestAnalysisStore {
    /// 创建新的 REST 数据源
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(anyhow!("数据源地址不能为空"));
        }
        if api_key.is_empty() {
            return Err(anyhow!("数据源访问密钥不能为空"));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        info!("初始化 REST 分析数据源: {}", base_url);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, table)
    }
}

/// 构造 PostgREST 查询参数
///
/// select=a,b & col=eq.value & order=col.desc & limit=n
pub(crate) fn query_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    let select = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query.columns.join(",")
    };
    params.push(("select".to_string(), select));

    for (column, value) in &query.filters {
        params.push((column.clone(), format!("eq.{}", filter_value(value))));
    }

    if let Some((column, order)) = &query.order {
        let direction = match order {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        };
        params.push(("order".to_string(), format!("{}.{}", column, direction)));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl AnalysisStore for RestAnalysisStore {
    async fn select_many(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        query.validate()?;

        let url = self.table_url(&query.table);
        let params = query_params(query);
        debug!("REST 查询 {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("请求 {} 失败", query.table))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "查询 {} 失败 ({}): {}",
                query.table,
                status,
                error_text
            ));
        }

        let rows: Vec<Row> = response
            .json()
            .await
            .with_context(|| format!("解析 {} 的响应失败", query.table))?;

        Ok(rows)
    }

    fn store_type(&self) -> &str {
        "rest"
    }
}
