// 账户目录 - 打字分析使用独立的用户ID空间，通过邮箱关联

use crate::storage::models::TypingAccountRow;
use crate::storage::{decode_row, tables, AnalysisStore, SelectQuery};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

/// 查询用户邮箱
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn email_for(&self, user_uid: &str) -> Result<Option<String>>;
}

/// 内存中的账户目录
#[derive(Default)]
pub struct StaticAccountDirectory {
    emails: RwLock<HashMap<String, String>>,
}

impl StaticAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, user_uid: &str, email: &str) -> Self {
        self.insert(user_uid, email);
        self
    }

    pub fn insert(&self, user_uid: &str, email: &str) {
        if let Ok(mut emails) = self.emails.write() {
            emails.insert(user_uid.to_string(), email.to_string());
        }
    }

    pub fn remove(&self, user_uid: &str) {
        if let Ok(mut emails) = self.emails.write() {
            emails.remove(user_uid);
        }
    }
}

#[async_trait]
impl AccountDirectory for StaticAccountDirectory {
    async fn email_for(&self, user_uid: &str) -> Result<Option<String>> {
        let emails = self
            .emails
            .read()
            .map_err(|e| anyhow::anyhow!("账户目录锁异常: {}", e))?;
        Ok(emails.get(user_uid).cloned())
    }
}

/// 将调用者的用户ID解析为打字应用中的用户ID
///
/// 邮箱缺失、Users 表中无记录或记录的用户ID为空时返回 `None`。
pub async fn resolve_typing_user(
    store: &dyn AnalysisStore,
    accounts: &dyn AccountDirectory,
    user_uid: &str,
) -> Result<Option<String>> {
    let email = match accounts.email_for(user_uid).await? {
        Some(email) if !email.trim().is_empty() => email,
        _ => {
            info!("用户 {} 没有可用的邮箱，无法关联打字数据", user_uid);
            return Ok(None);
        }
    };

    let query = SelectQuery::from(tables::USERS)
        .columns(&["user_uid"])
        .eq("app_origin", email.as_str());
    let Some(row) = store
        .select_optional(&query)
        .await
        .with_context(|| format!("查询打字应用用户失败 ({})", email))?
    else {
        info!("打字应用中没有邮箱为 {} 的用户", email);
        return Ok(None);
    };

    let account: TypingAccountRow = decode_row(row)?;
    if account.user_uid.is_empty() {
        info!("打字应用用户 {} 的ID为空", email);
        return Ok(None);
    }

    debug!("用户 {} 对应打字应用用户 {}", user_uid, account.user_uid);
    Ok(Some(account.user_uid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::categories::test_support::TableStore;
    use serde_json::json;

    fn store() -> TableStore {
        TableStore::default().with(
            "Users",
            vec![
                json!({"user_uid": "lb-1", "app_origin": "ada@example.com"}),
                json!({"user_uid": "", "app_origin": "blank@example.com"}),
            ],
        )
    }

    #[tokio::test]
    async fn test_resolves_by_email() {
        let accounts = StaticAccountDirectory::new().with("U1", "ada@example.com");
        let resolved = resolve_typing_user(&store(), &accounts, "U1").await.unwrap();
        assert_eq!(resolved.as_deref(), Some("lb-1"));
    }

    #[tokio::test]
    async fn test_unresolvable_users() {
        let store = store();
        let accounts = StaticAccountDirectory::new()
            .with("U2", "nobody@example.com")
            .with("U3", "blank@example.com")
            .with("U4", "  ");

        for uid in ["U0", "U2", "U3", "U4"] {
            assert!(resolve_typing_user(&store, &accounts, uid).await.unwrap().is_none());
        }
        // 没有邮箱时不查询 Users 表
        assert_eq!(store.query_count("Users"), 2);
    }

    #[tokio::test]
    async fn test_directory_updates() {
        let accounts = StaticAccountDirectory::new();
        accounts.insert("U1", "ada@example.com");
        assert_eq!(accounts.email_for("U1").await.unwrap().as_deref(), Some("ada@example.com"));
        accounts.remove("U1");
        assert!(accounts.email_for("U1").await.unwrap().is_none());
    }
}
