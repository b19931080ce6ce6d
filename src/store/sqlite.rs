/// SQLite-backed row store
use super::{AdminUser, Principal, RowStore, Session};
use crate::{
    audit::AuditEntry,
    error::{RecorderError, RecorderResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// Row store over the local SQLite mirror of sessions, admin users and the
/// audit log
#[derive(Clone)]
pub struct SqliteRowStore {
    db: SqlitePool,
}

impl SqliteRowStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RowStore for SqliteRowStore {
    async fn current_principal(&self, session: &Session) -> RecorderResult<Option<Principal>> {
        let Some(token) = session.access_token.as_deref() else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            SELECT user_id
            FROM sessions
            WHERE access_token = ? AND expires_at > ?
            "#,
        )
        .bind(token)
        .bind(Utc::now().to_rfc3339())
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|row| Principal {
            id: row.get("user_id"),
        }))
    }

    async fn find_admin_user(&self, principal_id: &str) -> RecorderResult<Option<AdminUser>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, role, created_at
            FROM admin_users
            WHERE user_id = ?
            "#,
        )
        .bind(principal_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let created_at_str: String = row.get("created_at");
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| RecorderError::Internal(format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(Some(AdminUser {
            id: row.get("id"),
            user_id: row.get("user_id"),
            role: row.get("role"),
            created_at,
        }))
    }

    async fn insert_audit_entry(&self, entry: &AuditEntry) -> RecorderResult<i64> {
        let metadata = serde_json::to_string(&entry.metadata)?;

        let result = sqlx::query(
            r#"
            INSERT INTO admin_audit_logs
            (admin_user_id, action_type, target_type, target_id, description, metadata, user_agent, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.admin_user_id)
        .bind(entry.action_type.as_str())
        .bind(entry.target_type.as_str())
        .bind(&entry.target_id)
        .bind(&entry.description)
        .bind(metadata)
        .bind(&entry.user_agent)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
