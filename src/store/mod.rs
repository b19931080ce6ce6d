/// Row store binding
///
/// The hosted backend's row-level operations that the recorder depends on.
/// Components receive an `Arc<dyn RowStore>` explicitly; there is no global
/// client handle.

pub mod sqlite;

pub use sqlite::SqliteRowStore;

use crate::{audit::AuditEntry, error::RecorderResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The calling environment of a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Bearer token presented by the client, if any
    pub access_token: Option<String>,
    /// Client fingerprint (User-Agent)
    pub user_agent: Option<String>,
}

impl Session {
    pub fn new(access_token: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            access_token,
            user_agent,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// The authenticated identity behind a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
}

/// Admin-user record linking a principal to administrative privileges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Row operations consumed by the identity resolver and audit recorder
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Resolve the principal behind a session, `None` when unauthenticated
    async fn current_principal(&self, session: &Session) -> RecorderResult<Option<Principal>>;

    /// Find the single admin-user record for a principal
    async fn find_admin_user(&self, principal_id: &str) -> RecorderResult<Option<AdminUser>>;

    /// Insert an audit entry and return its row id
    async fn insert_audit_entry(&self, entry: &AuditEntry) -> RecorderResult<i64>;
}
