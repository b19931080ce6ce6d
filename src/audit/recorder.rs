/// Best-effort audit recorder
use super::{AuditEntry, AuditRequest};
use crate::{
    identity::{AdminIdentityResolver, Resolution},
    metrics,
    store::{RowStore, Session},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Why a recorder call wrote nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    NoPrincipal,
    NoAdminRecord,
}

/// Result of one recorder call. Never an error: persistence faults are
/// reported as `Dropped` and go no further.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    NoOp(NoOpReason),
    Recorded { id: i64, entry: AuditEntry },
    Dropped { entry: AuditEntry, error: String },
}

impl RecordOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOutcome::NoOp(_) => "no_op",
            RecordOutcome::Recorded { .. } => "recorded",
            RecordOutcome::Dropped { .. } => "dropped",
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded { .. })
    }
}

/// Records moderation actions against the admin audit log
#[derive(Clone)]
pub struct AuditRecorder {
    resolver: AdminIdentityResolver,
    store: Arc<dyn RowStore>,
    fallback_user_agent: String,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn RowStore>, fallback_user_agent: impl Into<String>) -> Self {
        Self {
            resolver: AdminIdentityResolver::new(Arc::clone(&store)),
            store,
            fallback_user_agent: fallback_user_agent.into(),
        }
    }

    /// Resolve the acting admin and insert one audit entry.
    ///
    /// At most one insert is attempted. A failed insert is logged and
    /// dropped without retry.
    pub async fn record(&self, session: &Session, request: AuditRequest) -> RecordOutcome {
        let action = request.action_type;

        let outcome = match self.resolver.resolve(session).await {
            Resolution::NoPrincipal => {
                debug!("Skipping audit entry for {}: no authenticated principal", action.as_str());
                RecordOutcome::NoOp(NoOpReason::NoPrincipal)
            }
            Resolution::NoAdminRecord { principal } => {
                debug!(
                    "Skipping audit entry for {}: {} is not an admin",
                    action.as_str(),
                    principal.id
                );
                RecordOutcome::NoOp(NoOpReason::NoAdminRecord)
            }
            Resolution::Admin(admin) => {
                let user_agent = session
                    .user_agent
                    .clone()
                    .filter(|ua| !ua.trim().is_empty())
                    .unwrap_or_else(|| self.fallback_user_agent.clone());
                let entry = request.into_entry(admin.id, user_agent);

                match self.store.insert_audit_entry(&entry).await {
                    Ok(id) => {
                        info!(
                            "Audit: admin {} {} {} {}",
                            entry.admin_user_id,
                            entry.action_type.as_str(),
                            entry.target_type.as_str(),
                            entry.target_id.as_deref().unwrap_or("-")
                        );
                        RecordOutcome::Recorded { id, entry }
                    }
                    Err(e) => {
                        error!("Error logging admin action: {}", e);
                        RecordOutcome::Dropped {
                            entry,
                            error: e.to_string(),
                        }
                    }
                }
            }
        };

        metrics::record_audit_outcome(action.as_str(), outcome.as_str());
        outcome
    }

    /// Spawn [`record`](Self::record) on the runtime and return immediately.
    ///
    /// Dropping the handle detaches the task.
    pub fn record_detached(&self, session: Session, request: AuditRequest) -> JoinHandle<RecordOutcome> {
        let recorder = self.clone();
        tokio::spawn(async move { recorder.record(&session, request).await })
    }
}
