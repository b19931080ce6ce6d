/// Admin audit trail
///
/// Moderation actions taken from the admin dashboard are recorded here on a
/// best-effort basis. Recording never blocks or fails the moderation action
/// itself; see [`AuditRecorder`].

pub mod recorder;

pub use recorder::{AuditRecorder, NoOpReason, RecordOutcome};

use crate::error::{RecorderError, RecorderResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of moderation action being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Approve,
    Hide,
    Delete,
    Update,
    BulkAction,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Approve => "approve",
            ActionKind::Hide => "hide",
            ActionKind::Delete => "delete",
            ActionKind::Update => "update",
            ActionKind::BulkAction => "bulk_action",
        }
    }

    pub fn from_str(s: &str) -> RecorderResult<Self> {
        match s {
            "approve" => Ok(ActionKind::Approve),
            "hide" => Ok(ActionKind::Hide),
            "delete" => Ok(ActionKind::Delete),
            "update" => Ok(ActionKind::Update),
            "bulk_action" => Ok(ActionKind::BulkAction),
            _ => Err(RecorderError::Validation(format!("Invalid action type: {}", s))),
        }
    }
}

/// Kind of object a moderation action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Post,
    Comment,
    Report,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Post => "post",
            TargetKind::Comment => "comment",
            TargetKind::Report => "report",
        }
    }

    pub fn from_str(s: &str) -> RecorderResult<Self> {
        match s {
            "post" => Ok(TargetKind::Post),
            "comment" => Ok(TargetKind::Comment),
            "report" => Ok(TargetKind::Report),
            _ => Err(RecorderError::Validation(format!("Invalid target type: {}", s))),
        }
    }
}

/// A single audit log entry, written once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub admin_user_id: String,
    pub action_type: ActionKind,
    pub target_type: TargetKind,
    pub target_id: Option<String>,
    pub description: String,
    pub metadata: Map<String, Value>,
    pub user_agent: String,
}

/// What the caller wants recorded; the actor is resolved by the recorder
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRequest {
    pub action_type: ActionKind,
    pub target_type: TargetKind,
    pub target_id: Option<String>,
    pub description: String,
    pub metadata: Map<String, Value>,
}

impl AuditRequest {
    pub fn new(action_type: ActionKind, target_type: TargetKind) -> Self {
        Self {
            action_type,
            target_type,
            target_id: None,
            description: String::new(),
            metadata: Map::new(),
        }
    }

    pub fn target_id(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a metadata key; a repeated key overwrites the earlier value
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Attach the resolved actor and client fingerprint
    pub fn into_entry(self, admin_user_id: String, user_agent: String) -> AuditEntry {
        AuditEntry {
            admin_user_id,
            action_type: self.action_type,
            target_type: self.target_type,
            target_id: self.target_id,
            description: self.description,
            metadata: self.metadata,
            user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_from_str() {
        assert_eq!(ActionKind::from_str("approve").unwrap(), ActionKind::Approve);
        assert_eq!(
            ActionKind::from_str("bulk_action").unwrap(),
            ActionKind::BulkAction
        );
        assert!(ActionKind::from_str("ban").is_err());
    }

    #[test]
    fn test_kinds_are_case_sensitive() {
        assert!(ActionKind::from_str("APPROVE").is_err());
        assert!(ActionKind::from_str("Bulk_Action").is_err());
        assert!(TargetKind::from_str("Post").is_err());
        assert!(TargetKind::from_str(" post").is_err());
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!(TargetKind::from_str("comment").unwrap(), TargetKind::Comment);
        assert!(TargetKind::from_str("fund").is_err());
    }

    #[test]
    fn test_serde_matches_wire_names() {
        assert_eq!(
            serde_json::to_value(ActionKind::BulkAction).unwrap(),
            json!("bulk_action")
        );
        assert_eq!(serde_json::to_value(TargetKind::Report).unwrap(), json!("report"));
    }

    #[test]
    fn test_request_builder_keeps_last_metadata_value() {
        let entry = AuditRequest::new(ActionKind::Hide, TargetKind::Comment)
            .target_id("c9")
            .description("Hidden for spam")
            .metadata("reason", "spam")
            .metadata("reason", "abuse")
            .into_entry("a1".to_string(), "test-agent".to_string());

        assert_eq!(entry.admin_user_id, "a1");
        assert_eq!(entry.target_id.as_deref(), Some("c9"));
        assert_eq!(entry.metadata.len(), 1);
        assert_eq!(entry.metadata["reason"], json!("abuse"));
    }
}
