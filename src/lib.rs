/// Giftpool recorder
///
/// Best-effort side effects for the Giftpool admin backend: an audit trail of
/// moderation actions that never fails the action itself, and badge checks
/// deferred until the triggering write is visible.

pub mod api;
pub mod audit;
pub mod badges;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod functions;
pub mod identity;
pub mod metrics;
pub mod server;
pub mod store;

pub use audit::{ActionKind, AuditEntry, AuditRecorder, AuditRequest, RecordOutcome, TargetKind};
pub use badges::{check_badges, BadgeCheckRequest, BadgeCheckResult, BadgeScheduler, TriggerAction};
pub use error::{RecorderError, RecorderResult};
