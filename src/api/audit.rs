/// Audit recording endpoint used by the admin dashboard
use super::{middleware::session_from_headers, ApiJson};
use crate::{
    audit::{ActionKind, AuditRequest, RecordOutcome, TargetKind},
    context::AppContext,
    error::RecorderResult,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Build audit routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/audit", post(record_admin_action))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAuditInput {
    pub action_type: String,
    pub target_type: String,
    pub target_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl RecordAuditInput {
    fn into_request(self) -> RecorderResult<AuditRequest> {
        let mut request = AuditRequest::new(
            ActionKind::from_str(&self.action_type)?,
            TargetKind::from_str(&self.target_type)?,
        )
        .description(self.description);

        if let Some(target_id) = self.target_id {
            request = request.target_id(target_id);
        }
        if let Some(metadata) = self.metadata {
            request = request.with_metadata(metadata);
        }

        Ok(request)
    }
}

/// Record a moderation action. Only malformed input is an error; a missing
/// admin or a failed insert still answers 202 with the outcome.
async fn record_admin_action(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<RecordAuditInput>,
) -> RecorderResult<(StatusCode, Json<Value>)> {
    let request = input.into_request()?;
    let session = session_from_headers(&headers);

    let outcome = ctx.audit_recorder.record(&session, request).await;

    let body = match &outcome {
        RecordOutcome::NoOp(reason) => json!({ "outcome": outcome.as_str(), "reason": reason }),
        RecordOutcome::Recorded { id, .. } => json!({ "outcome": outcome.as_str(), "id": id }),
        RecordOutcome::Dropped { .. } => json!({ "outcome": outcome.as_str() }),
    };

    Ok((StatusCode::ACCEPTED, Json(body)))
}
