/// Badge trigger endpoints
use super::ApiJson;
use crate::{
    badges::{check_badges, BadgeCheckRequest, BadgeCheckResult, PendingTrigger, TriggerId},
    context::AppContext,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Build badge routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/badges/trigger", post(schedule_trigger))
        .route("/api/badges/check", post(run_check))
        .route("/api/badges/pending", get(list_pending))
        .route("/api/badges/pending/:id", delete(cancel_trigger))
}

/// Schedule a delayed badge check; answers before the check runs
async fn schedule_trigger(
    State(ctx): State<AppContext>,
    ApiJson(request): ApiJson<BadgeCheckRequest>,
) -> (StatusCode, Json<Value>) {
    match ctx
        .badge_scheduler
        .schedule(request.user_id, request.trigger_action)
        .await
    {
        Some(id) => (StatusCode::ACCEPTED, Json(json!({ "triggerId": id }))),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "ShuttingDown",
                "message": "Badge scheduler is shutting down"
            })),
        ),
    }
}

/// Run a badge check immediately and return its result
async fn run_check(
    State(ctx): State<AppContext>,
    ApiJson(request): ApiJson<BadgeCheckRequest>,
) -> Json<BadgeCheckResult> {
    let result = check_badges(
        ctx.functions.as_ref(),
        &ctx.config.badges.function_name,
        &request,
    )
    .await;
    Json(result)
}

async fn list_pending(State(ctx): State<AppContext>) -> Json<Vec<PendingTrigger>> {
    Json(ctx.badge_scheduler.pending().await)
}

async fn cancel_trigger(
    State(ctx): State<AppContext>,
    Path(id): Path<TriggerId>,
) -> Json<Value> {
    let cancelled = ctx.badge_scheduler.cancel(id).await;
    Json(json!({ "cancelled": cancelled }))
}
