/// HTTP server setup and routing
use crate::{
    api::middleware::track_requests,
    context::AppContext,
    error::{RecorderError, RecorderResult},
    metrics,
};
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .merge(crate::api::routes())
        .route_layer(middleware::from_fn(track_requests))
        .with_state(ctx)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": ctx.config.service.version
    }))
}

/// Prometheus scrape endpoint
async fn render_metrics() -> RecorderResult<String> {
    metrics::render_metrics()
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": "Endpoint not found"
        })),
    )
}

/// Start the HTTP server; pending badge triggers are cancelled on shutdown
pub async fn serve(ctx: AppContext) -> RecorderResult<()> {
    let addr = ctx.bind_address();

    info!(
        "Giftpool recorder v{} listening on {}",
        ctx.config.service.version, addr
    );
    info!("   Badge function: {}", ctx.config.badges.function_name);
    info!("   Badge delay: {:?}", ctx.badge_scheduler.delay());

    let scheduler = ctx.badge_scheduler.clone();
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RecorderError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
            scheduler.shutdown().await;
        })
        .await
        .map_err(|e| RecorderError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
