/// Request helpers and middleware
use crate::{metrics, store::Session};
use axum::{
    extract::{MatchedPath, Request},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Build the calling session from request headers
pub fn session_from_headers(headers: &HeaderMap) -> Session {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    Session::new(extract_bearer_token(headers), user_agent)
}

/// Count requests by route template and status
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;
    metrics::record_http_request(&method, &path, response.status().as_u16());
    response
}
