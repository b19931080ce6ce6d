/// API routes and handlers
pub mod audit;
pub mod badges;
pub mod middleware;

use crate::{context::AppContext, error::RecorderError};
use axum::{extract::FromRequest, Router};

/// JSON body extractor whose rejections answer with the `{error, message}` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RecorderError))]
pub struct ApiJson<T>(pub T);

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(audit::routes())
        .merge(badges::routes())
}
