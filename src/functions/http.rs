/// HTTP invoker for hosted backend functions
use super::{FunctionInvoker, FunctionResponse};
use crate::{
    config::FunctionsConfig,
    error::{RecorderError, RecorderResult},
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Calls `POST {base_url}/{name}` with a JSON body
#[derive(Clone)]
pub struct HttpFunctionInvoker {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpFunctionInvoker {
    pub fn new(config: &FunctionsConfig) -> RecorderResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(format!("giftpool-recorder/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RecorderError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name.trim_start_matches('/'))
    }
}

#[async_trait]
impl FunctionInvoker for HttpFunctionInvoker {
    async fn invoke(&self, name: &str, body: Value) -> RecorderResult<FunctionResponse> {
        let url = self.function_url(name);
        tracing::debug!("Invoking remote function {}", url);

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let data = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            };
            return Ok(FunctionResponse::ok(data));
        }

        // Functions report failures as {"error": "..."}; fall back to the raw body
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    format!("Function {} returned {}", name, status)
                } else {
                    text
                }
            });

        Ok(FunctionResponse::failed(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route(
                "/functions/v1/check-badges",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({ "awarded": [], "userId": body["userId"] }))
                }),
            )
            .route(
                "/functions/v1/broken",
                post(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "evaluator crashed" })),
                    )
                }),
            )
            .route(
                "/functions/v1/silent",
                post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/functions/v1/", addr)
    }

    fn invoker(base_url: String) -> HttpFunctionInvoker {
        HttpFunctionInvoker::new(&FunctionsConfig {
            base_url,
            api_key: Some("service-key".to_string()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_data() {
        let invoker = invoker(spawn_backend().await);

        let response = invoker
            .invoke("check-badges", json!({ "userId": "u1" }))
            .await
            .unwrap();

        assert!(response.error.is_none());
        assert_eq!(response.data.unwrap()["userId"], "u1");
    }

    #[tokio::test]
    async fn test_error_body_becomes_function_error() {
        let invoker = invoker(spawn_backend().await);

        let response = invoker.invoke("broken", json!({})).await.unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("evaluator crashed"));
    }

    #[tokio::test]
    async fn test_empty_error_body_reports_status() {
        let invoker = invoker(spawn_backend().await);

        let response = invoker.invoke("silent", json!({})).await.unwrap();
        assert!(response.error.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let invoker = invoker("http://127.0.0.1:1/functions/v1".to_string());
        assert!(invoker.invoke("check-badges", json!({})).await.is_err());
    }
}
