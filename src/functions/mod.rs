/// Remote function binding
///
/// Named functions hosted by the backend (badge evaluation and friends),
/// invoked with a JSON body and answering `{data, error}`.

pub mod http;

pub use http::HttpFunctionInvoker;

use crate::error::RecorderResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of a remote function call
///
/// A function can run and still report an error; that arrives in `error`.
/// Transport failures are returned as `Err` by [`FunctionInvoker::invoke`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl FunctionResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Invokes named remote functions
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(&self, name: &str, body: Value) -> RecorderResult<FunctionResponse>;
}
