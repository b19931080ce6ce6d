/// Badge evaluation triggers
///
/// After a user does something badge-worthy the remote evaluator is asked to
/// re-check that user's badges. The direct call is [`check_badges`]; the
/// delayed, fire-and-forget path goes through [`BadgeScheduler`].

pub mod scheduler;

pub use scheduler::{BadgeScheduler, PendingTrigger, TriggerId};

use crate::{
    error::{RecorderError, RecorderResult},
    functions::FunctionInvoker,
    metrics,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// User action that may unlock a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerAction {
    Contribution,
    FundCreation,
    AddFriend,
    SendThanks,
}

impl TriggerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerAction::Contribution => "contribution",
            TriggerAction::FundCreation => "fund_creation",
            TriggerAction::AddFriend => "add_friend",
            TriggerAction::SendThanks => "send_thanks",
        }
    }

    pub fn from_str(s: &str) -> RecorderResult<Self> {
        match s {
            "contribution" => Ok(TriggerAction::Contribution),
            "fund_creation" => Ok(TriggerAction::FundCreation),
            "add_friend" => Ok(TriggerAction::AddFriend),
            "send_thanks" => Ok(TriggerAction::SendThanks),
            _ => Err(RecorderError::Validation(format!("Invalid trigger action: {}", s))),
        }
    }
}

/// Request to re-evaluate one user's badges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCheckRequest {
    pub user_id: String,
    pub trigger_action: TriggerAction,
}

impl BadgeCheckRequest {
    pub fn new(user_id: impl Into<String>, trigger_action: TriggerAction) -> Self {
        Self {
            user_id: user_id.into(),
            trigger_action,
        }
    }

    fn body(&self) -> Value {
        json!({
            "userId": self.user_id,
            "triggerAction": self.trigger_action.as_str(),
        })
    }
}

/// Structured result handed to direct callers of [`check_badges`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeCheckResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BadgeCheckResult {
    fn succeeded(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Invoke the remote badge evaluator once. Never returns an error; faults
/// come back as `success: false`.
pub async fn check_badges(
    invoker: &dyn FunctionInvoker,
    function_name: &str,
    request: &BadgeCheckRequest,
) -> BadgeCheckResult {
    let started = Instant::now();

    let result = match invoker.invoke(function_name, request.body()).await {
        Ok(response) => match response.error {
            Some(error) => {
                warn!("Badge check for {} reported an error: {}", request.user_id, error);
                BadgeCheckResult::failed(error)
            }
            None => {
                debug!("Badge check for {} completed", request.user_id);
                BadgeCheckResult::succeeded(response.data)
            }
        },
        Err(e) => {
            warn!("Error checking badges for {}: {}", request.user_id, e);
            BadgeCheckResult::failed(e.to_string())
        }
    };

    metrics::record_badge_check(
        request.trigger_action.as_str(),
        result.success,
        started.elapsed().as_secs_f64(),
    );
    result
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{
        error::{RecorderError, RecorderResult},
        functions::{FunctionInvoker, FunctionResponse},
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// How the fake evaluator answers
    #[derive(Clone, Copy)]
    pub enum Reply {
        Ok,
        FunctionError,
        TransportError,
    }

    /// Records every invocation and answers with a fixed reply
    pub struct FakeEvaluator {
        pub reply: Reply,
        pub calls: Mutex<Vec<(String, Value)>>,
    }

    impl FakeEvaluator {
        pub fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl FunctionInvoker for FakeEvaluator {
        async fn invoke(&self, name: &str, body: Value) -> RecorderResult<FunctionResponse> {
            self.calls.lock().unwrap().push((name.to_string(), body));
            match self.reply {
                Reply::Ok => Ok(FunctionResponse::ok(json!({ "awarded": ["first_gift"] }))),
                Reply::FunctionError => Ok(FunctionResponse::failed("evaluator unavailable")),
                Reply::TransportError => {
                    Err(RecorderError::Internal("connection refused".to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeEvaluator, Reply};
    use super::*;

    #[test]
    fn test_trigger_from_str() {
        assert_eq!(
            TriggerAction::from_str("fund_creation").unwrap(),
            TriggerAction::FundCreation
        );
        assert!(TriggerAction::from_str("login").is_err());
        assert!(TriggerAction::from_str("Fund_Creation").is_err());
    }

    #[test]
    fn test_request_wire_format() {
        let request: BadgeCheckRequest =
            serde_json::from_value(json!({ "userId": "u1", "triggerAction": "send_thanks" }))
                .unwrap();
        assert_eq!(request, BadgeCheckRequest::new("u1", TriggerAction::SendThanks));
    }

    #[tokio::test]
    async fn test_check_badges_success() {
        let evaluator = FakeEvaluator::new(Reply::Ok);
        let request = BadgeCheckRequest::new("u1", TriggerAction::Contribution);

        let result = check_badges(&evaluator, "check-badges", &request).await;

        assert!(result.success);
        assert_eq!(result.data.unwrap()["awarded"][0], "first_gift");

        let calls = evaluator.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "check-badges");
        assert_eq!(calls[0].1["userId"], "u1");
        assert_eq!(calls[0].1["triggerAction"], "contribution");
    }

    #[tokio::test]
    async fn test_function_error_is_a_failed_result() {
        let evaluator = FakeEvaluator::new(Reply::FunctionError);
        let request = BadgeCheckRequest::new("u1", TriggerAction::AddFriend);

        let result = check_badges(&evaluator, "check-badges", &request).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("evaluator unavailable"));
    }

    #[tokio::test]
    async fn test_transport_error_is_a_failed_result() {
        let evaluator = FakeEvaluator::new(Reply::TransportError);
        let request = BadgeCheckRequest::new("u1", TriggerAction::AddFriend);

        let result = check_badges(&evaluator, "check-badges", &request).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("connection refused"));
        assert!(result.data.is_none());
    }
}
