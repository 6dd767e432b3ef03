//! The single LLM abstraction behind every reasoning step.
//!
//! Query planning, relevance filtering, sufficiency evaluation, and
//! report writing all go through [`Reasoner`]. Structured calls carry a
//! JSON Schema the reply must deserialize into; [`invoke_structured`]
//! adds the retry budget for transient schema non-compliance.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::error::ResearchError;
use tracing::{debug, warn};

/// How many times a structured call is attempted before a schema
/// violation becomes fatal. Compliance failures are usually transient,
/// so the same prompt is simply re-sent.
const MAX_SCHEMA_ATTEMPTS: usize = 3;

/// Capability interface for the language model.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Free-form completion, used for the final report.
    async fn complete(&self, prompt: &str) -> Result<String, ResearchError>;

    /// Completion constrained to `schema`. Returns the raw reply text;
    /// deserialization happens in [`invoke_structured`].
    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, ResearchError>;
}

/// Run a structured call and deserialize the reply into `T`.
///
/// Transport errors propagate immediately; only schema mismatches are
/// retried, and the budget is small.
pub async fn invoke_structured<T: DeserializeOwned>(
    reasoner: &dyn Reasoner,
    prompt: &str,
    schema: &Value,
    expected: &'static str,
) -> Result<T, ResearchError> {
    let mut last_reason = String::new();

    for attempt in 1..=MAX_SCHEMA_ATTEMPTS {
        let raw = reasoner.complete_structured(prompt, schema).await?;
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                debug!(expected, attempt, "structured reply accepted");
                return Ok(value);
            }
            Err(e) => {
                warn!(expected, attempt, error = %e, "structured reply rejected");
                last_reason = e.to_string();
            }
        }
    }

    Err(ResearchError::SchemaViolation {
        expected,
        reason: last_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize)]
    struct Shape {
        value: u32,
    }

    /// Replies from a fixed script, one entry per call.
    struct ScriptedReasoner {
        replies: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedReasoner {
        fn new(replies: Vec<&'static str>) -> Self {
            Self {
                replies,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Reasoner for ScriptedReasoner {
        async fn complete(&self, _prompt: &str) -> Result<String, ResearchError> {
            Ok("report".to_string())
        }

        async fn complete_structured(
            &self,
            _prompt: &str,
            _schema: &Value,
        ) -> Result<String, ResearchError> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.replies[i.min(self.replies.len() - 1)].to_string())
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let reasoner = ScriptedReasoner::new(vec![r#"{"value": 7}"#]);
        let shape: Shape =
            invoke_structured(&reasoner, "p", &serde_json::json!({}), "Shape")
                .await
                .expect("valid reply");
        assert_eq!(shape.value, 7);
        assert_eq!(reasoner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_malformed_reply() {
        let reasoner = ScriptedReasoner::new(vec!["not json", r#"{"value": 3}"#]);
        let shape: Shape =
            invoke_structured(&reasoner, "p", &serde_json::json!({}), "Shape")
                .await
                .expect("second attempt parses");
        assert_eq!(shape.value, 3);
        assert_eq!(reasoner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let reasoner = ScriptedReasoner::new(vec!["nope", "still nope", "no"]);
        let result: Result<Shape, _> =
            invoke_structured(&reasoner, "p", &serde_json::json!({}), "Shape").await;
        assert!(matches!(
            result,
            Err(ResearchError::SchemaViolation {
                expected: "Shape",
                ..
            })
        ));
        assert_eq!(reasoner.calls.load(Ordering::SeqCst), MAX_SCHEMA_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_transport_error_not_retried() {
        struct FailingReasoner;

        #[async_trait]
        impl Reasoner for FailingReasoner {
            async fn complete(&self, _prompt: &str) -> Result<String, ResearchError> {
                Err(ResearchError::Reasoner("down".into()))
            }

            async fn complete_structured(
                &self,
                _prompt: &str,
                _schema: &Value,
            ) -> Result<String, ResearchError> {
                Err(ResearchError::Reasoner("down".into()))
            }
        }

        let result: Result<Shape, _> =
            invoke_structured(&FailingReasoner, "p", &serde_json::json!({}), "Shape").await;
        assert!(matches!(result, Err(ResearchError::Reasoner(_))));
    }
}
