//! The sufficiency check, the loop's feedback control element.

use crate::prompts;
use providers::{invoke_structured, Reasoner};
use shared::error::ResearchError;
use shared::research::{ContextStore, RoundResult};
use shared::schema::SufficiencyVerdict;
use std::sync::Arc;
use tracing::debug;

/// Judges whether the accumulated context covers the objective, and if
/// not, produces the next round's follow-up queries.
///
/// Sufficiency is a property of total knowledge: the evaluator always
/// sees the full store, not just the fragments the last round added.
pub struct SufficiencyEvaluator {
    reasoner: Arc<dyn Reasoner>,
}

impl SufficiencyEvaluator {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    pub async fn evaluate(
        &self,
        topic: &str,
        objective: &str,
        store: &ContextStore,
        width: usize,
    ) -> Result<RoundResult, ResearchError> {
        let prompt = prompts::assess_sufficiency(topic, objective, store, width);
        let verdict: SufficiencyVerdict = invoke_structured(
            self.reasoner.as_ref(),
            &prompt,
            &SufficiencyVerdict::schema(),
            SufficiencyVerdict::NAME,
        )
        .await?;

        let mut result = verdict.into_round_result();
        if result.follow_up_queries.len() > width {
            debug!(
                requested = width,
                returned = result.follow_up_queries.len(),
                "follow-up width mismatch"
            );
            result.follow_up_queries.truncate(width);
        }

        debug!(
            continue_research = result.continue_research,
            follow_ups = result.follow_up_queries.len(),
            "sufficiency verdict"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;

    struct FixedReasoner(&'static str);

    #[async_trait]
    impl Reasoner for FixedReasoner {
        async fn complete(&self, _prompt: &str) -> Result<String, ResearchError> {
            unreachable!("evaluator only makes structured calls")
        }

        async fn complete_structured(
            &self,
            _prompt: &str,
            _schema: &Value,
        ) -> Result<String, ResearchError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_stop_verdict() {
        let evaluator = SufficiencyEvaluator::new(Arc::new(FixedReasoner(
            r#"{"further_research": false}"#,
        )));
        let result = evaluator
            .evaluate("t", "o", &ContextStore::new(), 3)
            .await
            .expect("evaluates");
        assert!(result.is_terminal());
    }

    #[tokio::test]
    async fn test_continue_verdict_with_follow_ups() {
        let evaluator = SufficiencyEvaluator::new(Arc::new(FixedReasoner(
            r#"{"further_research": true, "follow_up_queries": ["deeper q1", "deeper q2"]}"#,
        )));
        let result = evaluator
            .evaluate("t", "o", &ContextStore::new(), 3)
            .await
            .expect("evaluates");
        assert!(!result.is_terminal());
        assert_eq!(result.follow_up_queries.len(), 2);
    }

    #[tokio::test]
    async fn test_follow_ups_capped_at_width() {
        let evaluator = SufficiencyEvaluator::new(Arc::new(FixedReasoner(
            r#"{"further_research": true, "follow_up_queries": ["a", "b", "c", "d"]}"#,
        )));
        let result = evaluator
            .evaluate("t", "o", &ContextStore::new(), 2)
            .await
            .expect("evaluates");
        assert_eq!(result.follow_up_queries.len(), 2);
    }

    #[tokio::test]
    async fn test_continue_without_queries_is_terminal() {
        let evaluator = SufficiencyEvaluator::new(Arc::new(FixedReasoner(
            r#"{"further_research": true, "follow_up_queries": null}"#,
        )));
        let result = evaluator
            .evaluate("t", "o", &ContextStore::new(), 3)
            .await
            .expect("evaluates");
        assert!(result.is_terminal());
    }
}
