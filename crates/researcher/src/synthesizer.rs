//! Final report generation.

use crate::prompts;
use providers::Reasoner;
use shared::error::ResearchError;
use shared::research::ContextStore;
use std::sync::Arc;
use tracing::info;

/// One free-form reasoner call turning the accumulated context and
/// source list into a cited markdown report. Runs exactly once, after
/// the round loop has terminated by either path.
pub struct ReportSynthesizer {
    reasoner: Arc<dyn Reasoner>,
}

impl ReportSynthesizer {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    pub async fn synthesize(
        &self,
        topic: &str,
        objective: &str,
        store: &ContextStore,
    ) -> Result<String, ResearchError> {
        info!(
            fragments = store.fragment_count(),
            sources = store.sources().len(),
            "synthesizing report"
        );
        let prompt = prompts::write_report(topic, objective, store);
        self.reasoner.complete(&prompt).await
    }
}
