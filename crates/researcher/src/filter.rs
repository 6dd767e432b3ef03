//! Relevance filtering of raw search hits.

use crate::prompts;
use providers::{invoke_structured, Reasoner};
use shared::error::ResearchError;
use shared::research::{RelevantHit, SearchHit};
use shared::schema::RelevantSelection;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cheap pre-filter between searching and fetching: judges relevance
/// from title and snippet alone, bounding how many expensive fetches a
/// round can trigger.
pub struct RelevanceFilter {
    reasoner: Arc<dyn Reasoner>,
}

impl RelevanceFilter {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    /// Select up to `width` hits from `pool`. Fewer is legal when the
    /// pool lacks relevant items; an empty pool short-circuits without
    /// a reasoner call. The reasoner's selection is checked against the
    /// pool: links it did not come from are dropped.
    pub async fn filter(
        &self,
        topic: &str,
        objective: &str,
        width: usize,
        pool: &[SearchHit],
    ) -> Result<Vec<RelevantHit>, ResearchError> {
        if pool.is_empty() {
            debug!("empty pool, skipping relevance call");
            return Ok(Vec::new());
        }

        let prompt = prompts::judge_relevance(topic, objective, width, pool);
        let selection: RelevantSelection = invoke_structured(
            self.reasoner.as_ref(),
            &prompt,
            &RelevantSelection::schema(),
            RelevantSelection::NAME,
        )
        .await?;

        let known: HashSet<&str> = pool.iter().map(|h| h.link.as_str()).collect();
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for hit in selection.results {
            if !known.contains(hit.link.as_str()) {
                warn!(link = %hit.link, "selection outside the pool, dropped");
                continue;
            }
            if !seen.insert(hit.link.clone()) {
                continue;
            }
            kept.push(hit);
            if kept.len() == width {
                break;
            }
        }

        debug!(pool = pool.len(), kept = kept.len(), "relevance filtered");
        Ok(kept)
    }
}
