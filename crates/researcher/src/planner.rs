//! Opening-query generation.

use crate::prompts;
use providers::{invoke_structured, Reasoner};
use shared::error::ResearchError;
use shared::schema::PlannedQueries;
use std::sync::Arc;
use tracing::debug;

/// Turns (topic, objective, width) into the first round's query set.
///
/// Zero pairwise overlap is requested of the reasoner, not verified
/// here; width compliance is enforced by truncation, and a short set is
/// accepted as-is.
pub struct QueryPlanner {
    reasoner: Arc<dyn Reasoner>,
}

impl QueryPlanner {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    pub async fn plan(
        &self,
        topic: &str,
        objective: &str,
        width: usize,
    ) -> Result<Vec<String>, ResearchError> {
        let prompt = prompts::plan_queries(topic, objective, width);
        let planned: PlannedQueries = invoke_structured(
            self.reasoner.as_ref(),
            &prompt,
            &PlannedQueries::schema(),
            PlannedQueries::NAME,
        )
        .await?;

        let mut queries = planned.queries;
        if queries.len() != width {
            debug!(
                requested = width,
                returned = queries.len(),
                "planner width mismatch"
            );
            queries.truncate(width);
        }
        Ok(queries)
    }
}
