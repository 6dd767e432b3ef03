//! Error taxonomy for the research pipeline.

/// Errors a research run can surface.
///
/// Search and fetch failures are soft: the orchestrator degrades the
/// current round (zero hits, skipped fragment) and keeps going. Schema
/// violations and reasoner transport failures are fatal once the retry
/// budget is spent, because there is no safe default reading of a
/// malformed verdict.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("reasoner reply did not match the {expected} schema: {reason}")]
    SchemaViolation {
        expected: &'static str,
        reason: String,
    },

    #[error("search failed: {0}")]
    Search(String),

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("no readable content at {url}")]
    EmptyContent { url: String },

    #[error("reasoner unavailable: {0}")]
    Reasoner(String),

    #[error("research run cancelled")]
    Cancelled,
}

impl ResearchError {
    /// Soft errors degrade a round's data; they never abort the run.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            ResearchError::Search(_)
                | ResearchError::Fetch { .. }
                | ResearchError::EmptyContent { .. }
        )
    }
}
