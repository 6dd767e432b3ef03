//! Progress events emitted during a research run.
//!
//! The orchestrator reports what it is doing over a channel; the CLI
//! renders these as progress lines while the report itself goes to
//! stdout at the end.

use serde::{Deserialize, Serialize};

/// One observable step of the round loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResearchEvent {
    /// A round began with this query set.
    RoundStarted { round: usize, queries: Vec<String> },
    /// One search query finished, contributing this many hits.
    SearchCompleted { query: String, hits: usize },
    /// The relevance filter kept this many of the round's pool.
    PoolFiltered { pool: usize, kept: usize },
    /// Content retrieval started for one kept resource.
    FetchStarted { title: String, link: String },
    /// A fragment was stored for this source.
    FragmentStored { link: String },
    /// A fetch failed; the hit was skipped and the round went on.
    FetchSkipped { link: String, reason: String },
    /// The evaluator rendered its verdict for the round.
    RoundEvaluated {
        round: usize,
        continue_research: bool,
        follow_ups: usize,
    },
    /// The round bound was hit; proceeding with the context on hand.
    BoundReached { rounds: usize },
    /// Report synthesis began.
    SynthesisStarted { sources: usize, fragments: usize },
}
