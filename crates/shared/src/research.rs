//! Core data model for a research run.
//!
//! Everything the round loop accumulates lives here: search hits, the
//! relevance-filtered subset, retrieved context fragments, and the
//! append-only [`ContextStore`] that carries them across rounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One raw result returned by the search provider, identified by `link`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// A hit the relevance filter kept. Only title and link survive; the
/// snippet has served its purpose by this point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelevantHit {
    pub title: String,
    pub link: String,
}

/// One unit of retrieved page content tied to its source link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFragment {
    pub source: String,
    pub text: String,
    pub retrieved_at: DateTime<Utc>,
}

impl ContextFragment {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            retrieved_at: Utc::now(),
        }
    }
}

/// Accumulated research state across rounds.
///
/// Owned and mutated by the orchestrator only; the evaluator and the
/// synthesizer get shared references. Fragments and sources are
/// deduplicated by link, and the store only ever grows during a run.
#[derive(Debug, Default)]
pub struct ContextStore {
    fragments: Vec<ContextFragment>,
    sources: Vec<SearchHit>,
    seen_links: HashSet<String>,
    fetched_links: HashSet<String>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every hit a round produced, so the final report can cite
    /// sources that were seen even if never fetched. Duplicates by link
    /// are ignored.
    pub fn record_hits(&mut self, hits: &[SearchHit]) {
        for hit in hits {
            if self.seen_links.insert(hit.link.clone()) {
                self.sources.push(hit.clone());
            }
        }
    }

    /// Append a fetched fragment. Returns false when content for the
    /// same source link was already stored.
    pub fn push_fragment(&mut self, fragment: ContextFragment) -> bool {
        if !self.fetched_links.insert(fragment.source.clone()) {
            debug!(source = %fragment.source, "duplicate fragment skipped");
            return false;
        }
        self.fragments.push(fragment);
        true
    }

    pub fn fragments(&self) -> &[ContextFragment] {
        &self.fragments
    }

    pub fn sources(&self) -> &[SearchHit] {
        &self.sources
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Whether a fragment for this link has already been stored.
    pub fn has_fragment_for(&self, link: &str) -> bool {
        self.fetched_links.contains(link)
    }
}

/// The evaluator's verdict for one round: keep going (and with what),
/// or stop and write the report.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub continue_research: bool,
    pub follow_up_queries: Vec<String>,
}

impl RoundResult {
    /// "No follow-up queries" and "empty follow-up list" are the same
    /// terminal signal; a continue verdict without queries cannot drive
    /// another round.
    pub fn is_terminal(&self) -> bool {
        !self.continue_research || self.follow_up_queries.is_empty()
    }
}

/// What the user asked for. Width is the fan-out target per round, for
/// both generated queries and kept results.
#[derive(Debug, Clone)]
pub struct ResearchRequest {
    pub topic: String,
    pub objective: String,
    pub width: usize,
}

/// Why the round loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The evaluator judged the accumulated context sufficient.
    Sufficient,
    /// The round bound was hit; the report is still generated from
    /// whatever context exists.
    BoundReached,
}

/// The final product of a run: the synthesized report plus the state it
/// was synthesized from.
#[derive(Debug)]
pub struct ResearchOutcome {
    pub report: String,
    pub store: ContextStore,
    pub rounds_executed: usize,
    pub termination: Termination,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(link: &str) -> SearchHit {
        SearchHit {
            title: format!("title for {link}"),
            link: link.to_string(),
            snippet: "snippet".to_string(),
        }
    }

    #[test]
    fn test_record_hits_dedupes_by_link() {
        let mut store = ContextStore::new();
        store.record_hits(&[hit("https://a.example"), hit("https://b.example")]);
        store.record_hits(&[hit("https://a.example"), hit("https://c.example")]);

        let links: Vec<_> = store.sources().iter().map(|h| h.link.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn test_push_fragment_dedupes_by_source() {
        let mut store = ContextStore::new();
        assert!(store.push_fragment(ContextFragment::new("https://a.example", "text")));
        assert!(!store.push_fragment(ContextFragment::new("https://a.example", "text again")));
        assert_eq!(store.fragment_count(), 1);
        assert!(store.has_fragment_for("https://a.example"));
    }

    #[test]
    fn test_round_result_terminal_signals() {
        let stop = RoundResult {
            continue_research: false,
            follow_up_queries: vec!["q".into()],
        };
        let no_queries = RoundResult {
            continue_research: true,
            follow_up_queries: vec![],
        };
        let go = RoundResult {
            continue_research: true,
            follow_up_queries: vec!["q".into()],
        };

        assert!(stop.is_terminal());
        assert!(no_queries.is_terminal());
        assert!(!go.is_terminal());
    }
}
