//! The round-by-round research state machine.
//!
//! Planning → Searching → Filtering → Fetching → Evaluating, looping
//! back to Searching while the evaluator asks for more and the round
//! bound allows it, then Reporting. Searches and fetches fan out
//! concurrently within a round; rounds themselves are strictly
//! sequential because the evaluator needs the full accumulated store.

use crate::evaluator::SufficiencyEvaluator;
use crate::filter::RelevanceFilter;
use crate::planner::QueryPlanner;
use crate::synthesizer::ReportSynthesizer;
use providers::Reasoner;
use services::{ContentFetcher, SearchProvider};
use shared::error::ResearchError;
use shared::events::ResearchEvent;
use shared::research::{
    ContextStore, RelevantHit, ResearchOutcome, ResearchRequest, SearchHit, Termination,
};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct ResearchOrchestrator {
    planner: QueryPlanner,
    filter: RelevanceFilter,
    evaluator: SufficiencyEvaluator,
    synthesizer: ReportSynthesizer,
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn ContentFetcher>,
    max_rounds: usize,
    events: Option<UnboundedSender<ResearchEvent>>,
    cancel: CancellationToken,
}

impl ResearchOrchestrator {
    pub fn new(
        reasoner: Arc<dyn Reasoner>,
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn ContentFetcher>,
        max_rounds: usize,
    ) -> Self {
        Self {
            planner: QueryPlanner::new(reasoner.clone()),
            filter: RelevanceFilter::new(reasoner.clone()),
            evaluator: SufficiencyEvaluator::new(reasoner.clone()),
            synthesizer: ReportSynthesizer::new(reasoner),
            search,
            fetcher,
            max_rounds,
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Stream progress events to a channel; dropped receivers are
    /// tolerated.
    pub fn with_events(mut self, events: UnboundedSender<ResearchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Handle for cancelling the run from outside (e.g. ctrl-c). Firing
    /// it abandons in-flight searches, fetches, and reasoner calls at
    /// the next suspension point.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drive a full research run to its report.
    ///
    /// The first round's queries come from the planner; every later
    /// round runs on the previous round's follow-up queries. Hitting
    /// the round bound is not an error: the report is still written
    /// from whatever context exists.
    pub async fn run(&self, request: &ResearchRequest) -> Result<ResearchOutcome, ResearchError> {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            topic = %request.topic,
            width = request.width,
            max_rounds = self.max_rounds,
            "research run started"
        );

        let mut store = ContextStore::new();
        let mut queries = self
            .guarded(self.planner.plan(&request.topic, &request.objective, request.width))
            .await?;
        let mut rounds = 0;

        let termination = loop {
            rounds += 1;
            self.emit(ResearchEvent::RoundStarted {
                round: rounds,
                queries: queries.clone(),
            });
            info!(round = rounds, queries = queries.len(), "round started");

            let pool = self.guarded(self.search_round(&queries)).await?;
            store.record_hits(&pool);

            let kept = self
                .guarded(self.filter.filter(
                    &request.topic,
                    &request.objective,
                    request.width,
                    &pool,
                ))
                .await?;
            self.emit(ResearchEvent::PoolFiltered {
                pool: pool.len(),
                kept: kept.len(),
            });

            self.guarded(self.fetch_round(&kept, &mut store)).await?;

            let verdict = self
                .guarded(self.evaluator.evaluate(
                    &request.topic,
                    &request.objective,
                    &store,
                    request.width,
                ))
                .await?;
            self.emit(ResearchEvent::RoundEvaluated {
                round: rounds,
                continue_research: verdict.continue_research,
                follow_ups: verdict.follow_up_queries.len(),
            });

            if verdict.is_terminal() {
                break Termination::Sufficient;
            }
            if rounds >= self.max_rounds {
                warn!(rounds, "round bound reached, proceeding with available context");
                self.emit(ResearchEvent::BoundReached { rounds });
                break Termination::BoundReached;
            }
            queries = verdict.follow_up_queries;
        };

        self.emit(ResearchEvent::SynthesisStarted {
            sources: store.sources().len(),
            fragments: store.fragment_count(),
        });
        let report = self
            .guarded(
                self.synthesizer
                    .synthesize(&request.topic, &request.objective, &store),
            )
            .await?;

        info!(%run_id, rounds, ?termination, "research run finished");
        Ok(ResearchOutcome {
            report,
            store,
            rounds_executed: rounds,
            termination,
        })
    }

    /// Concurrent searches across the round's query set. A failed query
    /// degrades to zero hits; the merged pool is deduplicated by link.
    async fn search_round(&self, queries: &[String]) -> Result<Vec<SearchHit>, ResearchError> {
        let mut set = JoinSet::new();
        for query in queries {
            let search = Arc::clone(&self.search);
            let query = query.clone();
            set.spawn(async move {
                let hits = search.search(&query).await;
                (query, hits)
            });
        }

        let mut pool = Vec::new();
        let mut seen = HashSet::new();
        while let Some(joined) = set.join_next().await {
            let Ok((query, outcome)) = joined else {
                continue;
            };
            match outcome {
                Ok(hits) => {
                    self.emit(ResearchEvent::SearchCompleted {
                        query,
                        hits: hits.len(),
                    });
                    for hit in hits {
                        if seen.insert(hit.link.clone()) {
                            pool.push(hit);
                        }
                    }
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "search failed, treating as zero hits");
                    self.emit(ResearchEvent::SearchCompleted { query, hits: 0 });
                }
            }
        }
        Ok(pool)
    }

    /// Concurrent fetches across the kept hits, merged into the store
    /// at a single point on this task. One failed fetch skips that hit
    /// and never aborts the round.
    async fn fetch_round(
        &self,
        kept: &[RelevantHit],
        store: &mut ContextStore,
    ) -> Result<(), ResearchError> {
        let mut set = JoinSet::new();
        for hit in kept {
            if store.has_fragment_for(&hit.link) {
                debug!(link = %hit.link, "content already stored, skipping fetch");
                continue;
            }
            self.emit(ResearchEvent::FetchStarted {
                title: hit.title.clone(),
                link: hit.link.clone(),
            });
            let fetcher = Arc::clone(&self.fetcher);
            let link = hit.link.clone();
            set.spawn(async move {
                let fetched = fetcher.fetch(&link).await;
                (link, fetched)
            });
        }

        while let Some(joined) = set.join_next().await {
            let Ok((link, fetched)) = joined else {
                continue;
            };
            match fetched {
                Ok(fragment) => {
                    if store.push_fragment(fragment) {
                        self.emit(ResearchEvent::FragmentStored { link });
                    }
                }
                Err(e) => {
                    warn!(link = %link, error = %e, "fetch failed, skipping hit");
                    self.emit(ResearchEvent::FetchSkipped {
                        link,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Race a pipeline stage against cancellation. Dropping the stage
    /// future aborts any tasks it spawned.
    async fn guarded<T, F>(&self, stage: F) -> Result<T, ResearchError>
    where
        F: Future<Output = Result<T, ResearchError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(ResearchError::Cancelled);
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ResearchError::Cancelled),
            result = stage => result,
        }
    }

    fn emit(&self, event: ResearchEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
