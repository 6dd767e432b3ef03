//! Deep Scout CLI.
//!
//! Prompts for a topic, an objective, and a research width, runs the
//! round loop, and prints the final cited report to stdout. Progress
//! lines and logs go to stderr so the report can be piped cleanly.

use anyhow::{bail, Context, Result};
use providers::OllamaClient;
use researcher::ResearchOrchestrator;
use services::{ContentFetcher, FirecrawlFetcher, PageFetcher, SearchProvider, SerpClient};
use shared::error::ResearchError;
use shared::events::ResearchEvent;
use shared::research::ResearchRequest;
use shared::settings::Settings;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const MIN_WIDTH: usize = 1;
const MAX_WIDTH: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let settings = Settings::from_env();
    let Some(serp_key) = settings.serp_api_key.clone() else {
        bail!("SERP_API_KEY is not set; web search is required");
    };

    let topic = prompt_line("Topic of Research")?;
    let objective = prompt_line("Research objective")?;
    let width = read_width()?;

    let reasoner = Arc::new(OllamaClient::new(settings.model.clone()));
    let search: Arc<dyn SearchProvider> = Arc::new(SerpClient::new(serp_key));
    let fetcher: Arc<dyn ContentFetcher> = match settings.firecrawl_api_key.clone() {
        Some(key) => Arc::new(FirecrawlFetcher::new(key)),
        None => {
            eprintln!("FIRECRAWL_API_KEY is not set; using plain page fetching.");
            Arc::new(PageFetcher::new())
        }
    };

    let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
    let progress = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            render_event(&event);
        }
    });

    let orchestrator =
        ResearchOrchestrator::new(reasoner, search, fetcher, settings.max_rounds)
            .with_events(events_tx);

    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let request = ResearchRequest {
        topic,
        objective,
        width,
    };
    let outcome = match orchestrator.run(&request).await {
        Ok(outcome) => outcome,
        Err(ResearchError::Cancelled) => {
            eprintln!("Research cancelled.");
            std::process::exit(130);
        }
        Err(e) => return Err(e).context("research run failed"),
    };

    // Dropping the orchestrator closes the event channel and lets the
    // progress task drain and exit.
    drop(orchestrator);
    let _ = progress.await;

    eprintln!(
        "Research finished after {} round(s) with {} source(s).",
        outcome.rounds_executed,
        outcome.store.sources().len()
    );
    println!("{}", outcome.report);
    Ok(())
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading stdin")?;
    Ok(line.trim().to_string())
}

fn read_width() -> Result<usize> {
    let raw = prompt_line("Width of Research (1-5)")?;
    let parsed: usize = raw
        .parse()
        .with_context(|| format!("width must be an integer between 1 and 5, got {raw:?}"))?;
    let width = parsed.clamp(MIN_WIDTH, MAX_WIDTH);
    if width != parsed {
        eprintln!("Width {parsed} is out of range; using {width}.");
    }
    Ok(width)
}

fn render_event(event: &ResearchEvent) {
    match event {
        ResearchEvent::RoundStarted { round, queries } => {
            eprintln!("Round {round}: searching {} queries", queries.len());
        }
        ResearchEvent::SearchCompleted { query, hits } => {
            eprintln!("  {hits} hit(s) for {query:?}");
        }
        ResearchEvent::PoolFiltered { pool, kept } => {
            eprintln!("  Kept {kept} of {pool} results");
        }
        ResearchEvent::FetchStarted { title, .. } => {
            eprintln!("  Retrieving research context for the resource: {title}");
        }
        ResearchEvent::FragmentStored { .. } => {}
        ResearchEvent::FetchSkipped { link, reason } => {
            eprintln!("  Skipped {link}: {reason}");
        }
        ResearchEvent::RoundEvaluated {
            round,
            continue_research,
            ..
        } => {
            if *continue_research {
                eprintln!("Round {round}: more research needed");
            } else {
                eprintln!("Round {round}: context judged sufficient");
            }
        }
        ResearchEvent::BoundReached { rounds } => {
            eprintln!(
                "Max rounds ({rounds}) reached. Proceeding with the available research context."
            );
        }
        ResearchEvent::SynthesisStarted { sources, fragments } => {
            eprintln!(
                "Writing report from {fragments} fragment(s) across {sources} source(s)..."
            );
        }
    }
}
