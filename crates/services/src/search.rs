//! Web search via SerpAPI.
//!
//! One query in, a ranked list of organic results out. A failed or
//! non-success response surfaces as a search error the orchestrator
//! downgrades to zero hits, so a bad round degrades instead of
//! crashing the run.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::error::ResearchError;
use shared::research::SearchHit;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const SERP_ENDPOINT: &str = "https://serpapi.com/search";
const DEFAULT_MAX_RESULTS: usize = 10;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client")
});

/// Executes one text query against a web search engine.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ResearchError>;
}

/// SerpAPI-backed Google search with a fixed locale.
pub struct SerpClient {
    http: Client,
    api_key: String,
    max_results: usize,
}

impl SerpClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            api_key,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

#[async_trait]
impl SearchProvider for SerpClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ResearchError> {
        info!(query = %query, "searching via SerpAPI");

        let resp = self
            .http
            .get(SERP_ENDPOINT)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("engine", "google"),
                ("q", query),
                ("google_domain", "google.com"),
                ("hl", "en"),
            ])
            .send()
            .await
            .map_err(|e| ResearchError::Search(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ResearchError::Search(format!(
                "serpapi returned {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ResearchError::Search(e.to_string()))?;

        let hits = parse_organic_results(&body, self.max_results);
        debug!(query = %query, hits = hits.len(), "search completed");
        Ok(hits)
    }
}

/// Pull `organic_results` out of a SerpAPI response body. Entries with
/// a missing or unparseable link are dropped; a missing snippet is
/// tolerated.
fn parse_organic_results(body: &Value, max: usize) -> Vec<SearchHit> {
    let Some(results) = body.get("organic_results").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|result| {
            let title = result.get("title")?.as_str()?.to_string();
            let link = result.get("link")?.as_str()?.to_string();
            Url::parse(&link).ok()?;
            let snippet = result
                .get("snippet")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            Some(SearchHit {
                title,
                link,
                snippet,
            })
        })
        .take(max)
        .collect()
}
