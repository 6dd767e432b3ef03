//! Page content retrieval.
//!
//! Two fetchers satisfy the same contract: Firecrawl's scrape API when
//! a key is configured, and a plain HTTP + readable-text extraction
//! fallback when it is not. Either way, empty extracted text is a soft
//! failure distinct from a transport error.

use async_trait::async_trait;
use html2text::from_read;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use shared::error::ResearchError;
use shared::research::ContextFragment;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

const FIRECRAWL_ENDPOINT: &str = "https://api.firecrawl.dev/v1/scrape";

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(45))
        .user_agent("Mozilla/5.0 (compatible; DeepScout/0.1)")
        .build()
        .expect("failed to build HTTP client")
});

/// Turns a URL into a context fragment, best effort.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ContextFragment, ResearchError>;
}

#[derive(Debug, Serialize)]
struct FirecrawlScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
}

/// Firecrawl-backed fetcher; asks the scrape API for markdown.
pub struct FirecrawlFetcher {
    http: Client,
    api_key: String,
}

impl FirecrawlFetcher {
    pub fn new(api_key: String) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            api_key,
        }
    }
}

#[async_trait]
impl ContentFetcher for FirecrawlFetcher {
    async fn fetch(&self, url: &str) -> Result<ContextFragment, ResearchError> {
        info!(url = %url, "scraping via Firecrawl");

        let req = FirecrawlScrapeRequest {
            url,
            formats: ["markdown"],
        };
        let resp = self
            .http
            .post(FIRECRAWL_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| ResearchError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ResearchError::Fetch {
                url: url.to_string(),
                reason: format!("firecrawl returned {}", resp.status()),
            });
        }

        let body: Value = resp.json().await.map_err(|e| ResearchError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match extract_markdown(&body) {
            Some(text) => {
                debug!(url = %url, chars = text.len(), "scrape succeeded");
                Ok(ContextFragment::new(url, text))
            }
            None => Err(ResearchError::EmptyContent {
                url: url.to_string(),
            }),
        }
    }
}

/// Pull the markdown payload out of a Firecrawl response; whitespace-
/// only content counts as missing.
fn extract_markdown(body: &Value) -> Option<String> {
    let text = body
        .get("data")
        .and_then(|d| d.get("markdown"))
        .and_then(|v| v.as_str())?
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Key-less fallback: plain GET plus readable-text extraction.
pub struct PageFetcher {
    http: Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self {
            http: SHARED_HTTP.clone(),
        }
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<ContextFragment, ResearchError> {
        info!(url = %url, "fetching page directly");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ResearchError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ResearchError::Fetch {
                url: url.to_string(),
                reason: format!("page returned {}", resp.status()),
            });
        }

        let html = resp.text().await.map_err(|e| ResearchError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let text = from_read(html.as_bytes(), 80);
        let text = text.trim();
        if text.is_empty() {
            return Err(ResearchError::EmptyContent {
                url: url.to_string(),
            });
        }

        debug!(url = %url, chars = text.len(), "extraction succeeded");
        Ok(ContextFragment::new(url, text))
    }
}
