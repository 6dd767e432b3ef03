use crate::reasoner::Reasoner;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::ResearchError;
use std::env;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    /// JSON Schema the reply must conform to; omitted for free-form
    /// completions.
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Reasoner backed by a local Ollama server.
pub struct OllamaClient {
    http: Client,
    base: String,
    model: String,
}

impl OllamaClient {
    pub fn new(model: String) -> Self {
        let base =
            env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:11434".to_string());
        Self {
            http: SHARED_HTTP.clone(),
            base,
            model,
        }
    }

    async fn chat(&self, prompt: &str, format: Option<&Value>) -> Result<String, ResearchError> {
        let url = format!("{}/api/chat", self.base);
        let req = OllamaChatRequest {
            model: &self.model,
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            format,
        };

        let resp = self
            .http
            .post(url)
            .json(&req)
            .send()
            .await
            .map_err(|e| ResearchError::Reasoner(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ResearchError::Reasoner(format!(
                "ollama error: {}",
                resp.status()
            )));
        }

        let body: OllamaChatResponse = resp
            .json()
            .await
            .map_err(|e| ResearchError::Reasoner(e.to_string()))?;
        debug!(model = %self.model, chars = body.message.content.len(), "ollama reply received");
        Ok(body.message.content)
    }
}

#[async_trait]
impl Reasoner for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, ResearchError> {
        self.chat(prompt, None).await
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, ResearchError> {
        self.chat(prompt, Some(schema)).await
    }
}
