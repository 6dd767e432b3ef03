pub mod error;
pub mod events;
pub mod research;
pub mod schema;

pub mod settings {
    use std::env;

    /// Everything the pipeline reads from the environment. No state is
    /// persisted between runs; each invocation is self-contained.
    #[derive(Debug, Clone)]
    pub struct Settings {
        /// SerpAPI key. Search is the one collaborator the run cannot
        /// do without.
        pub serp_api_key: Option<String>,
        /// Firecrawl key; when absent, page content is extracted with
        /// the plain HTTP fetcher instead.
        pub firecrawl_api_key: Option<String>,
        /// Reasoner model identifier, e.g. "llama3.2:3b" for Ollama.
        pub model: String,
        /// Hard cap on research rounds before the report is written
        /// from whatever context exists.
        pub max_rounds: usize,
    }

    const DEFAULT_MODEL: &str = "llama3.2:3b";
    const DEFAULT_MAX_ROUNDS: usize = 2;

    impl Settings {
        pub fn from_env() -> Self {
            let max_rounds = env::var("MAX_RESEARCH_ROUNDS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_MAX_ROUNDS);

            Self {
                serp_api_key: non_empty(env::var("SERP_API_KEY").ok()),
                firecrawl_api_key: non_empty(env::var("FIRECRAWL_API_KEY").ok()),
                model: non_empty(env::var("MODEL").ok())
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_rounds,
            }
        }
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                serp_api_key: None,
                firecrawl_api_key: None,
                model: DEFAULT_MODEL.to_string(),
                max_rounds: DEFAULT_MAX_ROUNDS,
            }
        }
    }

    fn non_empty(value: Option<String>) -> Option<String> {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

}
