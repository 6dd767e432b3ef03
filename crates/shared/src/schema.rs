//! Structured-output shapes for reasoner calls.
//!
//! Each LLM-backed step constrains the model's reply to one of these
//! shapes. The JSON Schema handed to the provider is declared as plain
//! data next to the type it must deserialize into, so the contract
//! lives in one place.

use crate::research::{RelevantHit, RoundResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// Reply shape for query planning: the opening search queries.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannedQueries {
    pub queries: Vec<String>,
}

impl PlannedQueries {
    pub const NAME: &'static str = "PlannedQueries";

    pub fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["queries"]
        })
    }
}

/// Reply shape for relevance filtering: the subset of hits worth
/// fetching, by title and link.
#[derive(Debug, Clone, Deserialize)]
pub struct RelevantSelection {
    pub results: Vec<RelevantHit>,
}

impl RelevantSelection {
    pub const NAME: &'static str = "RelevantSelection";

    pub fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "results": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "link": { "type": "string" }
                        },
                        "required": ["title", "link"]
                    }
                }
            },
            "required": ["results"]
        })
    }
}

/// Reply shape for the sufficiency check: whether to keep researching,
/// and with which follow-up queries.
#[derive(Debug, Clone, Deserialize)]
pub struct SufficiencyVerdict {
    pub further_research: bool,
    #[serde(default)]
    pub follow_up_queries: Option<Vec<String>>,
}

impl SufficiencyVerdict {
    pub const NAME: &'static str = "SufficiencyVerdict";

    pub fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "further_research": { "type": "boolean" },
                "follow_up_queries": {
                    "type": ["array", "null"],
                    "items": { "type": "string" }
                }
            },
            "required": ["further_research"]
        })
    }

    /// Collapse into the loop's control value. A missing follow-up list
    /// and an empty one carry the same meaning: nothing left to ask.
    pub fn into_round_result(self) -> RoundResult {
        RoundResult {
            continue_research: self.further_research,
            follow_up_queries: self.follow_up_queries.unwrap_or_default(),
        }
    }
}
