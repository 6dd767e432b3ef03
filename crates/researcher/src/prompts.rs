//! Prompt construction for every reasoner call.
//!
//! Prompts are plain strings; the output contract travels separately as
//! a JSON Schema on structured calls. Keeping the wording in one module
//! makes it reviewable next to the shapes it must elicit.

use shared::research::{ContextStore, SearchHit};

/// Context fragments beyond this many characters are truncated before
/// entering a prompt, so a handful of long pages cannot crowd out the
/// rest of the accumulated context.
const MAX_FRAGMENT_CHARS: usize = 4000;

pub fn plan_queries(topic: &str, objective: &str, width: usize) -> String {
    format!(
        "Given the user's research topic, generate {width} search queries (to be used as \
         Google search queries) that will start a deep research effort on the topic. The \
         queries must be unique, with zero overlap between them; together they define the \
         width of the research. Generate nothing apart from the {width} queries.\n\
         Research topic: {topic}\n\
         Research objective: {objective}\n\
         While generating the queries, work from the main objective and consider how they \
         can progressively cover the topic."
    )
}

pub fn judge_relevance(topic: &str, objective: &str, width: usize, pool: &[SearchHit]) -> String {
    let pool_json = serde_json::to_string(pool).unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are an expert data extractor. You are given a list of search results for a \
         research effort; each entry has a title, a link, and a snippet. Using only the \
         title and snippet, decide which results are relevant to the research objective. \
         Return the title AND link of up to {width} relevant results, drawn strictly from \
         the provided list.\n\
         Search results: {pool_json}\n\
         Research topic: {topic}\n\
         Research objective: {objective}"
    )
}

pub fn assess_sufficiency(
    topic: &str,
    objective: &str,
    store: &ContextStore,
    width: usize,
) -> String {
    format!(
        "You are an expert information extractor working on the research topic: {topic}\n\
         The objective of the research is: {objective}\n\
         The research context gathered so far is below.\n\
         {context}\n\
         Based on this, decide whether further research is required for a comprehensive \
         report. If more information is needed, also generate {width} probing queries that \
         go deeper into the topic. Each query must be specific and precise to gaps in the \
         current context, as it will be used to fetch web search results for further \
         research.",
        context = render_context(store),
    )
}

pub fn write_report(topic: &str, objective: &str, store: &ContextStore) -> String {
    format!(
        "You are an expert analyst. Use the research topic, objective, and gathered \
         context to produce a clear and comprehensive report.\n\
         Research topic: {topic}\n\
         Research objective: {objective}\n\
         Research context:\n{context}\n\
         Sources seen during research:\n{sources}\n\
         Cover all relevant findings, named entities, and figures. You MUST include a \
         references section and add citations appropriately, drawing them from the listed \
         sources. The report must be in markdown format; section titles and in-report \
         formatting are up to you.",
        context = render_context(store),
        sources = render_sources(store),
    )
}

fn render_context(store: &ContextStore) -> String {
    if store.is_empty() {
        return "(no context has been gathered yet)".to_string();
    }

    store
        .fragments()
        .iter()
        .enumerate()
        .map(|(i, fragment)| {
            format!(
                "[{n}] Source: {source}\n{text}",
                n = i + 1,
                source = fragment.source,
                text = truncate_chars(&fragment.text, MAX_FRAGMENT_CHARS),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_sources(store: &ContextStore) -> String {
    store
        .sources()
        .iter()
        .map(|hit| format!("- {} ({})", hit.title, hit.link))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate on a character boundary, never mid-codepoint.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::research::ContextFragment;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte characters must not be split.
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_render_context_numbers_fragments() {
        let mut store = ContextStore::new();
        store.push_fragment(ContextFragment::new("https://a.example", "alpha"));
        store.push_fragment(ContextFragment::new("https://b.example", "beta"));

        let rendered = render_context(&store);
        assert!(rendered.contains("[1] Source: https://a.example"));
        assert!(rendered.contains("[2] Source: https://b.example"));
        assert!(rendered.contains("beta"));
    }

    #[test]
    fn test_plan_prompt_carries_width_and_topic() {
        let prompt = plan_queries("solid-state batteries", "commercial viability", 3);
        assert!(prompt.contains("generate 3 search queries"));
        assert!(prompt.contains("solid-state batteries"));
    }
}
