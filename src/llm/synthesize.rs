//! Answer synthesis: search results → cited, confidence-rated answer.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::json;

use crate::error::{AgentError, Result};
use crate::types::{AgentResponse, ConfidenceLevel, SearchResponse, StructuredResult};

use super::runner::{LlmRunner, SYNTHESIZE_PIPE};

/// Typed pipe output for answer synthesis.
#[derive(Debug, Deserialize)]
struct SynthesizedAnswer {
    search_results_summary: Option<String>,
    comprehensive_answer: String,
    #[serde(default)]
    sources: Vec<String>,
    confidence_level: ConfidenceLevel,
}

/// Produce the final [`AgentResponse`] from aggregated search results.
///
/// An empty result set yields a low-confidence response acknowledging that
/// nothing was found, without invoking the pipe — the run never fails on
/// empty results. When no result carried extracted page text (all sources
/// are snippet fallback), the reported confidence is capped at `medium`.
///
/// # Errors
///
/// Returns [`AgentError::Llm`] when the pipe fails or its output cannot
/// be decoded.
pub async fn synthesize<L: LlmRunner>(
    runner: &L,
    user_query: &str,
    response: &SearchResponse,
) -> Result<AgentResponse> {
    if response.results.is_empty() {
        tracing::debug!("no results to synthesize, returning low-confidence response");
        return Ok(no_results_response(user_query, response));
    }

    let inputs = json!({
        "user_query": user_query,
        "result_summary": &response.result_summary,
        "results": &response.results,
        "formatted_results": format_result_blocks(&response.results),
    });

    let output = runner.run_pipe(SYNTHESIZE_PIPE, inputs).await?;
    let answer: SynthesizedAnswer = serde_json::from_value(output)
        .map_err(|e| AgentError::Llm(format!("undecodable synthesis output: {e}")))?;

    let mut sources: BTreeSet<String> = answer
        .sources
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    if sources.is_empty() {
        sources = response.results.iter().map(|r| r.url.clone()).collect();
    }

    let confidence_level = cap_confidence(answer.confidence_level, response.extracted_count);
    if confidence_level != answer.confidence_level {
        tracing::debug!(
            reported = %answer.confidence_level,
            capped = %confidence_level,
            "confidence capped, all sources are snippet fallback"
        );
    }

    Ok(AgentResponse {
        user_query: user_query.to_owned(),
        search_results_summary: answer
            .search_results_summary
            .unwrap_or_else(|| response.result_summary.clone()),
        comprehensive_answer: answer.comprehensive_answer,
        sources,
        confidence_level,
    })
}

/// Confidence never exceeds `medium` when every source is snippet-only.
fn cap_confidence(reported: ConfidenceLevel, extracted_count: usize) -> ConfidenceLevel {
    if extracted_count == 0 {
        reported.min(ConfidenceLevel::Medium)
    } else {
        reported
    }
}

/// Response for a run whose search found nothing.
fn no_results_response(user_query: &str, response: &SearchResponse) -> AgentResponse {
    let kind = response.query.kind();
    let note = format!(
        "No {kind} results were found for '{}'. Try a different search term or search type.",
        response.query.text()
    );
    AgentResponse {
        user_query: user_query.to_owned(),
        search_results_summary: format!(
            "No {kind} results were found for '{}'.",
            response.query.text()
        ),
        comprehensive_answer: note,
        sources: BTreeSet::new(),
        confidence_level: ConfidenceLevel::Low,
    }
}

/// Render results as markdown blocks for the synthesis prompt.
fn format_result_blocks(results: &[StructuredResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "## {}\n**Domain:** {}\n**URL:** {}\n\n{}\n",
                r.title, r.domain, r.url, r.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SearchKind, SearchQuery};
    use serde_json::Value;

    /// Runner returning a fixed output; panics if invoked when forbidden.
    struct FixedRunner {
        output: Value,
        forbid_calls: bool,
    }

    impl LlmRunner for FixedRunner {
        async fn run_pipe(&self, _pipe_code: &str, _inputs: Value) -> Result<Value> {
            assert!(!self.forbid_calls, "pipe must not be invoked for this input");
            Ok(self.output.clone())
        }
    }

    fn make_result(n: usize) -> StructuredResult {
        StructuredResult {
            title: format!("Result {n}"),
            url: format!("https://site-{n}.example.com"),
            domain: format!("site-{n}.example.com"),
            content: format!("Content {n}"),
            published_at: None,
            rank: n,
        }
    }

    fn make_response(results: Vec<StructuredResult>, extracted_count: usize) -> SearchResponse {
        SearchResponse {
            query: SearchQuery::new("test query", SearchKind::General, 5),
            result_summary: format!(
                "Extracted content from {extracted_count} of {} search results for query: 'test query'",
                results.len()
            ),
            results,
            extracted_count,
        }
    }

    fn answer_output(confidence: &str, sources: Vec<&str>) -> Value {
        json!({
            "search_results_summary": "Summary of findings",
            "comprehensive_answer": "A thorough answer.",
            "sources": sources,
            "confidence_level": confidence,
        })
    }

    #[tokio::test]
    async fn empty_results_yield_low_confidence_without_pipe_call() {
        let runner = FixedRunner {
            output: json!(null),
            forbid_calls: true,
        };
        let response = make_response(vec![], 0);

        let answer = synthesize(&runner, "What is AI?", &response)
            .await
            .expect("must complete");
        assert_eq!(answer.confidence_level, ConfidenceLevel::Low);
        assert!(answer.sources.is_empty());
        assert!(answer.comprehensive_answer.contains("No search results were found"));
        assert_eq!(answer.user_query, "What is AI?");
    }

    #[tokio::test]
    async fn well_formed_output_passes_through() {
        let runner = FixedRunner {
            output: answer_output("high", vec!["https://site-1.example.com"]),
            forbid_calls: false,
        };
        let response = make_response(vec![make_result(1), make_result(2)], 2);

        let answer = synthesize(&runner, "q", &response).await.expect("should work");
        assert_eq!(answer.confidence_level, ConfidenceLevel::High);
        assert_eq!(answer.comprehensive_answer, "A thorough answer.");
        assert_eq!(answer.search_results_summary, "Summary of findings");
        assert!(answer.sources.contains("https://site-1.example.com"));
    }

    #[tokio::test]
    async fn confidence_capped_when_no_extractions() {
        let runner = FixedRunner {
            output: answer_output("high", vec!["https://site-1.example.com"]),
            forbid_calls: false,
        };
        let response = make_response(vec![make_result(1)], 0);

        let answer = synthesize(&runner, "q", &response).await.expect("should work");
        assert_eq!(answer.confidence_level, ConfidenceLevel::Medium);
    }

    #[tokio::test]
    async fn low_confidence_not_raised_by_cap() {
        let runner = FixedRunner {
            output: answer_output("low", vec![]),
            forbid_calls: false,
        };
        let response = make_response(vec![make_result(1)], 0);

        let answer = synthesize(&runner, "q", &response).await.expect("should work");
        assert_eq!(answer.confidence_level, ConfidenceLevel::Low);
    }

    #[tokio::test]
    async fn empty_sources_default_to_result_urls() {
        let runner = FixedRunner {
            output: answer_output("medium", vec![]),
            forbid_calls: false,
        };
        let response = make_response(vec![make_result(1), make_result(2)], 2);

        let answer = synthesize(&runner, "q", &response).await.expect("should work");
        assert_eq!(answer.sources.len(), 2);
        assert!(answer.sources.contains("https://site-1.example.com"));
        assert!(answer.sources.contains("https://site-2.example.com"));
    }

    #[tokio::test]
    async fn duplicate_sources_collapse() {
        let runner = FixedRunner {
            output: answer_output(
                "medium",
                vec!["https://a.example.com", "https://a.example.com"],
            ),
            forbid_calls: false,
        };
        let response = make_response(vec![make_result(1)], 1);

        let answer = synthesize(&runner, "q", &response).await.expect("should work");
        assert_eq!(answer.sources.len(), 1);
    }

    #[tokio::test]
    async fn missing_summary_falls_back_to_aggregate_summary() {
        let runner = FixedRunner {
            output: json!({
                "comprehensive_answer": "Answer.",
                "sources": ["https://site-1.example.com"],
                "confidence_level": "medium",
            }),
            forbid_calls: false,
        };
        let response = make_response(vec![make_result(1)], 1);

        let answer = synthesize(&runner, "q", &response).await.expect("should work");
        assert!(answer.search_results_summary.contains("Extracted content from 1 of 1"));
    }

    #[tokio::test]
    async fn undecodable_output_is_llm_error() {
        let runner = FixedRunner {
            output: json!({ "unexpected": "shape" }),
            forbid_calls: false,
        };
        let response = make_response(vec![make_result(1)], 1);

        let err = synthesize(&runner, "q", &response).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }

    #[test]
    fn result_blocks_carry_title_domain_url_content() {
        let blocks = format_result_blocks(&[make_result(1), make_result(2)]);
        assert!(blocks.contains("## Result 1"));
        assert!(blocks.contains("**Domain:** site-1.example.com"));
        assert!(blocks.contains("**URL:** https://site-2.example.com"));
        assert!(blocks.contains("Content 2"));
        assert!(blocks.contains("\n---\n"));
    }

    #[test]
    fn cap_confidence_table() {
        assert_eq!(
            cap_confidence(ConfidenceLevel::High, 0),
            ConfidenceLevel::Medium
        );
        assert_eq!(
            cap_confidence(ConfidenceLevel::Medium, 0),
            ConfidenceLevel::Medium
        );
        assert_eq!(cap_confidence(ConfidenceLevel::Low, 0), ConfidenceLevel::Low);
        assert_eq!(
            cap_confidence(ConfidenceLevel::High, 3),
            ConfidenceLevel::High
        );
    }
}
