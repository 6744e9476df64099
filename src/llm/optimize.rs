//! Query optimisation: user question → search-engine-effective query.

use serde_json::{json, Value};

use crate::error::Result;

use super::runner::{LlmRunner, OPTIMIZE_PIPE};

/// Transform the user's question into a terse search query.
///
/// Accepts either a bare string output or an object with a `query` field
/// from the pipe. Empty or degenerate output falls back to the user query
/// verbatim rather than failing the run; a provider error propagates.
///
/// # Errors
///
/// Returns [`crate::error::AgentError::Llm`] when the pipe itself fails.
pub async fn optimize<L: LlmRunner>(runner: &L, user_query: &str) -> Result<String> {
    let output = runner
        .run_pipe(OPTIMIZE_PIPE, json!({ "user_query": user_query }))
        .await?;

    match coerce_query_text(&output) {
        Some(text) => {
            tracing::debug!(optimized = %text, "query optimised");
            Ok(text)
        }
        None => {
            tracing::warn!("degenerate optimiser output, using user query verbatim");
            Ok(user_query.to_owned())
        }
    }
}

/// Pull a usable query string out of the pipe output, if there is one.
fn coerce_query_text(value: &Value) -> Option<String> {
    let text = value
        .as_str()
        .or_else(|| value.get("query").and_then(Value::as_str))?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
