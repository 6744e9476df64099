//! Pipe runner trait and the HTTP adapter to the execution engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AgentConfig;
use crate::error::AgentError;

/// Pipe that turns a user question into a terse search query.
pub const OPTIMIZE_PIPE: &str = "optimize_search_query";
/// Pipe that turns search results into a cited, confidence-rated answer.
pub const SYNTHESIZE_PIPE: &str = "synthesize_answer";

/// An LLM pipe execution capability.
///
/// Accepts a named pipe plus a mapping of named inputs and returns the
/// pipe's structured output. Invocation is synchronous from the caller's
/// perspective; a provider failure surfaces as [`AgentError::Llm`] and is
/// fatal for the run, since no local recovery is possible.
pub trait LlmRunner: Send + Sync {
    /// Run the named pipe with the given input mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Llm`] on provider failure or an undecodable
    /// response envelope.
    fn run_pipe(
        &self,
        pipe_code: &str,
        inputs: Value,
    ) -> impl std::future::Future<Output = Result<Value, AgentError>> + Send;
}

#[derive(Debug, Serialize)]
struct PipeRequest<'a> {
    pipe_code: &'a str,
    input_memory: &'a Value,
}

#[derive(Debug, Deserialize)]
struct PipeEnvelope {
    output: Value,
}

/// HTTP adapter posting pipe invocations to the execution service.
pub struct HttpPipeRunner {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpPipeRunner {
    /// Build a runner from agent configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.llm_timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build LLM client: {e}")))?;
        Ok(Self {
            endpoint: config.llm_endpoint.clone(),
            client,
        })
    }
}

impl LlmRunner for HttpPipeRunner {
    async fn run_pipe(&self, pipe_code: &str, inputs: Value) -> Result<Value, AgentError> {
        tracing::trace!(pipe_code, "running LLM pipe");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&PipeRequest {
                pipe_code,
                input_memory: &inputs,
            })
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("pipe '{pipe_code}' request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Llm(format!(
                "pipe '{pipe_code}' returned status {status}"
            )));
        }

        let envelope: PipeEnvelope = response
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("pipe '{pipe_code}' undecodable output: {e}")))?;
        Ok(envelope.output)
    }
}
