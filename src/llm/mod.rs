//! LLM capability boundary: query optimisation and answer synthesis.
//!
//! The pipeline never talks to an LLM vendor directly. It invokes a named
//! pipe with a mapping of named inputs through [`LlmRunner`] and decodes
//! the typed output. The pipe execution engine itself is an external
//! collaborator; [`runner::HttpPipeRunner`] is the thin HTTP adapter to it.

pub mod optimize;
pub mod runner;
pub mod synthesize;

pub use optimize::optimize;
pub use runner::{HttpPipeRunner, LlmRunner, OPTIMIZE_PIPE, SYNTHESIZE_PIPE};
pub use synthesize::synthesize;
