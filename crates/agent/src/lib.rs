//! Sales advisor - LLM-backed writing help for sales reps
//!
//! - `llm`: the `LlmClient` seam plus Ollama and OpenAI-compatible HTTP clients
//! - `prompts`: tera templates for every prompt sent to a model
//! - `advisor`: objection analysis and proposal drafting
//!
//! The model is strictly a writer. Product recommendations and follow-up timing are
//! deterministic decisions made by `salesdesk-core`.

pub mod advisor;
pub mod llm;
pub mod prompts;

pub use advisor::{
    AdvisorError, ObjectionAnalysis, ObjectionBrief, Proposal, ProposalRequest, ProposalSection,
    ProposedProduct, SalesAdvisor,
};
pub use llm::{client_from_config, LlmClient, LlmError, OllamaClient, OpenAiClient};
