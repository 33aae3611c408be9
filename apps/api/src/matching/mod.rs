// Candidate-to-job matching: LLM batch scoring, weighted aggregation with
// idempotent upsert, and score-ordered retrieval.
// All LLM calls go through llm_client — no direct Anthropic SDK calls here.

pub mod aggregator;
pub mod engine;
pub mod handlers;
pub mod prompts;
