// Upload ingestion: content fingerprinting, LLM parsing into structured
// records, and the per-file outcome types shared by the candidate and job
// upload pipelines.

pub mod fingerprint;
pub mod parser;
pub mod pipeline;
pub mod prompts;
