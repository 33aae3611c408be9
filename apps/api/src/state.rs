use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::engine::ScoringEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Pluggable candidate scorer. Default: LlmScoringEngine over `llm`.
    pub scorer: Arc<dyn ScoringEngine>,
}
