use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One scored (job, candidate) pair. Exactly one row exists per pair;
/// re-scoring replaces values in place, keeping the row identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchScoreRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub user_id: Uuid,
    pub skills_score: f64,
    pub skills_explanation: String,
    pub experience_score: f64,
    pub experience_explanation: String,
    pub education_score: f64,
    pub education_explanation: String,
    pub certifications_score: f64,
    pub certifications_explanation: String,
    pub skills_matched: Vec<String>,
    pub skills_related: Vec<String>,
    pub skills_missing: Vec<String>,
    pub achievements: Vec<String>,
    /// Weighted composite, recomputed server-side — never trusted from the engine.
    pub total_score: f64,
    pub created_at: DateTime<Utc>,
}
