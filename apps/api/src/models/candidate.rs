use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A parsed resume, scoped to the uploading user. Immutable after insert
/// apart from `updated_at`; deleting it cascades to its match scores.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 of the uploaded bytes, used for duplicate detection.
    pub file_hash: String,
    pub name: String,
    pub email: Option<String>,
    pub contact: String,
    pub location: String,
    pub title: String,
    pub experience: String,
    pub education: String,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub projects: Vec<String>,
    pub achievements: Vec<String>,
    pub summary: String,
    /// Key of the original file in the blob store.
    pub file_key: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
