use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A parsed job description, scoped to the uploading user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_hash: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub employment_type: String,
    pub experience_required: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub responsibilities: Vec<String>,
    pub qualifications: Vec<String>,
    pub description: String,
    pub file_key: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
