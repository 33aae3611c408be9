use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// SHA-256 hex digest of the user's API key. The plaintext key is never stored.
    pub api_key_sha256: String,
    pub created_at: DateTime<Utc>,
}
