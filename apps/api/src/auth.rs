use axum::{extract::FromRequestParts, http::request::Parts};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The authenticated owning user, resolved from a bearer API key.
/// Every data-scoping query predicate includes this id.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

/// Hex SHA-256 of an API key, the form keys are stored in.
pub fn api_key_digest(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;

        let user: Option<User> =
            sqlx::query_as("SELECT * FROM users WHERE api_key_sha256 = $1")
                .bind(api_key_digest(token))
                .fetch_optional(&state.db)
                .await?;

        user.map(|u| AuthUser(u.id)).ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_hex_sha256() {
        let d = api_key_digest("secret-key");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(api_key_digest("abc"), api_key_digest("abc"));
        assert_ne!(api_key_digest("abc"), api_key_digest("abd"));
    }
}
