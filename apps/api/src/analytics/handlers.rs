use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

/// Composite threshold for counting a match as "high scoring".
const HIGH_SCORE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Serialize, FromRow)]
pub struct TopMatchSummary {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub candidate_name: String,
    pub job_title: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_candidates: i64,
    pub total_jobs: i64,
    pub total_matches: i64,
    pub high_scoring_matches: i64,
    pub top_matches: Vec<TopMatchSummary>,
}

/// GET /api/v1/analytics/dashboard
/// Per-user counts plus the five best matches across all jobs.
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let total_candidates: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM candidates WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&state.db)
            .await?;

    let total_jobs: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM job_postings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&state.db)
            .await?;

    let total_matches: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM match_scores WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&state.db)
            .await?;

    let high_scoring_matches: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM match_scores WHERE user_id = $1 AND total_score >= $2",
    )
    .bind(user_id)
    .bind(HIGH_SCORE_THRESHOLD)
    .fetch_one(&state.db)
    .await?;

    let top_matches: Vec<TopMatchSummary> = sqlx::query_as(
        r#"
        SELECT m.candidate_id, m.job_id, c.name AS candidate_name,
               j.title AS job_title, m.total_score AS score
        FROM match_scores m
        JOIN candidates c ON c.id = m.candidate_id
        JOIN job_postings j ON j.id = m.job_id
        WHERE m.user_id = $1
        ORDER BY m.total_score DESC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(DashboardResponse {
        total_candidates,
        total_jobs,
        total_matches,
        high_scoring_matches,
        top_matches,
    }))
}
