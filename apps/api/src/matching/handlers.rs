use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::matching::aggregator;
use crate::matching::engine::CandidateSummary;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobPostingRow;
use crate::models::score::MatchScoreRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub job_id: Uuid,
    /// Restricts the match to these candidates; all of the user's
    /// candidates when omitted.
    pub candidate_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub message: String,
    pub matched: usize,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct TopMatchesQuery {
    #[serde(default)]
    pub min_score: f64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

async fn fetch_owned_job(
    state: &AppState,
    job_id: Uuid,
    user_id: Uuid,
) -> Result<JobPostingRow, AppError> {
    sqlx::query_as::<_, JobPostingRow>(
        "SELECT * FROM job_postings WHERE id = $1 AND user_id = $2",
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Job posting not found".to_string()))
}

/// Reassembles a scoring-ready job text from the stored structured fields.
pub fn compose_job_text(job: &JobPostingRow) -> String {
    format!(
        "Job Title: {}\nCompany: {}\nRequired Skills: {}\nPreferred Skills: {}\nExperience: {}\nQualifications: {}\nDescription: {}",
        job.title,
        job.company,
        job.required_skills.join(", "),
        job.preferred_skills.join(", "),
        job.experience_required,
        job.qualifications.join("; "),
        job.description,
    )
}

/// POST /api/v1/matches
/// Scores chosen candidates against a job. Unlike the fan-out on job upload,
/// a scoring engine failure here is a hard error.
pub async fn match_candidates(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let job = fetch_owned_job(&state, req.job_id, user_id).await?;

    let candidates: Vec<CandidateRow> = match &req.candidate_ids {
        Some(ids) => {
            sqlx::query_as("SELECT * FROM candidates WHERE user_id = $1 AND id = ANY($2)")
                .bind(user_id)
                .bind(ids)
                .fetch_all(&state.db)
                .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM candidates WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&state.db)
                .await?
        }
    };

    if candidates.is_empty() {
        return Err(AppError::NotFound("No candidates found".to_string()));
    }

    let summaries: Vec<CandidateSummary> =
        candidates.iter().map(CandidateSummary::from_row).collect();
    let known: HashSet<Uuid> = candidates.iter().map(|c| c.id).collect();

    info!(
        "Scoring {} candidates against job {}",
        summaries.len(),
        job.id
    );
    let scores = state
        .scorer
        .score_batch(&compose_job_text(&job), &summaries)
        .await?;

    if scores.is_empty() {
        return Err(AppError::Llm(
            "Scoring engine returned no results. This may be due to rate limits or processing errors."
                .to_string(),
        ));
    }

    let stored = aggregator::aggregate_batch(&state.db, job.id, user_id, &known, &scores).await?;
    info!("Stored {stored} match scores for job {}", job.id);

    Ok(Json(MatchResponse {
        message: format!("Matched {stored} candidates successfully"),
        matched: stored,
    }))
}

/// GET /api/v1/matches/:job_id
/// Top matching candidates for a job, filtered by minimum composite score,
/// ordered best-first. 404 unless the job exists and belongs to the caller.
pub async fn top_matches(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(job_id): Path<Uuid>,
    Query(params): Query<TopMatchesQuery>,
) -> Result<Json<Vec<MatchScoreRow>>, AppError> {
    fetch_owned_job(&state, job_id, user_id).await?;

    let scores: Vec<MatchScoreRow> = sqlx::query_as(
        r#"
        SELECT * FROM match_scores
        WHERE job_id = $1 AND user_id = $2 AND total_score >= $3
        ORDER BY total_score DESC
        LIMIT $4
        "#,
    )
    .bind(job_id)
    .bind(user_id)
    .bind(params.min_score)
    .bind(params.limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_compose_job_text_includes_key_fields() {
        let job = JobPostingRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            file_hash: String::new(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            employment_type: "Full-time".to_string(),
            experience_required: "3+ years".to_string(),
            required_skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            preferred_skills: vec!["AWS".to_string()],
            responsibilities: vec![],
            qualifications: vec!["BS in CS".to_string()],
            description: "Build services.".to_string(),
            file_key: String::new(),
            filename: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let text = compose_job_text(&job);
        assert!(text.contains("Backend Engineer"));
        assert!(text.contains("Rust, PostgreSQL"));
        assert!(text.contains("3+ years"));
        assert!(text.contains("Acme"));
    }

    #[test]
    fn test_top_matches_query_defaults() {
        let q: TopMatchesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.min_score, 0.0);
        assert_eq!(q.limit, 100);
    }
}
