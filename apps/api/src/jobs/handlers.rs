use std::collections::HashSet;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::candidates::handlers::Pagination;
use crate::errors::AppError;
use crate::extract::{self, FileKind};
use crate::ingest::fingerprint::fingerprint;
use crate::ingest::parser;
use crate::ingest::pipeline::{
    read_upload_batch, sufficient_text, SkippedFile, UploadReport, UploadedFile,
};
use crate::matching::aggregator;
use crate::matching::engine::CandidateSummary;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobPostingRow;
use crate::state::AppState;
use crate::storage;

/// POST /api/v1/jobs/upload
/// Multi-file job description upload. Same pipeline as candidate upload but
/// deduped by (title, company), and every successfully persisted posting
/// fans out one scoring call covering all of the user's existing candidates.
/// A scoring failure during fan-out is logged, not surfaced — the upload
/// itself still succeeds.
pub async fn upload_jobs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadReport<JobPostingRow>>, AppError> {
    let files = read_upload_batch(multipart).await?;
    let mut created = Vec::new();
    let mut skipped = Vec::new();

    for UploadedFile {
        filename,
        content_type,
        bytes,
    } in files
    {
        let Some(kind) = FileKind::from_filename(&filename) else {
            skipped.push(SkippedFile::unsupported_format(&filename));
            continue;
        };

        let file_hash = fingerprint(&bytes);
        let duplicate: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM job_postings WHERE user_id = $1 AND file_hash = $2",
        )
        .bind(user_id)
        .bind(&file_hash)
        .fetch_optional(&state.db)
        .await?;
        if duplicate.is_some() {
            info!("Skipping duplicate JD file (by hash): {filename}");
            skipped.push(SkippedFile::duplicate_content(&filename));
            continue;
        }

        let text =
            extract::extract_text(kind, &bytes).map_err(|e| AppError::FileProcessing {
                filename: filename.clone(),
                message: e.to_string(),
            })?;
        if !sufficient_text(&text) {
            skipped.push(SkippedFile::insufficient_text(&filename));
            continue;
        }

        let parsed = parser::parse_job(&state.llm, &text).await;

        // Dedupe by (title, company) only when the parse produced both.
        if !parsed.title.is_empty() && !parsed.company.is_empty() {
            let duplicate: Option<Uuid> = sqlx::query_scalar(
                "SELECT id FROM job_postings WHERE user_id = $1 AND title = $2 AND company = $3",
            )
            .bind(user_id)
            .bind(&parsed.title)
            .bind(&parsed.company)
            .fetch_optional(&state.db)
            .await?;
            if duplicate.is_some() {
                info!(
                    "Skipping duplicate JD (by title/company): {} at {}",
                    parsed.title, parsed.company
                );
                skipped.push(SkippedFile::duplicate_title_company(
                    &filename,
                    &parsed.title,
                    &parsed.company,
                ));
                continue;
            }
        }

        let id = Uuid::new_v4();
        let file_key = storage::object_key("jobs", user_id, id, &filename);
        storage::put_object(
            &state.s3,
            &state.config.s3_bucket,
            &file_key,
            bytes,
            &content_type,
        )
        .await
        .map_err(|e| AppError::FileProcessing {
            filename: filename.clone(),
            message: e.to_string(),
        })?;

        let row: JobPostingRow = sqlx::query_as(
            r#"
            INSERT INTO job_postings
                (id, user_id, file_hash, title, company, location, employment_type,
                 experience_required, required_skills, preferred_skills,
                 responsibilities, qualifications, description, file_key, filename)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&file_hash)
        .bind(&parsed.title)
        .bind(&parsed.company)
        .bind(&parsed.location)
        .bind(&parsed.employment_type)
        .bind(&parsed.experience_required)
        .bind(&parsed.required_skills)
        .bind(&parsed.preferred_skills)
        .bind(&parsed.responsibilities)
        .bind(&parsed.qualifications)
        .bind(&parsed.description)
        .bind(&file_key)
        .bind(&filename)
        .fetch_one(&state.db)
        .await
        .map_err(|e| AppError::FileProcessing {
            filename: filename.clone(),
            message: format!("failed to persist record: {e}"),
        })?;

        info!("Created job posting {} ({})", row.id, row.title);

        // Fan-out: one scoring call for all existing candidates.
        if let Err(e) = score_against_existing_candidates(&state, user_id, &row, &text).await {
            warn!("Candidate scoring failed during JD upload: {e}");
        }

        created.push(row);
    }

    if !skipped.is_empty() {
        info!(
            "Upload complete. Uploaded: {}, skipped: {}",
            created.len(),
            skipped.len()
        );
    }

    Ok(Json(UploadReport { created, skipped }))
}

/// Scores every existing candidate of this user against a freshly uploaded
/// job in a single engine call, then aggregates each returned score.
async fn score_against_existing_candidates(
    state: &AppState,
    user_id: Uuid,
    job: &JobPostingRow,
    job_text: &str,
) -> Result<(), AppError> {
    let candidates: Vec<CandidateRow> =
        sqlx::query_as("SELECT * FROM candidates WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&state.db)
            .await?;

    if candidates.is_empty() {
        return Ok(());
    }

    let summaries: Vec<CandidateSummary> =
        candidates.iter().map(CandidateSummary::from_row).collect();
    let known: HashSet<Uuid> = candidates.iter().map(|c| c.id).collect();

    info!(
        "Scoring {} candidates against new job {}",
        summaries.len(),
        job.id
    );
    let scores = state.scorer.score_batch(job_text, &summaries).await?;
    let stored = aggregator::aggregate_batch(&state.db, job.id, user_id, &known, &scores).await?;
    info!("Stored {stored} match scores for job {}", job.id);
    Ok(())
}

/// GET /api/v1/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<JobPostingRow>>, AppError> {
    let rows: Vec<JobPostingRow> = sqlx::query_as(
        "SELECT * FROM job_postings WHERE user_id = $1 ORDER BY created_at DESC OFFSET $2 LIMIT $3",
    )
    .bind(user_id)
    .bind(page.skip)
    .bind(page.limit)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

async fn fetch_owned_job(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<JobPostingRow, AppError> {
    sqlx::query_as::<_, JobPostingRow>("SELECT * FROM job_postings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job posting not found".to_string()))
}

/// GET /api/v1/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPostingRow>, AppError> {
    let row = fetch_owned_job(&state, id, user_id).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/jobs/:id
/// Removes the blob (best-effort), the record, and every match score
/// referencing it (FK cascade). A second delete of the same id is a plain 404.
pub async fn delete_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let row = fetch_owned_job(&state, id, user_id).await?;

    if let Err(e) = storage::delete_object(&state.s3, &state.config.s3_bucket, &row.file_key).await
    {
        warn!("Could not delete stored file {}: {e}", row.file_key);
    }

    sqlx::query("DELETE FROM job_postings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({ "message": "Job posting deleted successfully" })))
}

/// GET /api/v1/jobs/:id/download
pub async fn download_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = fetch_owned_job(&state, id, user_id).await?;
    let bytes = storage::get_object(&state.s3, &state.config.s3_bucket, &row.file_key).await?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                storage::content_type_for(&row.filename).to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", row.filename),
            ),
        ],
        bytes,
    ))
}
