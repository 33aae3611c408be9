use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{self, FileKind};
use crate::ingest::fingerprint::fingerprint;
use crate::ingest::parser;
use crate::ingest::pipeline::{
    read_upload_batch, sufficient_text, SkippedFile, UploadReport, UploadedFile,
};
use crate::models::candidate::CandidateRow;
use crate::state::AppState;
use crate::storage;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_page_limit")]
    pub limit: i64,
}

fn default_page_limit() -> i64 {
    100
}

/// POST /api/v1/candidates/upload
/// Multi-file resume upload: dedupe by content hash and by extracted email,
/// parse with the LLM, persist the original to the blob store and the
/// structured record to Postgres. Duplicates and unreadable files are soft
/// skips reported in the response; any other per-file failure aborts the
/// batch (already-committed files stay committed).
pub async fn upload_candidates(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadReport<CandidateRow>>, AppError> {
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
        let duplicate: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM candidates WHERE user_id = $1 AND file_hash = $2")
                .bind(user_id)
                .bind(&file_hash)
                .fetch_optional(&state.db)
                .await?;
        if duplicate.is_some() {
            info!("Skipping duplicate file (by hash): {filename}");
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
        info!("Extracted {} characters from {filename}", text.len());

        // Parse before the email dedupe check — the email comes from the parse.
        let parsed = parser::parse_resume(&state.llm, &text).await;

        if let Some(email) = parsed.email.as_deref() {
            let duplicate: Option<Uuid> =
                sqlx::query_scalar("SELECT id FROM candidates WHERE user_id = $1 AND email = $2")
                    .bind(user_id)
                    .bind(email)
                    .fetch_optional(&state.db)
                    .await?;
            if duplicate.is_some() {
                info!("Skipping duplicate candidate (by email): {email}");
                skipped.push(SkippedFile::duplicate_email(&filename, email));
                continue;
            }
        }

        let id = Uuid::new_v4();
        let file_key = storage::object_key("resumes", user_id, id, &filename);
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

        let row: CandidateRow = sqlx::query_as(
            r#"
            INSERT INTO candidates
                (id, user_id, file_hash, name, email, contact, location, title,
                 experience, education, skills, certifications, projects,
                 achievements, summary, file_key, filename)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&file_hash)
        .bind(&parsed.name)
        .bind(&parsed.email)
        .bind(&parsed.contact)
        .bind(&parsed.location)
        .bind(&parsed.title)
        .bind(&parsed.experience)
        .bind(&parsed.education)
        .bind(&parsed.skills)
        .bind(&parsed.certifications)
        .bind(&parsed.projects)
        .bind(&parsed.achievements)
        .bind(&parsed.summary)
        .bind(&file_key)
        .bind(&filename)
        .fetch_one(&state.db)
        .await
        .map_err(|e| AppError::FileProcessing {
            filename: filename.clone(),
            message: format!("failed to persist record: {e}"),
        })?;

        info!(
            "Created candidate {} ({}, {} skills)",
            row.id,
            row.name,
            row.skills.len()
        );
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

/// GET /api/v1/candidates
pub async fn list_candidates(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CandidateRow>>, AppError> {
    let rows: Vec<CandidateRow> = sqlx::query_as(
        "SELECT * FROM candidates WHERE user_id = $1 ORDER BY created_at DESC OFFSET $2 LIMIT $3",
    )
    .bind(user_id)
    .bind(page.skip)
    .bind(page.limit)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

async fn fetch_owned_candidate(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<CandidateRow, AppError> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))
}

/// GET /api/v1/candidates/:id
pub async fn get_candidate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateRow>, AppError> {
    let row = fetch_owned_candidate(&state, id, user_id).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/candidates/:id
/// Removes the blob (best-effort), the record, and every match score
/// referencing it (FK cascade).
pub async fn delete_candidate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let row = fetch_owned_candidate(&state, id, user_id).await?;

    if let Err(e) = storage::delete_object(&state.s3, &state.config.s3_bucket, &row.file_key).await
    {
        warn!("Could not delete stored file {}: {e}", row.file_key);
    }

    sqlx::query("DELETE FROM candidates WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({ "message": "Candidate deleted successfully" })))
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted_count: usize,
}

/// POST /api/v1/candidates/bulk-delete
/// Deletes the listed candidates; ids that do not exist (or belong to
/// another user) are silently ignored.
pub async fn bulk_delete_candidates(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(candidate_ids): Json<Vec<Uuid>>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let mut deleted_count = 0;
    for id in candidate_ids {
        let row = match fetch_owned_candidate(&state, id, user_id).await {
            Ok(row) => row,
            Err(AppError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };
        if let Err(e) =
            storage::delete_object(&state.s3, &state.config.s3_bucket, &row.file_key).await
        {
            warn!("Could not delete stored file {}: {e}", row.file_key);
        }
        sqlx::query("DELETE FROM candidates WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&state.db)
            .await?;
        deleted_count += 1;
    }
    Ok(Json(BulkDeleteResponse { deleted_count }))
}

/// GET /api/v1/candidates/:id/download
/// Streams the original resume file back for viewing.
pub async fn download_candidate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = fetch_owned_candidate(&state, id, user_id).await?;
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
