pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analytics;
use crate::candidates::handlers as candidates;
use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidates
        .route(
            "/api/v1/candidates/upload",
            post(candidates::upload_candidates),
        )
        .route("/api/v1/candidates", get(candidates::list_candidates))
        .route(
            "/api/v1/candidates/bulk-delete",
            post(candidates::bulk_delete_candidates),
        )
        .route(
            "/api/v1/candidates/:id",
            get(candidates::get_candidate).delete(candidates::delete_candidate),
        )
        .route(
            "/api/v1/candidates/:id/download",
            get(candidates::download_candidate),
        )
        // Job postings
        .route("/api/v1/jobs/upload", post(jobs::upload_jobs))
        .route("/api/v1/jobs", get(jobs::list_jobs))
        .route(
            "/api/v1/jobs/:id",
            get(jobs::get_job).delete(jobs::delete_job),
        )
        .route("/api/v1/jobs/:id/download", get(jobs::download_job))
        // Matching
        .route("/api/v1/matches", post(matching::match_candidates))
        .route("/api/v1/matches/:job_id", get(matching::top_matches))
        // Analytics
        .route(
            "/api/v1/analytics/dashboard",
            get(analytics::handlers::dashboard),
        )
        .with_state(state)
}
