//! Match aggregation: clamps category scores, computes the weighted
//! composite, and upserts exactly one row per (job, candidate) pair.

use std::collections::HashSet;

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::EngineScore;

// Fixed scoring rubric. The composite is always recomputed from these —
// never trusted from the engine.
pub const SKILLS_WEIGHT: f64 = 0.50;
pub const EXPERIENCE_WEIGHT: f64 = 0.30;
pub const EDUCATION_WEIGHT: f64 = 0.15;
pub const CERTIFICATIONS_WEIGHT: f64 = 0.05;

/// Weighted composite of the four category scores. Inputs are assumed
/// clamped to [0,100].
pub fn weighted_total(skills: f64, experience: f64, education: f64, certifications: f64) -> f64 {
    SKILLS_WEIGHT * skills
        + EXPERIENCE_WEIGHT * experience
        + EDUCATION_WEIGHT * education
        + CERTIFICATIONS_WEIGHT * certifications
}

/// Clamps an engine category score into [0,100]. Out-of-range values are a
/// data-quality signal, logged but not fatal.
pub fn clamp_score(value: f64, category: &str, candidate_id: Uuid) -> f64 {
    if !(0.0..=100.0).contains(&value) {
        warn!("Out-of-range {category} score {value} for candidate {candidate_id}, clamping");
    }
    value.clamp(0.0, 100.0)
}

/// An `EngineScore` with validated ranges and the recomputed composite.
#[derive(Debug, Clone)]
pub struct ValidatedScore {
    pub candidate_id: Uuid,
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub certifications_score: f64,
    pub total_score: f64,
}

pub fn validate(score: &EngineScore) -> ValidatedScore {
    let id = score.candidate_id;
    let skills = clamp_score(score.skills_score, "skills", id);
    let experience = clamp_score(score.experience_score, "experience", id);
    let education = clamp_score(score.education_score, "education", id);
    let certifications = clamp_score(score.certifications_score, "certifications", id);
    ValidatedScore {
        candidate_id: id,
        skills_score: skills,
        experience_score: experience,
        education_score: education,
        certifications_score: certifications,
        total_score: weighted_total(skills, experience, education, certifications),
    }
}

/// Stores one score as a create-or-replace on the (job, candidate) pair.
/// The `ON CONFLICT` path keeps the row identity and replaces every value
/// and the timestamp in a single atomic statement.
pub async fn upsert_score(
    pool: &PgPool,
    job_id: Uuid,
    user_id: Uuid,
    score: &EngineScore,
) -> Result<(), AppError> {
    let v = validate(score);

    sqlx::query(
        r#"
        INSERT INTO match_scores
            (id, job_id, candidate_id, user_id,
             skills_score, skills_explanation,
             experience_score, experience_explanation,
             education_score, education_explanation,
             certifications_score, certifications_explanation,
             skills_matched, skills_related, skills_missing, achievements,
             total_score, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, now())
        ON CONFLICT (job_id, candidate_id) DO UPDATE SET
            skills_score = EXCLUDED.skills_score,
            skills_explanation = EXCLUDED.skills_explanation,
            experience_score = EXCLUDED.experience_score,
            experience_explanation = EXCLUDED.experience_explanation,
            education_score = EXCLUDED.education_score,
            education_explanation = EXCLUDED.education_explanation,
            certifications_score = EXCLUDED.certifications_score,
            certifications_explanation = EXCLUDED.certifications_explanation,
            skills_matched = EXCLUDED.skills_matched,
            skills_related = EXCLUDED.skills_related,
            skills_missing = EXCLUDED.skills_missing,
            achievements = EXCLUDED.achievements,
            total_score = EXCLUDED.total_score,
            created_at = EXCLUDED.created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(v.candidate_id)
    .bind(user_id)
    .bind(v.skills_score)
    .bind(&score.skills_explanation)
    .bind(v.experience_score)
    .bind(&score.experience_explanation)
    .bind(v.education_score)
    .bind(&score.education_explanation)
    .bind(v.certifications_score)
    .bind(&score.certifications_explanation)
    .bind(&score.skills_matched)
    .bind(&score.skills_related)
    .bind(&score.skills_missing)
    .bind(&score.achievements)
    .bind(v.total_score)
    .execute(pool)
    .await?;

    Ok(())
}

/// Upserts every score in a batch, skipping entries whose candidate id was
/// not part of the scored set (a hallucinated echo from the engine).
/// Returns the number of rows stored.
pub async fn aggregate_batch(
    pool: &PgPool,
    job_id: Uuid,
    user_id: Uuid,
    known_candidates: &HashSet<Uuid>,
    scores: &[EngineScore],
) -> Result<usize, AppError> {
    let mut stored = 0;
    for score in scores {
        if !known_candidates.contains(&score.candidate_id) {
            warn!(
                "Skipping score for unknown candidate {} (not in scored batch)",
                score.candidate_id
            );
            continue;
        }
        upsert_score(pool, job_id, user_id, score).await?;
        stored += 1;
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_score(skills: f64, experience: f64, education: f64, certs: f64) -> EngineScore {
        let raw = serde_json::json!({
            "candidate_id": Uuid::new_v4(),
            "skills_score": skills,
            "experience_score": experience,
            "education_score": education,
            "certifications_score": certs,
        });
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = SKILLS_WEIGHT + EXPERIENCE_WEIGHT + EDUCATION_WEIGHT + CERTIFICATIONS_WEIGHT;
        assert!((sum - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weighted_total_reference_values() {
        // 0.50*90 + 0.30*85 + 0.15*80 + 0.05*70 = 45 + 25.5 + 12 + 3.5
        assert!((weighted_total(90.0, 85.0, 80.0, 70.0) - 86.0).abs() < 1e-9);
        // 0.50*40 + 0.30*30 + 0.15*50 + 0.05*60 = 20 + 9 + 7.5 + 3
        assert!((weighted_total(40.0, 30.0, 50.0, 60.0) - 39.5).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_total_bounds() {
        assert_eq!(weighted_total(0.0, 0.0, 0.0, 0.0), 0.0);
        assert!((weighted_total(100.0, 100.0, 100.0, 100.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_score_passes_valid_values() {
        let id = Uuid::new_v4();
        assert_eq!(clamp_score(0.0, "skills", id), 0.0);
        assert_eq!(clamp_score(55.5, "skills", id), 55.5);
        assert_eq!(clamp_score(100.0, "skills", id), 100.0);
    }

    #[test]
    fn test_clamp_score_clamps_out_of_range() {
        let id = Uuid::new_v4();
        assert_eq!(clamp_score(-12.0, "education", id), 0.0);
        assert_eq!(clamp_score(140.0, "skills", id), 100.0);
    }

    #[test]
    fn test_validate_recomputes_total_from_clamped_values() {
        let v = validate(&engine_score(150.0, 85.0, 80.0, -10.0));
        assert_eq!(v.skills_score, 100.0);
        assert_eq!(v.certifications_score, 0.0);
        // 0.50*100 + 0.30*85 + 0.15*80 + 0.05*0 = 50 + 25.5 + 12
        assert!((v.total_score - 87.5).abs() < 1e-9);
    }
}
