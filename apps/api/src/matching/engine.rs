//! Scoring engine — pluggable, trait-based scorer that rates a candidate
//! batch against a job description in a single call.
//!
//! Default: `LlmScoringEngine` via the shared `LlmClient`. The engine output
//! is non-deterministic and loosely shaped; this module is the boundary that
//! turns arbitrary model JSON into typed `EngineScore` records, skipping
//! malformed entries and detecting the whole-batch error sentinel.
//!
//! `AppState` holds an `Arc<dyn ScoringEngine>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::matching::prompts::{SCORE_BATCH_PROMPT, SCORE_BATCH_SYSTEM};
use crate::models::candidate::CandidateRow;

/// The slice of a candidate the engine sees.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub candidate_id: Uuid,
    pub name: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
    pub certifications: Vec<String>,
}

impl CandidateSummary {
    pub fn from_row(row: &CandidateRow) -> Self {
        Self {
            candidate_id: row.id,
            name: row.name.clone(),
            skills: row.skills.clone(),
            experience: row.experience.clone(),
            education: row.education.clone(),
            certifications: row.certifications.clone(),
        }
    }
}

/// One scored candidate as returned by the engine. Category scores are raw
/// model output — range validation happens in the aggregator.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineScore {
    pub candidate_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skills_score: f64,
    #[serde(default)]
    pub skills_explanation: String,
    #[serde(default)]
    pub experience_score: f64,
    #[serde(default)]
    pub experience_explanation: String,
    #[serde(default)]
    pub education_score: f64,
    #[serde(default)]
    pub education_explanation: String,
    #[serde(default)]
    pub certifications_score: f64,
    #[serde(default)]
    pub certifications_explanation: String,
    #[serde(default)]
    pub skills_matched: Vec<String>,
    #[serde(default)]
    pub skills_related: Vec<String>,
    #[serde(default)]
    pub skills_missing: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

/// The scoring engine seam. Implement this to swap backends without touching
/// handlers or the aggregator.
#[async_trait]
pub trait ScoringEngine: Send + Sync {
    /// Scores the whole batch in one call. The result may legitimately be
    /// shorter than the input — callers must not assume 1:1 coverage.
    async fn score_batch(
        &self,
        job_text: &str,
        candidates: &[CandidateSummary],
    ) -> Result<Vec<EngineScore>, AppError>;
}

/// Default engine: one Claude call covering the full candidate batch.
pub struct LlmScoringEngine {
    llm: LlmClient,
}

impl LlmScoringEngine {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ScoringEngine for LlmScoringEngine {
    async fn score_batch(
        &self,
        job_text: &str,
        candidates: &[CandidateSummary],
    ) -> Result<Vec<EngineScore>, AppError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let candidates_json = serde_json::to_string_pretty(candidates)
            .map_err(|e| AppError::Internal(e.into()))?;
        let prompt = SCORE_BATCH_PROMPT
            .replace("{job_text}", job_text)
            .replace("{candidates_json}", &candidates_json);

        let response: Value = self
            .llm
            .call_json(&prompt, SCORE_BATCH_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Candidate scoring failed: {e}")))?;

        parse_engine_response(&response)
    }
}

/// Decodes the engine's JSON into typed scores.
///
/// Tolerated shapes: a bare array, `{"candidates": [...]}`, `{"scores":
/// [...]}`, or any object whose first array value holds the entries. A first
/// entry carrying an `"error"` field is the whole-batch failure sentinel.
/// Individual non-object, error-bearing, or undecodable entries are skipped
/// with a warning — they never fail their siblings.
pub fn parse_engine_response(response: &Value) -> Result<Vec<EngineScore>, AppError> {
    let entries = locate_score_array(response).ok_or_else(|| {
        AppError::Llm(format!(
            "Scoring engine returned no candidate array (keys: {:?})",
            response
                .as_object()
                .map(|o| o.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        ))
    })?;

    if let Some(first) = entries.first() {
        if let Some(err) = first.get("error") {
            return Err(AppError::Llm(format!("Scoring engine error: {err}")));
        }
    }

    let mut scores = Vec::new();
    for entry in entries {
        if !entry.is_object() {
            warn!("Skipping non-object score entry: {entry}");
            continue;
        }
        if let Some(err) = entry.get("error") {
            warn!("Skipping error score entry: {err}");
            continue;
        }
        match serde_json::from_value::<EngineScore>(entry.clone()) {
            Ok(score) => scores.push(score),
            Err(e) => warn!("Skipping malformed score entry: {e}"),
        }
    }
    Ok(scores)
}

fn locate_score_array(response: &Value) -> Option<&Vec<Value>> {
    if let Some(arr) = response.as_array() {
        return Some(arr);
    }
    let obj = response.as_object()?;
    for key in ["candidates", "scores"] {
        if let Some(arr) = obj.get(key).and_then(|v| v.as_array()) {
            return Some(arr);
        }
    }
    // Some responses bury the array under an unexpected key.
    obj.values().find_map(|v| v.as_array().filter(|a| !a.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn score_entry(id: Uuid, skills: f64) -> Value {
        json!({
            "candidate_id": id,
            "name": "Jane Doe",
            "skills_score": skills,
            "skills_explanation": "Strong overlap",
            "experience_score": 80.0,
            "experience_explanation": "Aligned roles",
            "education_score": 70.0,
            "education_explanation": "Relevant degree",
            "certifications_score": 60.0,
            "certifications_explanation": "One relevant cert",
            "skills_matched": ["Rust"],
            "skills_related": [],
            "skills_missing": ["Kubernetes"],
            "achievements": ["Shipped v1"]
        })
    }

    #[test]
    fn test_parses_candidates_object_shape() {
        let id = Uuid::new_v4();
        let response = json!({"candidates": [score_entry(id, 90.0)]});
        let scores = parse_engine_response(&response).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].candidate_id, id);
        assert_eq!(scores[0].skills_score, 90.0);
    }

    #[test]
    fn test_parses_bare_array_shape() {
        let response = json!([score_entry(Uuid::new_v4(), 50.0)]);
        assert_eq!(parse_engine_response(&response).unwrap().len(), 1);
    }

    #[test]
    fn test_parses_scores_key_shape() {
        let response = json!({"scores": [score_entry(Uuid::new_v4(), 50.0)]});
        assert_eq!(parse_engine_response(&response).unwrap().len(), 1);
    }

    #[test]
    fn test_parses_unknown_key_holding_array() {
        let response = json!({"results": [score_entry(Uuid::new_v4(), 50.0)]});
        assert_eq!(parse_engine_response(&response).unwrap().len(), 1);
    }

    #[test]
    fn test_error_sentinel_fails_whole_batch() {
        let response = json!({"candidates": [{"error": "rate limited", "candidate_id": Uuid::new_v4()}]});
        assert!(matches!(
            parse_engine_response(&response),
            Err(AppError::Llm(_))
        ));
    }

    #[test]
    fn test_missing_array_is_an_error() {
        let response = json!({"message": "no results"});
        assert!(parse_engine_response(&response).is_err());
    }

    #[test]
    fn test_skips_non_object_and_error_entries() {
        let id = Uuid::new_v4();
        let response = json!({"candidates": [
            score_entry(id, 75.0),
            "not an object",
            {"error": "failed on this candidate", "candidate_id": Uuid::new_v4()},
        ]});
        let scores = parse_engine_response(&response).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].candidate_id, id);
    }

    #[test]
    fn test_skips_entry_with_malformed_candidate_id() {
        let good = Uuid::new_v4();
        let response = json!({"candidates": [
            {"candidate_id": "not-a-uuid", "skills_score": 90.0},
            score_entry(good, 75.0),
        ]});
        let scores = parse_engine_response(&response).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].candidate_id, good);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let id = Uuid::new_v4();
        let response = json!({"candidates": [{"candidate_id": id, "skills_score": 42.0}]});
        let scores = parse_engine_response(&response).unwrap();
        assert_eq!(scores[0].skills_score, 42.0);
        assert_eq!(scores[0].experience_score, 0.0);
        assert!(scores[0].skills_matched.is_empty());
    }

    #[test]
    fn test_short_batch_is_tolerated() {
        // Engine may score fewer candidates than were sent.
        let response = json!({"candidates": []});
        assert!(parse_engine_response(&response).unwrap().is_empty());
    }
}
