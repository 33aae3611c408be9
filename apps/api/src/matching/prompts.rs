// Scoring engine prompt templates.

pub const SCORE_BATCH_SYSTEM: &str = "\
You are an expert technical recruiter. Analyze candidates objectively and \
return ONLY valid JSON without markdown formatting.";

pub const SCORE_BATCH_PROMPT: &str = r#"You are an expert recruitment analyst. Evaluate each candidate against the job description.

BIAS PREVENTION RULES:
1. Education: score on degree level and field relevance ONLY. Treat online degrees, bootcamps, and self-taught paths equally if relevant.
2. Ignore name origins, gender indicators, age, and nationality. Focus only on skills, experience, achievements.
3. Do not penalize career gaps under 2 years; mention longer gaps neutrally.
4. Certifications: score on relevance, not cost or prestige.
5. Minor grammar or spelling errors in the resume must not lower any score.

Job Description:
{job_text}

Candidates:
{candidates_json}

SCORING (0-100 per category, for every candidate):
- skills_score: core skill match (50%), depth of experience with each skill (30%), recency (20%).
- experience_score: previous roles, seniority, domains, and duration matched against the job responsibilities.
- education_score: degree level and field against the requirements; no formal degree scores 50 (neutral), then check certifications and bootcamps.
- certifications_score: relevance and industry recognition.

Rubric: 90-100 excellent, 70-89 good, 50-69 moderate, 30-49 weak, 0-29 no alignment.

SKILLS MATCHING:
- Exact and synonym matches ("JS" = "JavaScript") go in skills_matched.
- Hierarchical matches count (React implies JavaScript; TensorFlow implies Deep Learning).
- Related-but-different skills (PyTorch vs required TensorFlow) go in skills_related.
- Required skills with no evidence go in skills_missing.

Each explanation must be actionable: WHAT matched, WHY it is relevant, WHAT is missing, with evidence cited from the resume.

Return ONLY a valid JSON object of the form:
{
  "candidates": [
    {
      "candidate_id": "echo the input candidate_id exactly",
      "name": "string",
      "skills_score": 0,
      "skills_explanation": "string",
      "experience_score": 0,
      "experience_explanation": "string",
      "education_score": 0,
      "education_explanation": "string",
      "certifications_score": 0,
      "certifications_explanation": "string",
      "skills_matched": ["string"],
      "skills_related": ["string"],
      "skills_missing": ["string"],
      "achievements": ["string"]
    }
  ]
}
Include one entry per input candidate, in input order."#;
