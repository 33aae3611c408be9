//! LLM document parsing: free text in, cleaned structured record out.
//! Parser failures never escalate — callers always get a record, with the
//! failure noted in the summary/description field.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ingest::prompts::{
    JOB_PARSE_PROMPT, JOB_PARSE_SYSTEM, RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM,
};
use crate::llm_client::LlmClient;

/// Structured fields extracted from a resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedCandidate {
    pub name: String,
    pub email: Option<String>,
    pub contact: String,
    pub location: String,
    pub title: String,
    pub experience: String,
    pub education: String,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub projects: Vec<String>,
    pub achievements: Vec<String>,
    pub summary: String,
}

/// Structured fields extracted from a job description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub employment_type: String,
    pub experience_required: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub responsibilities: Vec<String>,
    pub qualifications: Vec<String>,
    pub description: String,
}

/// Parses resume text into a cleaned candidate record.
/// On any LLM or decode failure, returns a placeholder record instead.
pub async fn parse_resume(llm: &LlmClient, resume_text: &str) -> ParsedCandidate {
    let prompt = RESUME_PARSE_PROMPT.replace("{resume_text}", resume_text);
    match llm
        .call_json::<ParsedCandidate>(&prompt, RESUME_PARSE_SYSTEM)
        .await
    {
        Ok(parsed) => clean_candidate(parsed),
        Err(e) => {
            warn!("Resume parsing failed, substituting fallback record: {e}");
            ParsedCandidate {
                name: "Unknown".to_string(),
                summary: format!("Error parsing resume: {e}"),
                ..Default::default()
            }
        }
    }
}

/// Parses job description text into a cleaned posting record.
/// On any LLM or decode failure, returns a placeholder record instead.
pub async fn parse_job(llm: &LlmClient, jd_text: &str) -> ParsedJob {
    let prompt = JOB_PARSE_PROMPT.replace("{jd_text}", jd_text);
    match llm.call_json::<ParsedJob>(&prompt, JOB_PARSE_SYSTEM).await {
        Ok(parsed) => clean_job(parsed),
        Err(e) => {
            warn!("JD parsing failed, substituting fallback record: {e}");
            ParsedJob {
                title: "Untitled Position".to_string(),
                description: format!("Error parsing job description: {e}"),
                ..Default::default()
            }
        }
    }
}

/// Normalizes model output: strips honorifics, validates the email, scrubs
/// the phone number, and dedupes/normalizes the skills list.
fn clean_candidate(parsed: ParsedCandidate) -> ParsedCandidate {
    let name = clean_name(&parsed.name);
    ParsedCandidate {
        name: if name.is_empty() {
            "Unknown".to_string()
        } else {
            name
        },
        email: parsed.email.as_deref().and_then(normalize_email),
        contact: clean_contact(&parsed.contact),
        location: parsed.location.trim().to_string(),
        title: parsed.title.trim().to_string(),
        experience: collapse_whitespace(parsed.experience.trim()),
        education: parsed.education.trim().to_string(),
        skills: normalize_skills(parsed.skills),
        certifications: trimmed_nonempty(parsed.certifications),
        projects: trimmed_nonempty(parsed.projects),
        achievements: trimmed_nonempty(parsed.achievements),
        summary: parsed.summary.trim().to_string(),
    }
}

fn clean_job(parsed: ParsedJob) -> ParsedJob {
    let title = parsed.title.trim().to_string();
    ParsedJob {
        title: if title.is_empty() {
            "Untitled Position".to_string()
        } else {
            title
        },
        company: parsed.company.trim().to_string(),
        location: parsed.location.trim().to_string(),
        employment_type: parsed.employment_type.trim().to_string(),
        experience_required: parsed.experience_required.trim().to_string(),
        required_skills: normalize_skills(parsed.required_skills),
        preferred_skills: normalize_skills(parsed.preferred_skills),
        responsibilities: trimmed_nonempty(parsed.responsibilities),
        qualifications: trimmed_nonempty(parsed.qualifications),
        description: parsed.description.trim().to_string(),
    }
}

fn honorific_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(Mr\.|Mrs\.|Ms\.|Dr\.|Prof\.)\s*").unwrap())
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap())
}

fn clean_name(name: &str) -> String {
    let stripped = honorific_regex().replace_all(name.trim(), "");
    collapse_whitespace(&stripped)
}

/// Lowercases and validates; anything that does not look like an address
/// becomes None so the email-uniqueness check never fires on junk.
fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    if !email.is_empty() && email_regex().is_match(&email) {
        Some(email)
    } else {
        None
    }
}

/// Keeps digits and common phone separators only.
fn clean_contact(contact: &str) -> String {
    let filtered: String = contact
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')'))
        .collect();
    collapse_whitespace(filtered.trim())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

const SKILL_NORMALIZATIONS: &[(&str, &str)] = &[
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("py", "Python"),
    ("ml", "Machine Learning"),
    ("ai", "Artificial Intelligence"),
    ("dl", "Deep Learning"),
    ("nlp", "Natural Language Processing"),
    ("css3", "CSS"),
    ("html5", "HTML"),
    ("reactjs", "React"),
    ("nodejs", "Node.js"),
    ("nextjs", "Next.js"),
];

/// Trims, expands common abbreviations, and dedupes preserving order.
fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for skill in skills {
        let skill = skill.trim();
        if skill.is_empty() {
            continue;
        }
        let lower = skill.to_lowercase();
        let normalized = SKILL_NORMALIZATIONS
            .iter()
            .find(|(abbr, _)| *abbr == lower)
            .map(|(_, full)| full.to_string())
            .unwrap_or_else(|| skill.to_string());
        if !seen.contains(&normalized) {
            seen.push(normalized);
        }
    }
    seen
}

fn trimmed_nonempty(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_strips_honorifics() {
        assert_eq!(clean_name("Dr. Jane  Doe"), "Jane Doe");
        assert_eq!(clean_name("mr. John Smith"), "John Smith");
        assert_eq!(clean_name("  Alice   Jones "), "Alice Jones");
    }

    #[test]
    fn test_normalize_email_valid() {
        assert_eq!(
            normalize_email("Jane.Doe@Example.COM "),
            Some("jane.doe@example.com".to_string())
        );
    }

    #[test]
    fn test_normalize_email_invalid_becomes_none() {
        assert_eq!(normalize_email(""), None);
        assert_eq!(normalize_email("not-an-email"), None);
        assert_eq!(normalize_email("missing@tld"), None);
    }

    #[test]
    fn test_clean_contact_keeps_dial_characters() {
        assert_eq!(clean_contact("+1 (555) 123-4567 ext."), "+1 (555) 123-4567");
    }

    #[test]
    fn test_normalize_skills_expands_and_dedupes() {
        let skills = vec![
            "JS".to_string(),
            "JavaScript".to_string(),
            "  Rust ".to_string(),
            "ml".to_string(),
            "".to_string(),
        ];
        assert_eq!(
            normalize_skills(skills),
            vec!["JavaScript", "Rust", "Machine Learning"]
        );
    }

    #[test]
    fn test_parsed_candidate_tolerates_missing_fields() {
        // The model sometimes omits optional fields entirely.
        let parsed: ParsedCandidate =
            serde_json::from_str(r#"{"name": "Jane Doe", "skills": ["Rust"]}"#).unwrap();
        assert_eq!(parsed.name, "Jane Doe");
        assert_eq!(parsed.skills, vec!["Rust"]);
        assert!(parsed.email.is_none());
        assert!(parsed.projects.is_empty());
    }

    #[test]
    fn test_clean_candidate_defaults_empty_name() {
        let cleaned = clean_candidate(ParsedCandidate {
            name: "  ".to_string(),
            ..Default::default()
        });
        assert_eq!(cleaned.name, "Unknown");
    }

    #[test]
    fn test_clean_job_defaults_empty_title() {
        let cleaned = clean_job(ParsedJob::default());
        assert_eq!(cleaned.title, "Untitled Position");
    }
}
