// Document parsing prompt templates.
// All prompts for the ingest module are defined here.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are an expert resume parser specializing in student and entry-level resumes. \
Extract structured data accurately and return ONLY valid JSON without markdown \
formatting. Pay special attention to skills, projects, and education details.";

pub const RESUME_PARSE_PROMPT: &str = r#"Extract structured information from this resume. Be thorough and accurate. This may be a student or entry-level resume.

Resume Text:
{resume_text}

INSTRUCTIONS:

1. NAME: the candidate's full name from the top of the resume, without titles (Mr., Mrs., Dr., ...) or degrees.
2. CONTACT: email address (must contain @), phone number (keep country code), and location (City, State/Country).
3. TITLE: current or most recent job title; for students the degree pursued; for freshers "Fresh Graduate".
4. EXPERIENCE: total duration across all work, formatted "X years Y months", "Fresher", or "X month internship". Internships count.
5. EDUCATION: ALL degrees as "Degree, Institution, Year (GPA if available)", including ongoing education.
6. SKILLS: every technical skill mentioned (languages, frameworks, tools) from the skills section, project descriptions, and coursework. Normalize abbreviations (JS -> JavaScript, ML -> Machine Learning).
7. CERTIFICATIONS: "Certificate Name, Issuing Organization, Year", including online courses.
8. PROJECTS: "Project Name: brief description", including academic and personal projects and hackathons.
9. ACHIEVEMENTS: quantifiable accomplishments, awards, publications, competition wins, leadership roles.
10. SUMMARY: a 2-3 sentence overview of education level, key skills, and experience type.

Return ONLY a valid JSON object with exactly these fields, no markdown formatting:
{
  "name": "string",
  "email": "string",
  "contact": "string",
  "location": "string",
  "title": "string",
  "experience": "string",
  "education": "string",
  "skills": ["string"],
  "certifications": ["string"],
  "projects": ["string"],
  "achievements": ["string"],
  "summary": "string"
}"#;

pub const JOB_PARSE_SYSTEM: &str = "\
You are an expert job description parser. Extract structured data from job \
descriptions and return ONLY valid JSON without markdown formatting.";

pub const JOB_PARSE_PROMPT: &str = r#"Extract structured information from this job description. Distinguish between required and preferred.

Job Description Text:
{jd_text}

Instructions:
1. Extract job title, company name, location.
2. Employment type (Full-time, Part-time, Contract, Remote, Hybrid).
3. Experience required (format: "X-Y years" or "X+ years").
4. Required skills (MUST have) separately from preferred skills (nice to have).
5. Key responsibilities (main duties).
6. Qualifications (education, certifications).
7. A comprehensive description summary.
8. Normalize skill names (e.g. "JS" -> "JavaScript"). If information is missing, use an empty string or empty array.

Return ONLY a valid JSON object with exactly these fields, no markdown formatting:
{
  "title": "string",
  "company": "string",
  "location": "string",
  "employment_type": "string",
  "experience_required": "string",
  "required_skills": ["string"],
  "preferred_skills": ["string"],
  "responsibilities": ["string"],
  "qualifications": ["string"],
  "description": "string"
}"#;
