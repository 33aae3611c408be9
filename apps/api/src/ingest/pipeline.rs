//! Per-file upload outcomes. Duplicates, unsupported formats, and thin
//! extractions are soft skips recorded in the batch report; real errors
//! (extractor/storage/database) abort the batch via `AppError::FileProcessing`.

use axum::extract::Multipart;
use serde::Serialize;

use crate::errors::AppError;

/// Minimum extracted characters for a file to be worth parsing.
pub const MIN_TEXT_CHARS: usize = 50;

/// True when the extracted text clears the minimum-length gate.
pub fn sufficient_text(text: &str) -> bool {
    text.trim().chars().count() >= MIN_TEXT_CHARS
}

/// A file that was left out of the batch, with a human-readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

impl SkippedFile {
    pub fn unsupported_format(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            reason: "Unsupported file format. Supported: PDF, DOCX, TXT, JPG, PNG, BMP, TIFF"
                .to_string(),
        }
    }

    pub fn duplicate_content(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            reason: "Duplicate file - same content already uploaded".to_string(),
        }
    }

    pub fn insufficient_text(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            reason: "Could not extract sufficient text. Please ensure the file is readable."
                .to_string(),
        }
    }

    pub fn duplicate_email(filename: &str, email: &str) -> Self {
        Self {
            filename: filename.to_string(),
            reason: format!("Candidate with email {email} already exists"),
        }
    }

    pub fn duplicate_title_company(filename: &str, title: &str, company: &str) -> Self {
        Self {
            filename: filename.to_string(),
            reason: format!("Job posting '{title}' from '{company}' already exists"),
        }
    }
}

/// Batch upload response: what was created plus what was skipped and why.
#[derive(Debug, Serialize)]
pub struct UploadReport<T> {
    pub created: Vec<T>,
    pub skipped: Vec<SkippedFile>,
}

/// One file pulled out of a multipart upload.
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Drains a multipart body into memory. Fields without a filename (stray
/// form values) are ignored; a field that fails to read aborts the batch
/// naming the file.
pub async fn read_upload_batch(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| AppError::FileProcessing {
            filename: filename.clone(),
            message: format!("failed to read upload body: {e}"),
        })?;
        files.push(UploadedFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sufficient_text_boundary() {
        assert!(!sufficient_text(""));
        assert!(!sufficient_text(&"x".repeat(MIN_TEXT_CHARS - 1)));
        assert!(sufficient_text(&"x".repeat(MIN_TEXT_CHARS)));
    }

    #[test]
    fn test_sufficient_text_ignores_surrounding_whitespace() {
        let padded = format!("   {}   \n", "x".repeat(MIN_TEXT_CHARS - 1));
        assert!(!sufficient_text(&padded));
    }

    #[test]
    fn test_skip_reasons_name_the_identity() {
        let skip = SkippedFile::duplicate_email("cv.pdf", "jane@example.com");
        assert_eq!(skip.filename, "cv.pdf");
        assert!(skip.reason.contains("jane@example.com"));

        let skip = SkippedFile::duplicate_title_company("jd.pdf", "Engineer", "Acme");
        assert!(skip.reason.contains("Engineer"));
        assert!(skip.reason.contains("Acme"));
    }
}
