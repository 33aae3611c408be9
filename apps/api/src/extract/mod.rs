//! Text extraction from uploaded files: PDF (text layer with OCR fallback
//! for scanned documents), DOCX, plain text, and images.

pub mod docx;
pub mod ocr;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("OCR failed: {0}")]
    Ocr(String),
}

/// Supported upload formats, detected from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    Txt,
    Image,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        let ext = lower.rsplit_once('.').map(|(_, e)| e)?;
        match ext {
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            "txt" => Some(FileKind::Txt),
            "jpg" | "jpeg" | "png" | "bmp" | "tiff" => Some(FileKind::Image),
            _ => None,
        }
    }
}

/// Extracts text from raw file bytes according to the detected kind.
pub fn extract_text(kind: FileKind, bytes: &[u8]) -> Result<String, ExtractError> {
    match kind {
        FileKind::Pdf => extract_pdf(bytes),
        FileKind::Docx => docx::extract(bytes),
        FileKind::Txt => Ok(String::from_utf8_lossy(bytes).into_owned()),
        FileKind::Image => ocr::recognize(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) if !needs_ocr(&text) => Ok(text),
        Ok(_) => {
            // Text layer is empty or garbled — likely a scanned document.
            warn!("PDF has no usable text layer, falling back to OCR");
            ocr::ocr_pdf(bytes)
        }
        Err(e) => {
            warn!("PDF text extraction failed ({e}), falling back to OCR");
            ocr::ocr_pdf(bytes).map_err(|ocr_err| {
                ExtractError::Pdf(format!("{e}; OCR fallback also failed: {ocr_err}"))
            })
        }
    }
}

/// Minimum characters before the alphanumeric-ratio check applies.
const MIN_TOTAL_CHARS: usize = 100;
/// Below this percentage of alphanumeric characters the text layer is
/// considered garbled (CID-font extraction noise) and OCR is used instead.
const MIN_ALPHANUMERIC_PERCENT: usize = 10;

/// Decides whether the extracted PDF text layer is unusable.
fn needs_ocr(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    let total = trimmed.chars().count();
    if total <= MIN_TOTAL_CHARS {
        return false;
    }
    let alphanumeric = trimmed.chars().filter(|c| c.is_alphanumeric()).count();
    alphanumeric * 100 < total * MIN_ALPHANUMERIC_PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_detection() {
        assert_eq!(FileKind::from_filename("resume.pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_filename("Resume.PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_filename("cv.docx"), Some(FileKind::Docx));
        assert_eq!(FileKind::from_filename("notes.txt"), Some(FileKind::Txt));
        assert_eq!(FileKind::from_filename("scan.jpeg"), Some(FileKind::Image));
        assert_eq!(FileKind::from_filename("scan.tiff"), Some(FileKind::Image));
    }

    #[test]
    fn test_file_kind_rejects_unsupported() {
        assert_eq!(FileKind::from_filename("archive.zip"), None);
        assert_eq!(FileKind::from_filename("legacy.doc"), None);
        assert_eq!(FileKind::from_filename("noextension"), None);
    }

    #[test]
    fn test_txt_extraction_is_lossy_utf8() {
        let text = extract_text(FileKind::Txt, b"plain resume text").unwrap();
        assert_eq!(text, "plain resume text");
        // Invalid UTF-8 degrades instead of failing
        let text = extract_text(FileKind::Txt, &[0x68, 0x69, 0xff]).unwrap();
        assert!(text.starts_with("hi"));
    }

    #[test]
    fn test_needs_ocr_empty_text() {
        assert!(needs_ocr(""));
        assert!(needs_ocr("   \n\t  "));
    }

    #[test]
    fn test_needs_ocr_normal_text() {
        assert!(!needs_ocr("Jane Doe\nSenior Engineer\n10 years of Rust"));
    }

    #[test]
    fn test_needs_ocr_garbled_text() {
        let garbled = "?!@#$%^&*()".repeat(20);
        assert!(needs_ocr(&garbled));
    }

    #[test]
    fn test_short_text_never_garbled() {
        // Below the ratio-check threshold, any non-empty text is accepted.
        assert!(!needs_ocr("!!!"));
    }
}
