//! OCR for image uploads and scanned PDFs. Images go straight to Tesseract;
//! PDFs are first rendered to page images with `pdftoppm` (poppler-utils).

use std::io::Cursor;
use std::process::Command;

use crate::extract::ExtractError;

const OCR_LANGUAGE: &str = "eng";
const RENDER_DPI: u32 = 300;

/// Runs Tesseract over a single image held in memory.
pub fn recognize(image_bytes: &[u8]) -> Result<String, ExtractError> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| ExtractError::Ocr(format!("failed to load image: {e}")))?;

    // Normalize to PNG in memory for Tesseract.
    let mut png_data = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
        .map_err(|e| ExtractError::Ocr(format!("failed to convert image: {e}")))?;

    let mut lt = leptess::LepTess::new(None, OCR_LANGUAGE)
        .map_err(|e| ExtractError::Ocr(format!("failed to initialize Tesseract: {e}")))?;

    lt.set_image_from_mem(&png_data)
        .map_err(|e| ExtractError::Ocr(format!("failed to set image: {e}")))?;

    lt.get_utf8_text()
        .map_err(|e| ExtractError::Ocr(format!("recognition failed: {e}")))
}

/// OCRs every page of a PDF by rendering it to PNGs with `pdftoppm` and
/// feeding each page image to Tesseract.
pub fn ocr_pdf(pdf_bytes: &[u8]) -> Result<String, ExtractError> {
    let dir = tempfile::tempdir()
        .map_err(|e| ExtractError::Ocr(format!("failed to create temp dir: {e}")))?;
    let pdf_path = dir.path().join("input.pdf");
    let prefix = dir.path().join("page");

    std::fs::write(&pdf_path, pdf_bytes)
        .map_err(|e| ExtractError::Ocr(format!("failed to write temp PDF: {e}")))?;

    let output = Command::new("pdftoppm")
        .args(["-png", "-r", &RENDER_DPI.to_string()])
        .arg(&pdf_path)
        .arg(&prefix)
        .output()
        .map_err(|e| {
            ExtractError::Ocr(format!(
                "failed to run pdftoppm: {e}. Make sure poppler-utils is installed."
            ))
        })?;

    if !output.status.success() {
        return Err(ExtractError::Ocr(format!(
            "pdftoppm failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    // pdftoppm writes page-1.png, page-2.png, ... (zero-padded for longer docs)
    let mut pages: Vec<_> = std::fs::read_dir(dir.path())
        .map_err(|e| ExtractError::Ocr(format!("failed to list rendered pages: {e}")))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
        .collect();
    pages.sort();

    if pages.is_empty() {
        return Err(ExtractError::Ocr("pdftoppm produced no pages".to_string()));
    }

    let mut text = String::new();
    for page in pages {
        let image_bytes = std::fs::read(&page)
            .map_err(|e| ExtractError::Ocr(format!("failed to read rendered page: {e}")))?;
        text.push_str(&recognize(&image_bytes)?);
        text.push('\n');
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_image_data_errors() {
        let result = recognize(b"not an image");
        match result {
            Err(ExtractError::Ocr(msg)) => assert!(msg.contains("failed to load image")),
            other => panic!("expected Ocr error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_image_data_errors() {
        assert!(recognize(&[]).is_err());
    }
}
