//! DOCX text extraction: unzip the package and pull paragraph text out of
//! `word/document.xml`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::extract::ExtractError;

pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(format!("failed to open DOCX archive: {e}")))?;

    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(format!("failed to find document.xml: {e}")))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| ExtractError::Docx(format!("failed to read document.xml: {e}")))?;

    parse_document_xml(&xml_content)
}

/// Walks the WordprocessingML tree collecting `<w:t>` runs, with a newline
/// at each paragraph end.
fn parse_document_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut text = String::new();
    let mut in_text_element = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = true,
                b"p" => in_paragraph = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => {
                    if in_paragraph {
                        text.push('\n');
                        in_paragraph = false;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e.decode().unwrap_or_default();
                    text.push_str(&decoded);
                }
            }
            // quick-xml emits entity references (`&amp;`, `&#38;`) as their own
            // events; resolve them back to text when inside a `<w:t>` run.
            Ok(Event::GeneralRef(e)) => {
                if in_text_element {
                    let name = e.decode().unwrap_or_default();
                    let reference = format!("&{name};");
                    if let Ok(resolved) = quick_xml::escape::unescape(&reference) {
                        text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Docx(format!("XML parsing error: {e}")));
            }
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_paragraph() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body>
                <w:p>
                    <w:r>
                        <w:t>Jane Doe, Software Engineer</w:t>
                    </w:r>
                </w:p>
            </w:body>
        </w:document>"#;

        let text = parse_document_xml(xml).unwrap();
        assert!(text.contains("Jane Doe, Software Engineer"));
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body>
                <w:p><w:r><w:t>First line</w:t></w:r></w:p>
                <w:p><w:r><w:t>Second line</w:t></w:r></w:p>
            </w:body>
        </w:document>"#;

        let text = parse_document_xml(xml).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["First line", "Second line"]);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body><w:p><w:r><w:t>C&amp;D Engineering</w:t></w:r></w:p></w:body>
        </w:document>"#;

        let text = parse_document_xml(xml).unwrap();
        assert!(text.contains("C&D Engineering"));
    }

    #[test]
    fn test_invalid_archive_errors() {
        let result = extract(b"definitely not a zip file");
        assert!(matches!(result, Err(ExtractError::Docx(_))));
    }
}
