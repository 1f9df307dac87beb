use crate::error::DocumentError;
use lopdf::Document;
use std::path::Path;

/// One page of decoded text. Transient; produced during ingestion and
/// never persisted on its own.
#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, DocumentError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, DocumentError> {
        let document =
            Document::load(path).map_err(|error| DocumentError::PdfParse(error.to_string()))?;

        if document.is_encrypted() {
            return Err(DocumentError::PdfParse(format!(
                "pdf is encrypted: {}",
                path.display()
            )));
        }

        let mut pages = Vec::new();
        for (page_number, _object_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_number])
                .map_err(|error| DocumentError::PdfParse(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(PageText {
                    number: page_number,
                    text,
                });
            }
        }

        if pages.is_empty() {
            return Err(DocumentError::NoText(path.display().to_string()));
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::{LopdfExtractor, PdfExtractor};
    use crate::error::DocumentError;
    use crate::testutil::write_sample_pdf;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extracts_text_from_a_generated_pdf() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("sample.pdf");
        write_sample_pdf(&path, "Hydraulic pumps move fluid under pressure");

        let pages = LopdfExtractor
            .extract_pages(&path)
            .expect("generated pdf should be readable");

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert!(pages[0].text.contains("Hydraulic pumps"));
    }

    #[test]
    fn malformed_bytes_fail_with_parse_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\nnot actually a pdf").expect("write");

        let result = LopdfExtractor.extract_pages(&path);
        assert!(matches!(result, Err(DocumentError::PdfParse(_))));
    }
}
