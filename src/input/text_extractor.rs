//! Text extraction from various file formats

use crate::error::{Result, ResumeMatchError};
use crate::input::file_detector::FileType;
use log::{debug, warn};
use pulldown_cmark::{html, Parser};
use regex::Regex;

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Paginated PDF extraction.
///
/// Each page is extracted on its own and the results are joined with `\n`.
/// A page that fails contributes an empty string; only a buffer that cannot
/// be opened as a PDF at all is an error.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        if !FileType::looks_like_pdf(bytes) {
            return Err(ResumeMatchError::DocumentFormat(
                "missing %PDF header".to_string(),
            ));
        }

        let document = lopdf::Document::load_mem(bytes).map_err(|e| {
            ResumeMatchError::DocumentFormat(format!("Failed to open PDF: {}", e))
        })?;

        let pages = document.get_pages();
        let mut page_texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(text) => page_texts.push(text.trim_end().to_string()),
                Err(e) => {
                    warn!("Page {} could not be extracted: {}", page_number, e);
                    page_texts.push(String::new());
                }
            }
        }

        let text = page_texts.join("\n");
        if text.trim().is_empty() && !pages.is_empty() {
            debug!("Per-page extraction produced no text, retrying whole document");
            return Ok(Self::whole_document_text(bytes).unwrap_or(text));
        }

        Ok(text)
    }
}

impl PdfExtractor {
    /// Second pass through `pdf-extract`, which decodes more font encodings.
    /// That crate can panic on unusual fonts, so the pass is isolated.
    fn whole_document_text(bytes: &[u8]) -> Option<String> {
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                warn!("Whole-document PDF extraction failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Whole-document PDF extraction panicked");
                None
            }
        }
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let markdown_content = String::from_utf8_lossy(bytes);

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(self.html_to_text(&html_output))
    }
}

impl MarkdownExtractor {
    fn html_to_text(&self, html: &str) -> String {
        let text = html
            .replace("<br>", "\n")
            .replace("<br />", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n");

        let re = Regex::new(r"<[^>]*>").expect("Invalid tag regex");
        let clean_text = re.replace_all(&text, "");

        let clean_text = clean_text
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");

        let lines: Vec<String> = clean_text
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        lines.join("\n")
    }
}
