//! Document text extraction ahead of chunking.
//!
//! Extraction is a pass-through concern: the corpus arrives as bytes from
//! whatever loader the application uses, and only the raw text matters from
//! here on.

use scraper::{Html, Selector};

use crate::types::IngestError;

/// Raw document bytes plus the format they should be read as.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// UTF-8 plain text, e.g. the output of a PDF-to-text pass.
    PlainText(Vec<u8>),
    /// An HTML page; visible text is extracted and whitespace collapsed.
    Html(Vec<u8>),
}

/// Extracts the text of a document.
///
/// Fails when the bytes are not valid UTF-8 or the document contains no
/// non-whitespace text.
pub fn extract_text(source: &DocumentSource) -> Result<String, IngestError> {
    let text = match source {
        DocumentSource::PlainText(bytes) => decode_utf8(bytes)?.to_string(),
        DocumentSource::Html(bytes) => html_to_text(decode_utf8(bytes)?),
    };
    if text.trim().is_empty() {
        return Err(IngestError::Extraction(
            "document contains no text".to_string(),
        ));
    }
    Ok(text)
}

fn decode_utf8(bytes: &[u8]) -> Result<&str, IngestError> {
    std::str::from_utf8(bytes)
        .map_err(|err| IngestError::Extraction(format!("document is not valid UTF-8: {err}")))
}

fn html_to_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let text = Selector::parse("body")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|body| body.text().collect::<Vec<_>>().join(" "))
        })
        .unwrap_or_else(|| document.root_element().text().collect::<Vec<_>>().join(" "));
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
