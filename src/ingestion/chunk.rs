//! Fixed-window chunking with overlap.
//!
//! The window slides in grapheme clusters so a boundary never lands inside a
//! combining sequence. Overlap keeps a clause and its cross-reference (a
//! section number at the end of one window, its text at the start of the
//! next) retrievable from a single chunk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::types::ConfigError;

/// A bounded contiguous slice of source text, the unit of embedding and
/// retrieval. Immutable once created; removed only by a full store reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Stable id derived from the chunk's position: `{namespace}-{index:05}`.
    pub id: String,
    pub text: String,
    /// Offset of the window start within the document, in grapheme clusters.
    pub source_offset: usize,
    pub metadata: BTreeMap<String, String>,
}

/// Splits `text` into overlapping windows of `config.chunk_size` graphemes.
///
/// Consecutive windows share `config.overlap` graphemes; a document no
/// longer than one window yields exactly one chunk. Empty input yields no
/// chunks.
pub fn split_into_chunks(
    namespace: &str,
    text: &str,
    config: &ChunkingConfig,
) -> Result<Vec<DocumentChunk>, ConfigError> {
    config.validate()?;

    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let total = graphemes.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let step = config.chunk_size - config.overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut index = 0usize;

    loop {
        let end = (start + config.chunk_size).min(total);
        let window = graphemes[start..end].concat();
        let mut metadata = BTreeMap::new();
        metadata.insert("offset".to_string(), start.to_string());
        metadata.insert("len".to_string(), (end - start).to_string());
        chunks.push(DocumentChunk {
            id: format!("{namespace}-{index:05}"),
            text: window,
            source_offset: start,
            metadata,
        });

        // The last window is the one that reaches the end of the document.
        if start + config.chunk_size >= total {
            break;
        }
        start += step;
        index += 1;
    }

    Ok(chunks)
}
