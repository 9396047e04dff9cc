//! Corpus ingestion: extraction, chunking, and the embed-and-upsert pipeline.
//!
//! * [`extract`] — turns document bytes into plain text ahead of chunking.
//! * [`chunk`] — fixed-window splitting with overlap and stable ids.
//! * [`ingestor`] — batched embedding and upserts with visible partial
//!   progress, plus destructive reset and an existence probe.

pub mod chunk;
pub mod extract;
pub mod ingestor;

pub use chunk::{DocumentChunk, split_into_chunks};
pub use extract::{DocumentSource, extract_text};
pub use ingestor::{CorpusIngestor, IngestReport};
