//! End-to-end demo: ingest a corpus text file into the SQLite vector store
//! and answer one question against it.
//!
//! Expects `LEXSMITH_EMBEDDING_URL` and `GOOGLE_API_KEY` in the environment
//! (a `.env` file works):
//!
//! ```bash
//! cargo run --example ask -- corpus.txt "What is Article 14?"
//! ```

use std::sync::Arc;

use lexsmith::config::ServiceConfig;
use lexsmith::embeddings::HttpEmbeddingProvider;
use lexsmith::generation::GeminiGenerator;
use lexsmith::ingestion::DocumentSource;
use lexsmith::stores::SqliteVectorStore;
use lexsmith::{LegalAssistant, RoutingDecision};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (corpus_path, question) = match (args.next(), args.next()) {
        (Some(path), Some(question)) => (path, question),
        _ => {
            eprintln!("usage: ask <corpus.txt> <question>");
            std::process::exit(2);
        }
    };

    let config = ServiceConfig::from_env()?;
    let assistant = LegalAssistant::builder()
        .embedder(Arc::new(HttpEmbeddingProvider::new(
            config.embedding_url.clone(),
        )))
        .store(Arc::new(SqliteVectorStore::open(&config.store_path).await?))
        .generator(Arc::new(GeminiGenerator::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )))
        .namespace(config.namespace.clone())
        .build()?;

    if assistant.exists().await? {
        println!("vector store already populated, skipping ingestion");
    } else {
        let bytes = tokio::fs::read(&corpus_path).await?;
        let report = assistant.ingest(&DocumentSource::PlainText(bytes)).await?;
        println!(
            "ingested {} chunks ({} batches, {} chars) in {} ms",
            report.chunks_ingested, report.batches, report.source_chars, report.elapsed_ms
        );
    }

    assistant.init().await?;

    let answer = assistant.answer(&question).await?;
    match answer.path {
        RoutingDecision::Grounded => {
            println!("\n[grounded on {} passages]", answer.cited_chunk_ids.len());
            println!("cited: {}", answer.cited_chunk_ids.join(", "));
        }
        RoutingDecision::Direct => println!("\n[direct answer, no relevant passages found]"),
    }
    println!("\n{}", answer.text);

    Ok(())
}
