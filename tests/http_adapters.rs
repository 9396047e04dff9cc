//! HTTP adapter behavior against a mock server: wire shapes, error mapping,
//! and contract enforcement.

use httpmock::prelude::*;
use serde_json::json;
use url::Url;

use lexsmith::embeddings::{EmbeddingProvider, HttpEmbeddingProvider};
use lexsmith::generation::{GeminiGenerator, Generator};
use lexsmith::types::{EmbeddingError, GenerationError};

fn endpoint(server: &MockServer, path: &str) -> Url {
    Url::parse(&server.url(path)).unwrap()
}

#[tokio::test]
async fn embed_batch_roundtrips_in_order() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/embed")
            .json_body(json!({"inputs": ["equality before law", "punishment for theft"]}));
        then.status(200)
            .json_body(json!([[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]));
    });

    let provider = HttpEmbeddingProvider::new(endpoint(&server, "/embed"));
    let vectors = provider
        .embed_batch(&[
            "equality before law".to_string(),
            "punishment for theft".to_string(),
        ])
        .await
        .unwrap();

    mock.assert();
    assert_eq!(vectors, vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);
}

#[tokio::test]
async fn embed_batch_rejects_length_mismatch() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/embed");
        then.status(200).json_body(json!([[0.1, 0.2]]));
    });

    let provider = HttpEmbeddingProvider::new(endpoint(&server, "/embed"));
    let err = provider
        .embed_batch(&["one".to_string(), "two".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EmbeddingError::LengthMismatch { want: 2, got: 1 }
    ));
}

#[tokio::test]
async fn embed_batch_maps_server_errors_to_transport() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/embed");
        then.status(500);
    });

    let provider = HttpEmbeddingProvider::new(endpoint(&server, "/embed"));
    let err = provider
        .embed_batch(&["text".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, EmbeddingError::Transport(_)));
}

#[tokio::test]
async fn empty_batch_skips_the_network() {
    // No mock registered: a request would fail the test with a 404 → error.
    let server = MockServer::start();
    let provider = HttpEmbeddingProvider::new(endpoint(&server, "/embed"));
    let vectors = provider.embed_batch(&[]).await.unwrap();
    assert!(vectors.is_empty());
}

#[tokio::test]
async fn gemini_generate_extracts_the_candidate_text() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent")
            .query_param("key", "test-key");
        then.status(200).json_body(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Article 14 guarantees equality before law."}]}
            }]
        }));
    });

    let generator =
        GeminiGenerator::new("test-key", "gemini-2.0-flash").with_base_url(server.base_url());
    let text = generator.generate("What is Article 14?").await.unwrap();

    mock.assert();
    assert_eq!(text, "Article 14 guarantees equality before law.");
}

#[tokio::test]
async fn gemini_maps_rate_limits_and_auth_failures() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/limited:generateContent");
        then.status(429).body("quota exhausted");
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/locked:generateContent");
        then.status(403).body("bad key");
    });

    let limited = GeminiGenerator::new("k", "limited").with_base_url(server.base_url());
    assert!(matches!(
        limited.generate("q").await.unwrap_err(),
        GenerationError::RateLimited(_)
    ));

    let locked = GeminiGenerator::new("k", "locked").with_base_url(server.base_url());
    assert!(matches!(
        locked.generate("q").await.unwrap_err(),
        GenerationError::Auth(_)
    ));
}

#[tokio::test]
async fn gemini_empty_candidates_are_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent");
        then.status(200).json_body(json!({"candidates": []}));
    });

    let generator =
        GeminiGenerator::new("k", "gemini-2.0-flash").with_base_url(server.base_url());
    assert!(matches!(
        generator.generate("q").await.unwrap_err(),
        GenerationError::EmptyCompletion
    ));
}

#[tokio::test]
async fn gemini_healthcheck_fetches_model_metadata() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1beta/models/gemini-2.0-flash")
            .query_param("key", "test-key");
        then.status(200)
            .json_body(json!({"name": "models/gemini-2.0-flash"}));
    });

    let generator =
        GeminiGenerator::new("test-key", "gemini-2.0-flash").with_base_url(server.base_url());
    generator.healthcheck().await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn gemini_healthcheck_fails_on_unknown_model() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1beta/models/nope");
        then.status(404).body("model not found");
    });

    let generator = GeminiGenerator::new("k", "nope").with_base_url(server.base_url());
    assert!(matches!(
        generator.healthcheck().await.unwrap_err(),
        GenerationError::Transport(_)
    ));
}
