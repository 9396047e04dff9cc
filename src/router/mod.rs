//! The retrieval router: per-question decision between a grounded answer
//! built from retrieved corpus passages and a direct answer from the
//! generator's own knowledge.
//!
//! The routing rule itself ([`route`]) is a pure function of the retrieval
//! result and the relevance threshold — no hidden state — so it can be
//! tested without any collaborator in the loop.

mod assistant;
pub mod prompt;

pub use self::assistant::{LegalAssistant, LegalAssistantBuilder};

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::embeddings::EmbeddingProvider;
use crate::generation::Generator;
use crate::stores::{ScoredChunk, VectorStore};
use crate::types::{ConfigError, RouterError};

use self::prompt::{direct_prompt, grounded_prompt, normalize_answer};

/// Which answer path a routing decision selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingDecision {
    /// Generation conditioned on retrieved corpus passages.
    Grounded,
    /// Generation from the model's own knowledge, domain-pinned.
    Direct,
}

/// The final answer handed back to the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub path: RoutingDecision,
    /// Ids of the passages the grounded prompt included; empty on the
    /// direct path.
    pub cited_chunk_ids: Vec<String>,
}

/// Outcome of the pure routing rule: path, prompt, citations.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub decision: RoutingDecision,
    pub prompt: String,
    pub cited_chunk_ids: Vec<String>,
}

/// Applies the routing rule.
///
/// The grounded path is taken iff the retrieval result is non-empty and its
/// highest score meets the threshold (inclusive). One highly relevant chunk
/// outranks several marginal ones, so only the top score gates the
/// decision; every chunk clearing the bar is then included in the prompt in
/// descending-score order.
pub fn route(question: &str, results: &[ScoredChunk], relevance_threshold: f32) -> RoutePlan {
    let mut passages: Vec<&ScoredChunk> = results
        .iter()
        .filter(|hit| hit.score >= relevance_threshold)
        .collect();
    passages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if passages.is_empty() {
        return RoutePlan {
            decision: RoutingDecision::Direct,
            prompt: direct_prompt(question),
            cited_chunk_ids: Vec::new(),
        };
    }

    RoutePlan {
        decision: RoutingDecision::Grounded,
        prompt: grounded_prompt(question, &passages),
        cited_chunk_ids: passages.iter().map(|hit| hit.id.clone()).collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouterState {
    Uninitialized,
    Ready,
}

/// Routes questions to the grounded or direct answer path.
///
/// Lifecycle: `Uninitialized -> Ready` on a successful [`init`], back to
/// `Uninitialized` on [`teardown`] (after a store reset the stored content
/// is no longer valid for citation). A failed `init` leaves the router
/// `Uninitialized`.
///
/// [`init`]: RetrievalRouter::init
/// [`teardown`]: RetrievalRouter::teardown
pub struct RetrievalRouter {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
    state: RwLock<RouterState>,
}

impl RetrievalRouter {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            state: RwLock::new(RouterState::Uninitialized),
        }
    }

    /// Verifies both collaborators and moves the router to ready.
    pub async fn init(&self) -> Result<(), RouterError> {
        self.store.count().await.map_err(RouterError::Store)?;
        self.generator
            .healthcheck()
            .await
            .map_err(RouterError::Generation)?;
        *self.state.write() = RouterState::Ready;
        tracing::info!("retrieval router ready");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        *self.state.read() == RouterState::Ready
    }

    /// Marks the router unusable until [`init`](Self::init) succeeds again.
    pub fn teardown(&self) {
        *self.state.write() = RouterState::Uninitialized;
        tracing::info!("retrieval router torn down");
    }

    /// Answers a question, deciding per question between the grounded and
    /// direct paths.
    ///
    /// Steps are strictly sequential: embed the question, query the store,
    /// route, generate. Failures surface typed; no retries, no fallback
    /// answers.
    pub async fn answer(
        &self,
        question: &str,
        top_k: usize,
        relevance_threshold: f32,
    ) -> Result<Answer, RouterError> {
        if !self.is_ready() {
            return Err(RouterError::NotInitialized);
        }
        if top_k == 0 {
            return Err(ConfigError::ZeroTopK.into());
        }
        if !(0.0..=1.0).contains(&relevance_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(relevance_threshold).into());
        }

        let embedding = self
            .embedder
            .embed_one(question)
            .await
            .map_err(RouterError::Embedding)?;
        let results = self
            .store
            .query(&embedding, top_k)
            .await
            .map_err(RouterError::Store)?;

        let plan = route(question, &results, relevance_threshold);
        tracing::debug!(
            path = ?plan.decision,
            hits = results.len(),
            cited = plan.cited_chunk_ids.len(),
            top_score = results.first().map(|hit| f64::from(hit.score)),
            "routing decision"
        );

        let raw = self
            .generator
            .generate(&plan.prompt)
            .await
            .map_err(RouterError::Generation)?;

        Ok(Answer {
            text: normalize_answer(&raw),
            path: plan.decision,
            cited_chunk_ids: plan.cited_chunk_ids,
        })
    }
}
