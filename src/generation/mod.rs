//! Generator contract and an in-process fake.
//!
//! Retry and backoff belong to the caller or the transport layer; a failed
//! generation surfaces as a typed [`GenerationError`] and is never papered
//! over with a canned answer.

mod gemini;

pub use self::gemini::GeminiGenerator;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::types::GenerationError;

/// Contract for the external text generator.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produces a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Cheap readiness probe used during router initialization. Defaults to
    /// success for in-process implementations.
    async fn healthcheck(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}

/// Scripted generator for tests: returns a fixed reply (or a fixed error)
/// and records every prompt it was asked to complete.
#[derive(Debug, Default)]
pub struct MockGenerator {
    reply: String,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with a transport error.
    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().push(prompt.to_string());
        if self.fail {
            return Err(GenerationError::Transport("scripted failure".to_string()));
        }
        Ok(self.reply.clone())
    }

    async fn healthcheck(&self) -> Result<(), GenerationError> {
        if self.fail {
            return Err(GenerationError::Transport("scripted failure".to_string()));
        }
        Ok(())
    }
}
