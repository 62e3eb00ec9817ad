// src/llm/mod.rs
// Generative model seam used by the AI operation

mod gemini;

pub use gemini::{DEFAULT_MODEL, GeminiClient};

use anyhow::Result;
use async_trait::async_trait;

/// The only capability the service needs from a generative model
#[async_trait]
pub trait AnswerModel: Send + Sync {
    /// Send one prompt, return the model's raw text reply
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier for logs
    fn model_name(&self) -> &str;
}
