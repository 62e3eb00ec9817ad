// src/answer.rs
// AI operation: constrained prompt in, first token of the reply out

use tracing::info;

use crate::error::{BfhlError, Result};
use crate::llm::AnswerModel;

/// Build the instruction prompt sent to the model
pub fn build_prompt(question: &str) -> String {
    format!(
        "Answer this question with a single word or very short phrase (maximum 2 words): {}",
        question
    )
}

/// First whitespace-delimited token of the reply, empty if there is none.
///
/// Multi-word answers lose everything after the first word ("New York" -> "New").
pub fn first_token(reply: &str) -> &str {
    reply.split_whitespace().next().unwrap_or("")
}

/// Ask the configured model a question and normalize its reply
pub async fn answer(model: Option<&dyn AnswerModel>, question: &str) -> Result<String> {
    let model = model.ok_or(BfhlError::ServiceNotConfigured)?;

    let reply = model
        .generate(&build_prompt(question))
        .await
        .map_err(BfhlError::ServiceUnavailable)?;

    let token = first_token(&reply).to_string();
    info!(model = model.model_name(), answer = %token, "AI question answered");
    Ok(token)
}
