//! Provider traits for the AI backends the gateway dispatches to.

use anyhow::Result;
use async_trait::async_trait;

/// A managed generative-model service: takes a prompt, returns generated
/// text. All conversation state lives with the caller.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a completion for a single user prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// The name of this provider implementation.
    fn name(&self) -> &str;
}

/// A managed retrieval-augmented generation service backed by a pre-indexed
/// knowledge base.
#[async_trait]
pub trait KnowledgeProvider: Send + Sync {
    /// Retrieve relevant documents and generate an answer for the prompt.
    async fn retrieve_and_generate(&self, prompt: &str) -> Result<String>;

    /// The name of this provider implementation.
    fn name(&self) -> &str;
}
