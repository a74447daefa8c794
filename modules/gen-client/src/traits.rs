use anyhow::Result;
use async_trait::async_trait;

// ============================================================================
// Requests
// ============================================================================

/// One prompt for a text model. `system` carries voice and audience,
/// `prompt` carries the task.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

// ============================================================================
// Generator
// ============================================================================

/// A text-generation backend wrapping one provider API. Implementations are
/// cheap to clone behind an Arc and safe to call concurrently.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier recorded on everything this generator produces.
    fn model_id(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
