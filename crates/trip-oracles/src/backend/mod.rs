//! Chat completion backends the oracle implementation runs on.

mod openai;

pub use openai::OpenAiChatBackend;

use async_trait::async_trait;

use crate::outcome::OracleError;

/// One chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Optional system prompt framing the decision.
    pub system: Option<String>,
    /// The decision problem itself.
    pub prompt: String,
    /// Sampling temperature; backends apply their own default when unset.
    pub temperature: Option<f32>,
    /// Ask the backend to constrain output to a single JSON object.
    pub json: bool,
}

impl ChatRequest {
    /// A JSON-constrained request, the normal mode for oracle decisions.
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json: true,
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A model endpoint that turns a prompt into raw text.
///
/// The typed oracle layer sits on top: it builds prompts, calls the backend,
/// and schema-validates what comes back.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String, OracleError>;
}
