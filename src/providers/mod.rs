//! Generation providers.
//!
//! The gate only needs "turn a prompt into raw completion text"; each hosted
//! API is one implementation of [`Provider`], picked at startup by
//! [`ProviderKind`].

mod gemini;
mod openai;

pub use gemini::Gemini;
pub use openai::OpenAiCompatible;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ProviderKind;
use crate::error::UpstreamError;
use crate::prompt::Prompt;

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Send the prompt and return the model's raw text, asking for JSON output.
    async fn generate(&self, prompt: &Prompt) -> Result<String, UpstreamError>;
}

// Provider construction settings
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Build the configured provider, or `None` when its API key is missing.
pub fn build(settings: ProviderSettings, client: reqwest::Client) -> Option<Arc<dyn Provider>> {
    let api_key = settings.api_key.filter(|k| !k.trim().is_empty())?;
    let kind = settings.kind;
    let model = settings
        .model
        .unwrap_or_else(|| kind.default_model().to_string());
    let base_url = settings
        .base_url
        .unwrap_or_else(|| kind.default_base_url().to_string())
        .trim_end_matches('/')
        .to_string();

    let provider: Arc<dyn Provider> = match kind {
        ProviderKind::Groq | ProviderKind::OpenAi => Arc::new(OpenAiCompatible::new(
            kind.display_name(),
            client,
            base_url,
            api_key,
            model,
        )),
        ProviderKind::Gemini => Arc::new(Gemini::new(client, base_url, api_key, model)),
    };
    Some(provider)
}

// Read a failed response into an UpstreamError, keeping the body text
pub(crate) async fn status_error(res: reqwest::Response) -> UpstreamError {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    UpstreamError::Status { status, body }
}
