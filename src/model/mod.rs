mod mock;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::AppConfig;

pub use mock::MockModelProvider;
pub use openai::OpenAiProvider;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl CompletionParams {
    pub fn summary() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 300,
        }
    }

    pub fn docstring() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 150,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    pub params: CompletionParams,
}

impl ModelRequest {
    pub fn new(prompt: impl Into<String>, params: CompletionParams) -> Self {
        Self {
            prompt: prompt.into(),
            params,
        }
    }
}

/// A single-turn completion backend. Implementations make exactly one call
/// per `complete` and return the first choice's text, trimmed.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String>;
}

/// `None` when no upstream key is configured; the POST routes then answer 500.
pub fn build_model_provider(config: &AppConfig) -> Option<Arc<dyn ModelProvider>> {
    let Some(api_key) = config.openai_api_key.clone() else {
        warn!("OPENAI_API_KEY not set; completion routes will answer 500");
        return None;
    };

    info!(model = %config.openai_model, "using OpenAI model provider");
    Some(Arc::new(OpenAiProvider::new(
        api_key,
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    )))
}
