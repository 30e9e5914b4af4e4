use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ModelProvider, ModelRequest};

#[derive(Debug)]
pub struct MockModelProvider {
    reply: Result<String, String>,
    requests: Arc<RwLock<Vec<ModelRequest>>>,
}

impl MockModelProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn requests(&self) -> Vec<ModelRequest> {
        self.requests.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

impl Default for MockModelProvider {
    fn default() -> Self {
        Self::replying("Mock completion.")
    }
}

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String> {
        self.requests.write().await.push(request);

        match &self.reply {
            Ok(text) => Ok(text.trim().to_owned()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}
