//! Generative model client seam.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single non-streaming completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
}

/// The generated text and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
    pub model: String,
}

/// A model available on the inference server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Client for a text-generation server.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a completion for a prompt.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;

    /// List the models the server has available.
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Base URL of the server, for diagnostics.
    fn base_url(&self) -> &str;
}
