//! Codescope Ollama Library
//!
//! `ModelClient` implementation for a locally running Ollama server.

use async_trait::async_trait;
use codescope_core::{
    Config, Error, GenerateRequest, GenerateResponse, ModelClient, ModelInfo, Result,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GENERATE_PATH: &str = "/api/generate";
const TAGS_PATH: &str = "/api/tags";

/// HTTP client for the Ollama API.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

/// Request body for `POST /api/generate`.
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body for a non-streaming generate call.
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    model: Option<String>,
}

/// Response body for `GET /api/tags`.
#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// Error body returned by Ollama on failure.
#[derive(Deserialize)]
struct OllamaError {
    error: String,
}

impl OllamaClient {
    /// Create a client for the given base URL with no request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the shared configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ollama_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the status and decode the JSON body of an Ollama response.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::upstream(format!("Failed to read Ollama response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(Error::Upstream {
                message: format!("Ollama returned {}: {}", status.as_u16(), message),
                status: Some(status.as_u16()),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::upstream(format!("Failed to parse Ollama response: {}", e)))
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let body = OllamaGenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
        };

        tracing::debug!("Sending prompt to {} (model {})", self.base_url, request.model);
        let response = self
            .client
            .post(self.url(GENERATE_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Ollama request failed: {}", e)))?;

        let generated: OllamaGenerateResponse = Self::read_json(response).await?;
        Ok(GenerateResponse {
            text: generated.response,
            model: generated.model.unwrap_or_else(|| request.model.clone()),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.url(TAGS_PATH))
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Ollama request failed: {}", e)))?;

        let tags: OllamaTagsResponse = Self::read_json(response).await?;
        Ok(tags.models)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
