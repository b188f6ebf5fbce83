use codescope_core::{AnalyzedFile, ModelInfo, ProjectAnalysis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub model: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
    pub conversation_id: String,
    pub message_count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub ollama: UpstreamStatus,
}

#[derive(Debug, Serialize)]
pub struct UpstreamStatus {
    pub url: String,
    pub reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzePathRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub id: String,
    pub analysis: ProjectAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct FileContentResponse {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<AnalyzedFile>,
}
