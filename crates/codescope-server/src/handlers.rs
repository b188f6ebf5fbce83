use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Path as UrlPath, Query};
use axum::{Extension, Json};
use codescope_core::{
    Config, Conversation, ConversationSummary, ModelClient, ProjectAnalysis, ProjectAnalyzer,
};
use codescope_core::storage::ConversationStore;

use crate::error::{bad_request, not_found, AppError};
use crate::models::{
    AnalyzePathRequest, AnalyzeResponse, ChatRequest, ChatResponse, DeletedResponse,
    FileContentResponse, FileQuery, HealthResponse, ModelsResponse, SearchQuery, SearchResponse,
    UpstreamStatus,
};
use crate::service::{AnalysisService, ChatService, StoredAnalysis};

/// Uploaded archives may unpack to this multiple of the request body limit.
const EXTRACTION_FACTOR: u64 = 10;

pub struct AppState {
    pub config: Config,
    pub chat: ChatService,
    pub analyses: AnalysisService,
}

impl AppState {
    pub fn new(
        config: Config,
        client: Arc<dyn ModelClient>,
        store: Arc<dyn ConversationStore>,
        analyzer: Arc<ProjectAnalyzer>,
    ) -> Self {
        let chat = ChatService::new(store, client, config.default_model.clone());
        let max_extracted = (config.max_upload_bytes as u64).saturating_mul(EXTRACTION_FACTOR);
        Self {
            config,
            chat,
            analyses: AnalysisService::new(analyzer, max_extracted),
        }
    }
}

pub type SharedState = Arc<AppState>;

pub async fn health(Extension(state): Extension<SharedState>) -> Json<HealthResponse> {
    let client = state.chat.client();
    let reachable = client.list_models().await.is_ok();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        ollama: UpstreamStatus {
            url: client.base_url().to_string(),
            reachable,
        },
    })
}

pub async fn models(
    Extension(state): Extension<SharedState>,
) -> Result<Json<ModelsResponse>, AppError> {
    let models = state.chat.client().list_models().await?;
    Ok(Json(ModelsResponse { models }))
}

pub async fn chat(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;

    let reply = state
        .chat
        .chat(
            &req.message,
            req.model.as_deref(),
            req.conversation_id.as_deref(),
        )
        .await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        model: reply.model,
        conversation_id: reply.conversation_id,
        message_count: reply.message_count,
    }))
}

pub async fn list_conversations(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    Ok(Json(state.chat.store().list().await?))
}

pub async fn get_conversation(
    Extension(state): Extension<SharedState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Conversation>, AppError> {
    state
        .chat
        .store()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Conversation not found"))
}

pub async fn delete_conversation(
    Extension(state): Extension<SharedState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    if !state.chat.store().delete(&id).await? {
        return Err(not_found("Conversation not found"));
    }
    tracing::info!("Deleted conversation {}", id);
    Ok(Json(DeletedResponse { deleted: id }))
}

pub async fn analyze_upload(
    Extension(state): Extension<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut archive = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        if field.file_name().is_some() {
            let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
            archive = Some(bytes);
            break;
        }
    }

    let bytes = archive.ok_or_else(|| bad_request("No archive file in upload"))?;
    tracing::info!("Received archive upload ({} bytes)", bytes.len());
    let stored = state.analyses.analyze_archive(bytes.to_vec()).await?;
    Ok(Json(analyze_response(&stored)))
}

pub async fn analyze_path(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<AnalyzePathRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;
    let stored = state.analyses.analyze_path(Path::new(&req.path)).await?;
    Ok(Json(analyze_response(&stored)))
}

pub async fn get_analysis(
    Extension(state): Extension<SharedState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<ProjectAnalysis>, AppError> {
    let stored = state.analyses.get(&id).await?;
    Ok(Json(stored.analysis.clone()))
}

pub async fn analysis_file(
    Extension(state): Extension<SharedState>,
    UrlPath(id): UrlPath<String>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Json<FileContentResponse>, AppError> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;
    let content = state.analyses.read_file(&id, &query.path).await?;
    Ok(Json(FileContentResponse {
        path: query.path,
        content,
    }))
}

pub async fn search_analysis(
    Extension(state): Extension<SharedState>,
    UrlPath(id): UrlPath<String>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;
    let results = state.analyses.search(&id, &query.q).await?;
    Ok(Json(SearchResponse { results }))
}

pub async fn delete_analysis(
    Extension(state): Extension<SharedState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    state.analyses.remove(&id).await?;
    Ok(Json(DeletedResponse { deleted: id }))
}

fn analyze_response(stored: &StoredAnalysis) -> AnalyzeResponse {
    AnalyzeResponse {
        id: stored.id.clone(),
        analysis: stored.analysis.clone(),
    }
}
