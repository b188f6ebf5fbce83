use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use anyhow::Result;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::handlers::{
    analysis_file, analyze_path, analyze_upload, chat, delete_analysis, delete_conversation,
    get_analysis, get_conversation, health, list_conversations, models, search_analysis, AppState,
    SharedState,
};
use codescope_core::storage::{ConversationStore, InMemoryConversationStore};
use codescope_core::{AnalyzerOptions, Config, ModelClient, ProjectAnalyzer};
use codescope_ollama::OllamaClient;

/// Build the API router around shared state.
pub fn build_router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/health", get(health))
        .route("/api/models", get(models))
        .route("/api/chat", post(chat))
        .route("/api/conversations", get(list_conversations))
        .route(
            "/api/conversations/:id",
            get(get_conversation).delete(delete_conversation),
        )
        .route("/api/analyze", post(analyze_upload))
        .route("/api/analyze/path", post(analyze_path))
        .route("/api/analyses/:id", get(get_analysis).delete(delete_analysis))
        .route("/api/analyses/:id/file", get(analysis_file))
        .route("/api/analyses/:id/search", get(search_analysis))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

pub async fn start(config: Config) -> Result<()> {
    // Initialize shared state
    let client = Arc::new(OllamaClient::from_config(&config)) as Arc<dyn ModelClient>;
    let store = Arc::new(InMemoryConversationStore::new()) as Arc<dyn ConversationStore>;
    let analyzer = Arc::new(
        ProjectAnalyzer::new(codescope_parser::default_extractor())
            .with_options(AnalyzerOptions::default()),
    );

    let addr = config.bind_address();
    let ollama_url = config.ollama_url.clone();
    let state = Arc::new(AppState::new(config, client, store, analyzer));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Forwarding chat requests to {}", ollama_url);
    println!("Codescope server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
