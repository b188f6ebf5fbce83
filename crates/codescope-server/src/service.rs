use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use codescope_core::conversation::generate_id;
use codescope_core::storage::ConversationStore;
use codescope_core::{
    analyzer, conversation, AnalyzedFile, Error, GenerateRequest, Message, ModelClient,
    ProjectAnalysis, ProjectAnalyzer, Result,
};
use tempfile::TempDir;
use tokio::sync::RwLock;
use tokio::task::JoinError;

/// Result of one successful chat exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub model: String,
    pub conversation_id: String,
    pub message_count: usize,
}

/// Forwards chat messages to the inference server and records the exchange.
pub struct ChatService {
    store: Arc<dyn ConversationStore>,
    client: Arc<dyn ModelClient>,
    default_model: String,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        client: Arc<dyn ModelClient>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            client,
            default_model: default_model.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn client(&self) -> &Arc<dyn ModelClient> {
        &self.client
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Send `message` in the given (or a new) conversation.
    ///
    /// The user message is recorded before the upstream call and stays
    /// recorded if that call fails.
    pub async fn chat(
        &self,
        message: &str,
        model: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply> {
        if message.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Message is required and must be a non-empty string".to_string(),
            ));
        }

        let model = non_blank(model).unwrap_or(&self.default_model).to_string();
        let conversation_id = match non_blank(conversation_id) {
            Some(id) => id.to_string(),
            None => conversation::generate_conversation_id(),
        };

        self.store.get_or_create(&conversation_id).await?;
        self.store
            .append(&conversation_id, Message::user(message))
            .await?;

        tracing::info!("Chat in {} using model {}", conversation_id, model);
        let request = GenerateRequest {
            model,
            prompt: message.to_string(),
        };
        let generated = self.client.generate(&request).await?;

        let conversation = self
            .store
            .append(
                &conversation_id,
                Message::assistant(generated.text.clone(), generated.model.clone()),
            )
            .await?;

        Ok(ChatReply {
            response: generated.text,
            model: generated.model,
            conversation_id,
            message_count: conversation.message_count(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// An analysis kept for follow-up file and search requests.
pub struct StoredAnalysis {
    pub id: String,
    pub root: PathBuf,
    pub analysis: ProjectAnalysis,
    /// Extraction directory of an uploaded archive, removed on drop
    _workspace: Option<TempDir>,
}

/// Runs the analyzer and keeps results in process memory.
pub struct AnalysisService {
    analyzer: Arc<ProjectAnalyzer>,
    max_extracted_bytes: u64,
    analyses: RwLock<HashMap<String, Arc<StoredAnalysis>>>,
}

impl AnalysisService {
    /// `max_extracted_bytes` caps the unpacked size of an uploaded archive.
    pub fn new(analyzer: Arc<ProjectAnalyzer>, max_extracted_bytes: u64) -> Self {
        Self {
            analyzer,
            max_extracted_bytes,
            analyses: RwLock::new(HashMap::new()),
        }
    }

    /// Analyze a directory on the local filesystem.
    pub async fn analyze_path(&self, path: &Path) -> Result<Arc<StoredAnalysis>> {
        if !path.is_dir() {
            return Err(Error::InvalidInput(format!(
                "Not a directory: {}",
                path.display()
            )));
        }
        let root = path.to_path_buf();
        let analysis = self.run(root.clone()).await?;
        Ok(self.insert(root, analysis, None).await)
    }

    /// Extract an uploaded zip archive into a temp directory and analyze it.
    pub async fn analyze_archive(&self, bytes: Vec<u8>) -> Result<Arc<StoredAnalysis>> {
        let workspace = tempfile::Builder::new()
            .prefix("codescope-upload-")
            .tempdir()?;
        let dest = workspace.path().to_path_buf();

        let max_bytes = self.max_extracted_bytes;
        let root = tokio::task::spawn_blocking(move || {
            crate::upload::extract_archive(&bytes, &dest, max_bytes)
        })
        .await
        .map_err(join_error)??;
        tracing::info!("Extracted upload to {}", root.display());

        let analysis = self.run(root.clone()).await?;
        Ok(self.insert(root, analysis, Some(workspace)).await)
    }

    pub async fn get(&self, id: &str) -> Result<Arc<StoredAnalysis>> {
        self.analyses
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Analysis not found: {}", id)))
    }

    /// Content of a file recorded by the analysis.
    pub async fn read_file(&self, id: &str, path: &str) -> Result<String> {
        let stored = self.get(id).await?;
        if stored.analysis.file(path).is_none() {
            return Err(Error::NotFound(format!("cannot read file {}", path)));
        }
        let root = stored.root.clone();
        let relative = path.to_string();
        tokio::task::spawn_blocking(move || analyzer::read_file(&root, &relative))
            .await
            .map_err(join_error)?
    }

    pub async fn search(&self, id: &str, pattern: &str) -> Result<Vec<AnalyzedFile>> {
        let stored = self.get(id).await?;
        let results = stored.analysis.search(pattern)?;
        Ok(results.into_iter().cloned().collect())
    }

    /// Drop an analysis. An uploaded archive's files go with it.
    pub async fn remove(&self, id: &str) -> Result<()> {
        match self.analyses.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("Analysis not found: {}", id))),
        }
    }

    pub async fn len(&self) -> usize {
        self.analyses.read().await.len()
    }

    async fn run(&self, root: PathBuf) -> Result<ProjectAnalysis> {
        let analyzer = Arc::clone(&self.analyzer);
        tokio::task::spawn_blocking(move || analyzer.analyze(&root))
            .await
            .map_err(join_error)?
    }

    async fn insert(
        &self,
        root: PathBuf,
        analysis: ProjectAnalysis,
        workspace: Option<TempDir>,
    ) -> Arc<StoredAnalysis> {
        let id = generate_id("analysis");
        tracing::info!(
            "Stored analysis {} ({} files) for {}",
            id,
            analysis.file_count,
            root.display()
        );
        let stored = Arc::new(StoredAnalysis {
            id: id.clone(),
            root,
            analysis,
            _workspace: workspace,
        });
        self.analyses.write().await.insert(id, Arc::clone(&stored));
        stored
    }
}

fn join_error(err: JoinError) -> Error {
    Error::Other(anyhow::anyhow!("Background task failed: {}", err))
}
