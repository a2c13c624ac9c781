//! The simulator service façade

use std::sync::Arc;

use worksim_core::{
    ChatOutcome, ChatRequest, ChatRole, DeleteOutcome, Embedder, Evaluation, HealthStatus,
    LocalModels, Result, Scenario, ScenarioRequest, UploadReceipt, VectorStore, route_model,
};
use worksim_llm::{LlmInvoker, OllamaBackend};
use worksim_rag::{
    ContextRetriever, DocumentIngestor, ExtractorRegistry, collection_name,
};

use crate::parse;
use crate::prompts;

/// How many stored chunks to peek for scenario seed context
const SEED_PEEK: usize = 5;
/// How many of the peeked chunks actually feed the prompt
const SEED_JOIN: usize = 3;

/// Service façade over the whole pipeline: ingestion, retrieval, and the
/// dual-role conversation protocol.
///
/// Stateless per request apart from the store's contents and the invoker's
/// local gate; conversation history is supplied by the caller on every turn.
pub struct SimulatorService<S, E> {
    store: Arc<S>,
    embedder: Arc<E>,
    extractors: ExtractorRegistry,
    ingestor: DocumentIngestor<S, E>,
    retriever: ContextRetriever<S, E>,
    invoker: Arc<LlmInvoker>,
    local: Option<Arc<OllamaBackend>>,
}

impl<S: VectorStore, E: Embedder> SimulatorService<S, E> {
    pub fn new(
        store: Arc<S>,
        embedder: Arc<E>,
        extractors: ExtractorRegistry,
        invoker: Arc<LlmInvoker>,
        local: Option<Arc<OllamaBackend>>,
    ) -> Self {
        let ingestor = DocumentIngestor::new(store.clone(), embedder.clone());
        let retriever = ContextRetriever::new(store.clone(), embedder.clone());
        Self {
            store,
            embedder,
            extractors,
            ingestor,
            retriever,
            invoker,
            local,
        }
    }

    /// Extract, chunk, embed, and store an uploaded document into the
    /// collection for `(project_id, user_id)`
    pub async fn upload(
        &self,
        project_id: &str,
        user_id: Option<&str>,
        file_name: &str,
        bytes: &[u8],
        embed_percentage: u8,
    ) -> Result<UploadReceipt> {
        tracing::info!(project_id, ?user_id, file_name, embed_percentage, "upload");

        let text = self.extractors.extract(file_name, bytes)?;
        let collection = collection_name(project_id, user_id);
        self.ingestor
            .ingest(&collection, file_name, &text, embed_percentage)
            .await
    }

    /// Ranked document search against the scoped collection. Unlike chat,
    /// search does not walk the fallback chain.
    pub async fn search(
        &self,
        project_id: &str,
        user_id: Option<&str>,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<String>> {
        let collection = collection_name(project_id, user_id);
        let embedding = self.embedder.embed(query)?;
        self.store.query(&collection, &embedding, top_k).await
    }

    /// Delete the unscoped collection for a project.
    ///
    /// User-scoped collections for the same project are intentionally left
    /// intact; only legacy unscoped data is removed. Failures are reported
    /// in the outcome, not raised.
    pub async fn delete_project_files(&self, project_id: &str) -> DeleteOutcome {
        let collection = collection_name(project_id, None);
        match self.store.delete_collection(&collection).await {
            Ok(()) => DeleteOutcome {
                success: true,
                message: "프로젝트 파일 삭제 완료".to_string(),
            },
            Err(e) => {
                tracing::warn!(project_id, error = %e, "project file deletion failed");
                DeleteOutcome {
                    success: false,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Generate a role-play scenario from stored manual context.
    ///
    /// With neither context nor guidelines this returns the fixed default
    /// scenario without any provider call.
    pub async fn generate_scenario(&self, request: &ScenarioRequest) -> Result<Scenario> {
        let collection = collection_name(&request.project_id, request.user_id.as_deref());
        let seed = self
            .store
            .peek(&collection, SEED_PEEK)
            .await
            .unwrap_or_default();
        let context = seed
            .iter()
            .take(SEED_JOIN)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");

        let guidelines = request.guidelines.as_deref().unwrap_or("");
        if context.is_empty() && guidelines.is_empty() {
            return Ok(parse::default_scenario());
        }

        let prompt = prompts::scenario_prompt(&context, guidelines);
        let binding = route_model(&request.model_id, request.api_keys.as_ref());
        let content = self.invoker.invoke(&binding, &prompt).await?;

        let parsed = parse::parse_scenario(&content);
        if parsed.degraded {
            tracing::warn!(project_id = %request.project_id, "scenario output degraded to defaults");
        }
        Ok(parsed.value)
    }

    /// One conversation turn.
    ///
    /// `role = customer`: the model answers as a support agent, no grading.
    /// `role = employee`: the model grades the trainee's reply first, then
    /// produces the next in-character customer utterance, strictly in that
    /// order, and a failure of either call fails the whole turn.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatOutcome> {
        tracing::info!(
            project_id = %request.project_id,
            conversation_id = %request.conversation_id,
            role = ?request.role,
            "chat turn"
        );

        let documents = self
            .retriever
            .chat_context(
                &request.project_id,
                request.user_id.as_deref(),
                &request.message,
            )
            .await;
        let context = documents.join("\n\n");

        let guidelines = request.guidelines.as_deref().unwrap_or("");
        let history = request.history.as_deref().unwrap_or(&[]);
        let binding = route_model(&request.model_id, request.api_keys.as_ref());

        match request.role {
            ChatRole::Customer => {
                let prompt =
                    prompts::agent_reply_prompt(&context, guidelines, history, &request.message);
                let response = self.invoker.invoke(&binding, &prompt).await?;
                Ok(ChatOutcome {
                    response,
                    evaluation: None,
                })
            }
            ChatRole::Employee => {
                let eval_prompt =
                    prompts::evaluation_prompt(&context, guidelines, history, &request.message);
                let feedback = self.invoker.invoke(&binding, &eval_prompt).await?;

                let score = parse::parse_total_score(&feedback);
                if score.degraded {
                    tracing::warn!(
                        conversation_id = %request.conversation_id,
                        "total score missing from evaluation; using default"
                    );
                }
                let evaluation = Evaluation {
                    score: score.value,
                    max_score: parse::MAX_TOTAL_SCORE,
                    feedback,
                };

                let customer_prompt =
                    prompts::next_customer_prompt(&context, guidelines, history, &request.message);
                let response = self.invoker.invoke(&binding, &customer_prompt).await?;

                Ok(ChatOutcome {
                    response,
                    evaluation: Some(evaluation),
                })
            }
        }
    }

    /// Local provider reachability plus per-provider backend presence
    pub async fn health(&self) -> HealthStatus {
        let local_provider_reachable = match &self.local {
            Some(local) => local.is_reachable().await,
            None => false,
        };

        HealthStatus {
            status: "healthy".to_string(),
            local_provider_reachable,
            providers: self.invoker.registry().availability(),
        }
    }

    /// Installed local model names, from the local provider's own registry
    pub async fn list_local_models(&self) -> LocalModels {
        match &self.local {
            Some(local) => local.list_models().await,
            None => LocalModels {
                models: Vec::new(),
                error: Some("local provider not configured".to_string()),
            },
        }
    }
}
