//! Service-level tests over in-memory backings and scripted LLM backends

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use worksim_core::{
    ChatRequest, ChatRole, ConversationTurn, Provider, Result, ScenarioRequest, VectorStore,
};
use worksim_llm::{ChatBackend, LlmInvoker, ProviderRegistry};
use worksim_rag::{ExtractorRegistry, HashEmbedder, LocalVectorStore, chunk_text, collection_name};

use crate::SimulatorService;

/// Replays a fixed sequence of responses and counts invocations
struct ScriptedBackend {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, _: &str, _: Option<&str>, _: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().await;
        Ok(responses.pop_front().unwrap_or_default())
    }
}

fn service_with(
    backend: Arc<ScriptedBackend>,
) -> (
    Arc<LocalVectorStore>,
    SimulatorService<LocalVectorStore, HashEmbedder>,
) {
    let store = Arc::new(LocalVectorStore::new());
    let embedder = Arc::new(HashEmbedder::new());
    let registry = ProviderRegistry::new()
        .with_backend(Provider::OpenAi, backend.clone())
        .with_backend(Provider::Ollama, backend);
    let invoker = Arc::new(LlmInvoker::new(registry));

    let service = SimulatorService::new(
        store.clone(),
        embedder,
        ExtractorRegistry::new(),
        invoker,
        None,
    );
    (store, service)
}

fn manual_text(chars: usize) -> String {
    "환불 규정: 구매 후 7일 이내에는 전액 환불이 가능합니다. 배송 안내: 영업일 기준 3일 이내 출고됩니다. "
        .chars()
        .cycle()
        .take(chars)
        .collect()
}

fn scenario_request(project: &str) -> ScenarioRequest {
    ScenarioRequest {
        project_id: project.to_string(),
        user_id: None,
        model_id: "gpt-4o".to_string(),
        api_keys: Some([("gpt".to_string(), "key".to_string())].into()),
        guidelines: None,
    }
}

fn chat_request(project: &str, role: ChatRole, message: &str) -> ChatRequest {
    ChatRequest {
        project_id: project.to_string(),
        conversation_id: "conv-1".to_string(),
        user_id: None,
        role,
        message: message.to_string(),
        model_id: "gpt-4o".to_string(),
        api_keys: Some([("gpt".to_string(), "key".to_string())].into()),
        guidelines: None,
        history: None,
    }
}

#[tokio::test]
async fn test_upload_embeds_half_of_chunks_rounded_up() {
    let backend = ScriptedBackend::new(&[]);
    let (store, service) = service_with(backend);

    let text = manual_text(1000);
    let total = chunk_text(&text, 300, 150).len();

    let receipt = service
        .upload("p1", None, "manual.txt", text.as_bytes(), 50)
        .await
        .unwrap();

    assert_eq!(receipt.chunk_count, total.div_ceil(2));
    assert!(receipt.chunk_count >= 1);
    assert_eq!(
        store.count(&collection_name("p1", None)).await.unwrap(),
        receipt.chunk_count
    );
}

#[tokio::test]
async fn test_upload_rejects_unknown_extension() {
    let backend = ScriptedBackend::new(&[]);
    let (_, service) = service_with(backend);

    let err = service
        .upload("p1", None, "deck.pptx", b"bytes", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, worksim_core::Error::UnsupportedFileType(_)));
}

#[tokio::test]
async fn test_search_does_not_fall_back() {
    let backend = ScriptedBackend::new(&[]);
    let (_, service) = service_with(backend);

    // documents live only in the unscoped collection
    let text = manual_text(800);
    service
        .upload("p1", None, "manual.txt", text.as_bytes(), 100)
        .await
        .unwrap();

    // scoped search sees nothing; unscoped search does
    let scoped = service.search("p1", Some("u1"), "환불", 3).await.unwrap();
    assert!(scoped.is_empty());

    let unscoped = service.search("p1", None, "환불", 3).await.unwrap();
    assert!(!unscoped.is_empty());
}

#[tokio::test]
async fn test_scenario_default_without_context_or_guidelines_makes_no_llm_call() {
    let backend = ScriptedBackend::new(&["상황: 불필요"]);
    let (_, service) = service_with(backend.clone());

    let scenario = service
        .generate_scenario(&scenario_request("empty-project"))
        .await
        .unwrap();

    assert_eq!(scenario.situation, "일반적인 서비스 문의 상황");
    assert_eq!(scenario.customer_type, "일반 고객");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_scenario_with_context_parses_labeled_output() {
    let backend = ScriptedBackend::new(&[
        "상황: 고객이 환불 기한을 문의하는 상황\n고객 유형: 일반 고객\n고객 첫 말: 환불 기한이 지났는데 방법이 없을까요?",
    ]);
    let (_, service) = service_with(backend.clone());

    let text = manual_text(800);
    service
        .upload("p1", None, "manual.txt", text.as_bytes(), 100)
        .await
        .unwrap();

    let scenario = service
        .generate_scenario(&scenario_request("p1"))
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(scenario.situation, "고객이 환불 기한을 문의하는 상황");
    assert_eq!(
        scenario.first_message,
        "환불 기한이 지났는데 방법이 없을까요?"
    );
}

#[tokio::test]
async fn test_guidelines_alone_trigger_generation() {
    let backend = ScriptedBackend::new(&["상황: 지침 기반 문의\n고객 유형: 일반 고객\n고객 첫 말: 안내 부탁드립니다."]);
    let (_, service) = service_with(backend.clone());

    let mut request = scenario_request("empty-project");
    request.guidelines = Some("항상 존댓말로 응대".to_string());

    let scenario = service.generate_scenario(&request).await.unwrap();
    assert_eq!(backend.call_count(), 1);
    assert_eq!(scenario.situation, "지침 기반 문의");
}

#[tokio::test]
async fn test_customer_role_chat_returns_agent_reply_without_evaluation() {
    let backend = ScriptedBackend::new(&["네, 구매 후 7일 이내에는 전액 환불이 가능합니다."]);
    let (_, service) = service_with(backend.clone());

    let outcome = service
        .chat(&chat_request("p1", ChatRole::Customer, "환불되나요?"))
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(outcome.response, "네, 구매 후 7일 이내에는 전액 환불이 가능합니다.");
    assert!(outcome.evaluation.is_none());
}

#[tokio::test]
async fn test_employee_role_chat_grades_then_replies() {
    let feedback = "정확성: 4/5 - 정확함\n친절성: 4/5 - 친절함\n적절성: 3/5 - 보통\n총점: 11/15\n개선점: 마무리 인사를 추가하세요";
    let backend = ScriptedBackend::new(&[feedback, "그럼 영수증 없이도 환불이 되나요?"]);
    let (_, service) = service_with(backend.clone());

    let outcome = service
        .chat(&chat_request(
            "p1",
            ChatRole::Employee,
            "네 고객님, 7일 이내에는 환불이 가능합니다.",
        ))
        .await
        .unwrap();

    // evaluation call strictly precedes the customer-utterance call
    assert_eq!(backend.call_count(), 2);
    assert_eq!(outcome.response, "그럼 영수증 없이도 환불이 되나요?");

    let evaluation = outcome.evaluation.unwrap();
    assert_eq!(evaluation.score, 11);
    assert_eq!(evaluation.max_score, 15);
    assert_eq!(evaluation.feedback, feedback);
}

#[tokio::test]
async fn test_employee_role_defaults_score_but_keeps_feedback() {
    let feedback = "평가 결과: 전반적으로 훌륭한 응대였습니다.";
    let backend = ScriptedBackend::new(&[feedback, "감사합니다, 한 가지만 더 여쭤볼게요."]);
    let (_, service) = service_with(backend);

    let outcome = service
        .chat(&chat_request("p1", ChatRole::Employee, "안내해 드리겠습니다."))
        .await
        .unwrap();

    let evaluation = outcome.evaluation.unwrap();
    assert_eq!(evaluation.score, 12);
    assert_eq!(evaluation.feedback, feedback);
}

#[tokio::test]
async fn test_employee_chat_uses_fallback_context() {
    // docs only in the unscoped collection; the user-scoped chat still
    // retrieves them through the fallback chain
    let feedback = "총점: 13/15";
    let backend = ScriptedBackend::new(&[feedback, "다음 질문입니다."]);
    let (_, service) = service_with(backend);

    let text = manual_text(800);
    service
        .upload("p1", None, "manual.txt", text.as_bytes(), 100)
        .await
        .unwrap();

    let mut request = chat_request("p1", ChatRole::Employee, "환불 안내드립니다.");
    request.user_id = Some("u1".to_string());

    let outcome = service.chat(&request).await.unwrap();
    assert_eq!(outcome.evaluation.unwrap().score, 13);
}

#[tokio::test]
async fn test_missing_credential_fails_chat() {
    let backend = ScriptedBackend::new(&["응답"]);
    let (_, service) = service_with(backend);

    let mut request = chat_request("p1", ChatRole::Customer, "문의합니다");
    request.api_keys = None;

    let err = service.chat(&request).await.unwrap_err();
    assert!(matches!(err, worksim_core::Error::MissingCredential(_)));
}

#[tokio::test]
async fn test_delete_removes_only_unscoped_collection() {
    let backend = ScriptedBackend::new(&[]);
    let (store, service) = service_with(backend);

    let text = manual_text(800);
    service
        .upload("p1", None, "manual.txt", text.as_bytes(), 100)
        .await
        .unwrap();
    service
        .upload("p1", Some("u1"), "manual.txt", text.as_bytes(), 100)
        .await
        .unwrap();

    let outcome = service.delete_project_files("p1").await;
    assert!(outcome.success);

    assert_eq!(store.count(&collection_name("p1", None)).await.unwrap(), 0);
    // the user-scoped collection deliberately survives
    assert!(store.count(&collection_name("p1", Some("u1"))).await.unwrap() > 0);
}

#[tokio::test]
async fn test_delete_missing_collection_reports_failure() {
    let backend = ScriptedBackend::new(&[]);
    let (_, service) = service_with(backend);

    let outcome = service.delete_project_files("nonexistent").await;
    assert!(!outcome.success);
    assert!(!outcome.message.is_empty());
}

#[tokio::test]
async fn test_health_reports_provider_presence() {
    let backend = ScriptedBackend::new(&[]);
    let (_, service) = service_with(backend);

    let health = service.health().await;
    assert_eq!(health.status, "healthy");
    assert!(!health.local_provider_reachable);
    assert_eq!(health.providers.get("openai"), Some(&true));
    assert_eq!(health.providers.get("claude"), Some(&false));
}

#[tokio::test]
async fn test_local_models_without_local_backend() {
    let backend = ScriptedBackend::new(&[]);
    let (_, service) = service_with(backend);

    let models = service.list_local_models().await;
    assert!(models.models.is_empty());
    assert!(models.error.is_some());
}

#[tokio::test]
async fn test_history_is_passed_through_to_prompts() {
    // smoke check: a long history does not break the turn
    let backend = ScriptedBackend::new(&["답변"]);
    let (_, service) = service_with(backend);

    let mut request = chat_request("p1", ChatRole::Customer, "추가 문의");
    request.history = Some(
        (0..15)
            .map(|i| ConversationTurn {
                role: if i % 2 == 0 { ChatRole::Customer } else { ChatRole::Employee },
                content: format!("턴 {}", i),
            })
            .collect(),
    );

    let outcome = service.chat(&request).await.unwrap();
    assert_eq!(outcome.response, "답변");
}
