//! Provider-agnostic LLM invocation

use std::sync::Arc;

use tokio::sync::Semaphore;

use worksim_core::{Error, ProviderBinding, Result};

use crate::backend::ProviderRegistry;

/// Executes prompts against resolved provider bindings.
///
/// The locally-hosted provider runs through a single-flight gate: an
/// injected semaphore, one permit by default, acquired in arrival order and
/// held for the whole call. A hung local call stalls the queue until it
/// resolves; there is no timeout on the gate itself. Remote
/// providers are uncapped; their services rate-limit on their own.
pub struct LlmInvoker {
    registry: ProviderRegistry,
    local_gate: Arc<Semaphore>,
}

impl LlmInvoker {
    /// Default single-slot gate for the local provider
    pub fn new(registry: ProviderRegistry) -> Self {
        Self::with_local_slots(registry, 1)
    }

    /// Override the local concurrency budget (for hosts with room for more
    /// than one resident model)
    pub fn with_local_slots(registry: ProviderRegistry, slots: usize) -> Self {
        Self {
            registry,
            local_gate: Arc::new(Semaphore::new(slots)),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Invoke a prompt, returning the provider's reply trimmed of
    /// surrounding whitespace.
    pub async fn invoke(&self, binding: &ProviderBinding, prompt: &str) -> Result<String> {
        let backend = self
            .registry
            .get(binding.provider)
            .ok_or_else(|| Error::ProviderUnavailable(binding.provider.name().to_string()))?;

        if binding.provider.requires_key() && binding.api_key.is_none() {
            return Err(Error::MissingCredential(binding.provider.name().to_string()));
        }

        tracing::debug!(provider = %binding.provider, model = %binding.model, "invoking LLM");

        let text = if binding.provider.is_local() {
            let _permit = self
                .local_gate
                .acquire()
                .await
                .map_err(|e| Error::ProviderCall(format!("local gate closed: {}", e)))?;
            backend
                .complete(&binding.model, binding.api_key.as_deref(), prompt)
                .await?
        } else {
            backend
                .complete(&binding.model, binding.api_key.as_deref(), prompt)
                .await?
        };

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ChatBackend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use worksim_core::Provider;

    fn binding(provider: Provider, model: &str, key: Option<&str>) -> ProviderBinding {
        ProviderBinding {
            provider,
            model: model.to_string(),
            api_key: key.map(|k| k.to_string()),
        }
    }

    struct EchoBackend;

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn complete(&self, _: &str, _: Option<&str>, prompt: &str) -> Result<String> {
            Ok(format!("  {}  \n", prompt))
        }
    }

    /// Records how many calls are in flight at once
    struct OverlapProbe {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl OverlapProbe {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for Arc<OverlapProbe> {
        async fn complete(&self, _: &str, _: Option<&str>, _: &str) -> Result<String> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_missing_backend_is_provider_unavailable() {
        let invoker = LlmInvoker::new(ProviderRegistry::new());
        let err = invoker
            .invoke(&binding(Provider::OpenAi, "gpt-4o", Some("k")), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_key_is_missing_credential() {
        let registry =
            ProviderRegistry::new().with_backend(Provider::OpenAi, Arc::new(EchoBackend));
        let invoker = LlmInvoker::new(registry);
        let err = invoker
            .invoke(&binding(Provider::OpenAi, "gpt-4o", None), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_local_provider_needs_no_key() {
        let registry =
            ProviderRegistry::new().with_backend(Provider::Ollama, Arc::new(EchoBackend));
        let invoker = LlmInvoker::new(registry);
        let reply = invoker
            .invoke(&binding(Provider::Ollama, "llama3.3", None), "hi")
            .await
            .unwrap();
        assert_eq!(reply, "hi");
    }

    #[tokio::test]
    async fn test_responses_are_trimmed() {
        let registry =
            ProviderRegistry::new().with_backend(Provider::Claude, Arc::new(EchoBackend));
        let invoker = LlmInvoker::new(registry);
        let reply = invoker
            .invoke(&binding(Provider::Claude, "claude-3", Some("k")), "hello")
            .await
            .unwrap();
        assert_eq!(reply, "hello");
    }

    #[tokio::test]
    async fn test_local_calls_never_overlap() {
        let probe = Arc::new(OverlapProbe::new());
        let registry = ProviderRegistry::new()
            .with_backend(Provider::Ollama, Arc::new(probe.clone()));
        let invoker = Arc::new(LlmInvoker::new(registry));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let invoker = invoker.clone();
            handles.push(tokio::spawn(async move {
                invoker
                    .invoke(&binding(Provider::Ollama, "llama3.3", None), "go")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_calls_are_uncapped() {
        let probe = Arc::new(OverlapProbe::new());
        let registry = ProviderRegistry::new()
            .with_backend(Provider::OpenAi, Arc::new(probe.clone()));
        let invoker = Arc::new(LlmInvoker::new(registry));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let invoker = invoker.clone();
            handles.push(tokio::spawn(async move {
                invoker
                    .invoke(&binding(Provider::OpenAi, "gpt-4o", Some("k")), "go")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(probe.max_in_flight.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_wider_local_gate_admits_more() {
        let probe = Arc::new(OverlapProbe::new());
        let registry = ProviderRegistry::new()
            .with_backend(Provider::Ollama, Arc::new(probe.clone()));
        let invoker = Arc::new(LlmInvoker::with_local_slots(registry, 2));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let invoker = invoker.clone();
            handles.push(tokio::spawn(async move {
                invoker
                    .invoke(&binding(Provider::Ollama, "llama3.3", None), "go")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(probe.max_in_flight.load(Ordering::SeqCst) <= 2);
    }
}
