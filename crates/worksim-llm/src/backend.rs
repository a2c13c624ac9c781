//! Chat backend trait and the provider capability table

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use worksim_core::{Provider, Result};

/// One provider's chat capability: prompt in, raw reply text out.
///
/// Backends do not trim or post-process; normalization is the invoker's job
/// so every provider honors the same text contract.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, model: &str, api_key: Option<&str>, prompt: &str) -> Result<String>;
}

/// Capability table mapping providers to their wired backends.
///
/// Built once at process start and injected into the invoker; a provider is
/// "available" exactly when it has an entry here. No ambient globals.
#[derive(Default)]
pub struct ProviderRegistry {
    backends: HashMap<Provider, Arc<dyn ChatBackend>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    pub fn with_backend(mut self, provider: Provider, backend: Arc<dyn ChatBackend>) -> Self {
        self.backends.insert(provider, backend);
        self
    }

    pub fn register(&mut self, provider: Provider, backend: Arc<dyn ChatBackend>) {
        self.backends.insert(provider, backend);
    }

    pub fn get(&self, provider: Provider) -> Option<Arc<dyn ChatBackend>> {
        self.backends.get(&provider).cloned()
    }

    pub fn available(&self, provider: Provider) -> bool {
        self.backends.contains_key(&provider)
    }

    /// Availability per provider, for health reporting
    pub fn availability(&self) -> std::collections::BTreeMap<String, bool> {
        Provider::all()
            .into_iter()
            .map(|p| (p.name().to_string(), self.available(p)))
            .collect()
    }
}
